use std::fmt::{Display, Formatter};
use std::time::Duration;

use super::cli::Mode;
use crate::codec::Algorithm;

/// Size and timing summary for one processed buffer.
#[derive(Debug, Clone)]
pub struct Report {
    pub algorithm: Algorithm,
    pub mode: Mode,
    pub input_size: usize,
    pub output_size: usize,
    pub elapsed: Duration,
}

impl Report {
    /// (original, compressed) sizes, whichever direction we ran.
    fn sides(&self) -> (usize, usize) {
        match self.mode {
            Mode::Zip => (self.input_size, self.output_size),
            Mode::Unzip | Mode::Test => (self.output_size, self.input_size),
        }
    }

    /// Original size over compressed size. Zero when there is nothing compressed to divide by.
    pub fn ratio(&self) -> f64 {
        match self.sides() {
            (_, 0) => 0.0,
            (original, compressed) => original as f64 / compressed as f64,
        }
    }

    /// Percentage of the original size saved by compression. Negative when the data grew.
    pub fn savings_percent(&self) -> f64 {
        match self.sides() {
            (0, _) => 0.0,
            (original, compressed) => (1.0 - compressed as f64 / original as f64) * 100.0,
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}: {} -> {} bytes, ratio {:.2}, {:.1}% saved, {} ms",
            self.algorithm,
            self.mode,
            self.input_size,
            self.output_size,
            self.ratio(),
            self.savings_percent(),
            self.elapsed.as_millis()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn report(mode: Mode, input_size: usize, output_size: usize) -> Report {
        Report {
            algorithm: Algorithm::Rle,
            mode,
            input_size,
            output_size,
            elapsed: Duration::from_millis(12),
        }
    }

    #[test]
    fn compress_ratio() {
        let r = report(Mode::Zip, 1000, 250);
        assert_eq!(r.ratio(), 4.0);
        assert_eq!(r.savings_percent(), 75.0);
        assert_eq!(
            r.to_string(),
            "rle Zip: 1000 -> 250 bytes, ratio 4.00, 75.0% saved, 12 ms"
        );
    }

    #[test]
    fn decompress_ratio_is_inverted() {
        let r = report(Mode::Unzip, 250, 1000);
        assert_eq!(r.ratio(), 4.0);
        assert_eq!(r.savings_percent(), 75.0);
    }

    #[test]
    fn growth_and_empty() {
        assert_eq!(report(Mode::Zip, 100, 200).savings_percent(), -100.0);
        assert_eq!(report(Mode::Zip, 0, 0).ratio(), 0.0);
        assert_eq!(report(Mode::Zip, 0, 0).savings_percent(), 0.0);
    }
}
