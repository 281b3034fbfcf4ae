//! File handling around the codecs: input policy, output naming, and the read/convert/write cycle
//! for one input.
//!
//! These are decisions of the command line tool, not of the codecs. The codecs accept any buffer.

use log::{error, info, warn};
use std::fs::{self, OpenOptions};
use std::io::{self, Error, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::cli::{CodecOpts, Mode, Output};
use super::report::Report;
use crate::codec::Algorithm;

/// Largest input processed by default (10 MiB).
pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// Prefix added to the name of restored files.
pub const DECOMPRESSED_PREFIX: &str = "decompressed_";

/// Algorithm used when compressing without -a.
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::Huffman;

/// Reject inputs the tool will not process: empty ones and ones over `max_size` bytes.
pub fn check_input(len: u64, max_size: u64) -> io::Result<()> {
    if len == 0 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "Cannot process empty files.",
        ));
    }
    if len > max_size {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!(
                "File size exceeds the {:.2}MB limit. Current size: {:.2}MB",
                max_size as f64 / 1024.0 / 1024.0,
                len as f64 / 1024.0 / 1024.0
            ),
        ));
    }
    Ok(())
}

/// The algorithm named by the file's extension, if any.
pub fn detect_algorithm(path: &Path) -> Option<Algorithm> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(Algorithm::from_extension)
}

/// `name` becomes `name.<algorithm>`.
pub fn compressed_name(path: &Path, algorithm: Algorithm) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(algorithm.name());
    PathBuf::from(name)
}

/// `dir/name.<algorithm>` becomes `dir/decompressed_name`. Other names just get the prefix.
pub fn decompressed_name(path: &Path, algorithm: Algorithm) -> PathBuf {
    let base = match detect_algorithm(path) {
        Some(a) if a == algorithm => path.with_extension(""),
        _ => path.to_path_buf(),
    };
    let mut file_name = std::ffi::OsString::from(DECOMPRESSED_PREFIX);
    file_name.push(base.file_name().unwrap_or_default());
    base.with_file_name(file_name)
}

/// Pick the algorithm for `path`: the one asked for, else the file extension when decompressing,
/// else the default when compressing.
pub fn resolve_algorithm(opts: &CodecOpts, path: Option<&Path>) -> io::Result<Algorithm> {
    if let Some(a) = opts.algorithm {
        return Ok(a);
    }
    match opts.op_mode {
        Mode::Zip => Ok(DEFAULT_ALGORITHM),
        Mode::Unzip | Mode::Test => path.and_then(detect_algorithm).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                "Cannot tell the algorithm; use -a or a .huffman, .rle or .lz77 file.",
            )
        }),
    }
}

/// Run the selected operation on one buffer and report on it.
pub fn convert(opts: &CodecOpts, algorithm: Algorithm, data: &[u8]) -> io::Result<(Vec<u8>, Report)> {
    let start = Instant::now();
    let result = match opts.op_mode {
        Mode::Zip => algorithm.compress_with(data, &opts.settings),
        Mode::Unzip | Mode::Test => algorithm.decompress(data).map_err(|e| {
            error!("Could not decompress with {}: {}", algorithm, e);
            Error::new(
                ErrorKind::InvalidData,
                format!("This input is not valid {} data: {}", algorithm, e),
            )
        })?,
    };
    let report = Report {
        algorithm,
        mode: opts.op_mode,
        input_size: data.len(),
        output_size: result.len(),
        elapsed: start.elapsed(),
    };
    Ok((result, report))
}

/// Compress, decompress or test the file at `path` as set in opts.
pub fn process_file(opts: &CodecOpts, path: &Path) -> io::Result<Report> {
    let algorithm = resolve_algorithm(opts, Some(path))?;
    check_input(fs::metadata(path)?.len(), opts.max_size)?;
    let data = fs::read(path)?;
    info!("Processing {} ({} bytes) with {}.", path.display(), data.len(), algorithm);

    let (result, report) = convert(opts, algorithm, &data)?;
    if opts.op_mode == Mode::Test {
        info!("{}: ok", path.display());
        return Ok(report);
    }

    match opts.output {
        Output::Stdout => io::stdout().lock().write_all(&result)?,
        Output::File => {
            let out_path = match opts.op_mode {
                Mode::Zip => compressed_name(path, algorithm),
                _ => decompressed_name(path, algorithm),
            };
            let mut f_out = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .create_new(!opts.force_overwrite)
                .open(&out_path)
                .map_err(|e| {
                    if e.kind() == ErrorKind::AlreadyExists {
                        warn!("{} exists; use -f to overwrite it.", out_path.display());
                    }
                    e
                })?;
            f_out.write_all(&result)?;
            info!("Wrote {}.", out_path.display());
        }
    }

    if !opts.keep_input_files && opts.output == Output::File {
        fs::remove_file(path)?;
        info!("Removed {}.", path.display());
    }
    Ok(report)
}

/// Same cycle as process_file, from stdin to stdout.
pub fn process_stdin(opts: &CodecOpts) -> io::Result<Report> {
    let algorithm = resolve_algorithm(opts, None)?;
    let mut data = Vec::new();
    io::stdin().lock().read_to_end(&mut data)?;
    check_input(data.len() as u64, opts.max_size)?;

    let (result, report) = convert(opts, algorithm, &data)?;
    if opts.op_mode != Mode::Test {
        io::stdout().lock().write_all(&result)?;
    }
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::env;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("tricodec-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn input_policy() {
        assert!(check_input(0, DEFAULT_MAX_SIZE).is_err());
        assert!(check_input(1, DEFAULT_MAX_SIZE).is_ok());
        assert!(check_input(DEFAULT_MAX_SIZE, DEFAULT_MAX_SIZE).is_ok());
        let err = check_input(DEFAULT_MAX_SIZE + 1, DEFAULT_MAX_SIZE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn names() {
        let p = Path::new("dir/report.txt");
        assert_eq!(
            compressed_name(p, Algorithm::Lz77),
            PathBuf::from("dir/report.txt.lz77")
        );
        assert_eq!(
            decompressed_name(Path::new("dir/report.txt.lz77"), Algorithm::Lz77),
            PathBuf::from("dir/decompressed_report.txt")
        );
        // A mismatched extension stays on the name
        assert_eq!(
            decompressed_name(Path::new("report.rle"), Algorithm::Huffman),
            PathBuf::from("decompressed_report.rle")
        );
    }

    #[test]
    fn algorithm_detection() {
        assert_eq!(
            detect_algorithm(Path::new("a.b.huffman")),
            Some(Algorithm::Huffman)
        );
        assert_eq!(detect_algorithm(Path::new("a.txt")), None);
        assert_eq!(detect_algorithm(Path::new("rle")), None);

        let mut opts = CodecOpts::new();
        assert_eq!(resolve_algorithm(&opts, None).unwrap(), DEFAULT_ALGORITHM);
        opts.op_mode = Mode::Unzip;
        assert!(resolve_algorithm(&opts, Some(Path::new("a.txt"))).is_err());
        assert_eq!(
            resolve_algorithm(&opts, Some(Path::new("a.rle"))).unwrap(),
            Algorithm::Rle
        );
        opts.algorithm = Some(Algorithm::Lz77);
        assert_eq!(
            resolve_algorithm(&opts, Some(Path::new("a.rle"))).unwrap(),
            Algorithm::Lz77
        );
    }

    #[test]
    fn corrupt_input_is_invalid_data() {
        let mut opts = CodecOpts::new();
        opts.op_mode = Mode::Unzip;
        let err = convert(&opts, Algorithm::Rle, &[1, 2, 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn file_round_trip() {
        let dir = scratch_dir("round-trip");
        let original = dir.join("notes.txt");
        let data = b"file round trip, file round trip, file round trip".to_vec();
        fs::write(&original, &data).unwrap();

        let mut opts = CodecOpts::new();
        opts.algorithm = Some(Algorithm::Lz77);
        opts.keep_input_files = true;
        opts.force_overwrite = true;
        let report = process_file(&opts, &original).unwrap();
        assert_eq!(report.input_size, data.len());

        let packed = dir.join("notes.txt.lz77");
        assert!(packed.exists());

        opts.op_mode = Mode::Test;
        opts.algorithm = None;
        process_file(&opts, &packed).unwrap();

        opts.op_mode = Mode::Unzip;
        opts.keep_input_files = false;
        process_file(&opts, &packed).unwrap();
        assert!(!packed.exists());
        assert_eq!(fs::read(dir.join("decompressed_notes.txt")).unwrap(), data);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn existing_output_needs_force() {
        let dir = scratch_dir("force");
        let original = dir.join("a.bin");
        fs::write(&original, [1, 2, 3]).unwrap();
        fs::write(dir.join("a.bin.rle"), [0]).unwrap();

        let mut opts = CodecOpts::new();
        opts.algorithm = Some(Algorithm::Rle);
        opts.keep_input_files = true;
        let err = process_file(&opts, &original).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        opts.force_overwrite = true;
        process_file(&opts, &original).unwrap();
        assert_eq!(fs::read(dir.join("a.bin.rle")).unwrap(), [1, 1, 1, 2, 1, 3]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
