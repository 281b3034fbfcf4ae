use clap::Parser;
use log::{info, warn};
use std::{fmt::Display, fmt::Formatter};

use super::files::DEFAULT_MAX_SIZE;
use crate::codec::lz77::{DEFAULT_WINDOW_BITS, MAX_WINDOW_BITS, MIN_WINDOW_BITS};
use crate::codec::{Algorithm, Settings};

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}

impl From<u8> for Verbosity {
    fn from(v: u8) -> Self {
        match v {
            0 => Verbosity::Quiet,
            1 => Verbosity::Errors,
            2 => Verbosity::Warnings,
            3 => Verbosity::Info,
            4 => Verbosity::Debug,
            _ => Verbosity::Trace,
        }
    }
}

impl Verbosity {
    pub fn level_filter(self) -> log::LevelFilter {
        match self {
            Verbosity::Quiet => log::LevelFilter::Off,
            Verbosity::Errors => log::LevelFilter::Error,
            Verbosity::Warnings => log::LevelFilter::Warn,
            Verbosity::Info => log::LevelFilter::Info,
            Verbosity::Debug => log::LevelFilter::Debug,
            Verbosity::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Zip, Unzip, Test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
    Test,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Define the two output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    File,
    Stdout,
}
impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct CodecOpts {
    /// Algorithm used. None means pick from the file extension (or the default when compressing).
    pub algorithm: Option<Algorithm>,
    /// Vec of names of files to read for input. Empty means stdin.
    pub files: Vec<String>,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Don't remove input files after processing
    pub keep_input_files: bool,
    /// Largest input we agree to process
    pub max_size: u64,
    /// Compress/Decompress/Test
    pub op_mode: Mode,
    /// Location where output is sent
    pub output: Output,
    /// Compression settings
    pub settings: Settings,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl CodecOpts {
    pub fn new() -> Self {
        Self {
            algorithm: None,
            files: vec![],
            force_overwrite: false,
            keep_input_files: false,
            max_size: DEFAULT_MAX_SIZE,
            op_mode: Mode::Zip,
            output: Output::File,
            settings: Settings::default(),
            verbose: Verbosity::Errors,
        }
    }
}

impl Default for CodecOpts {
    fn default() -> Self {
        Self::new()
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Compress or decompress files with Huffman, RLE or LZ77",
    long_about = "
    Compresses each file into <file>.<algorithm>, or restores a compressed file into
    decompressed_<file>. When decompressing, the algorithm is taken from the file
    extension unless one is given with -a.

    With no file names, reads standard input and writes standard output."
)]
pub struct Args {
    /// Files to process
    #[clap()]
    files: Vec<String>,

    /// Compress the input files (default)
    #[clap(short = 'z', long = "compress")]
    compress: bool,

    /// Decompress the input files
    #[clap(short = 'd', long = "decompress", conflicts_with = "compress")]
    decompress: bool,

    /// Decompress and discard the result, checking that the input is valid
    #[clap(short = 't', long = "test", conflicts_with_all = &["compress", "decompress"])]
    test: bool,

    /// Compression algorithm
    #[clap(short = 'a', long = "algorithm", value_enum)]
    algorithm: Option<Algorithm>,

    /// Keep (don't delete) input files
    #[clap(short = 'k', long = "keep")]
    keep: bool,

    /// Overwrite existing output files
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Send output to standard out
    #[clap(short = 'c', long = "stdout")]
    stdout: bool,

    /// Sets verbosity. -v0 is silent, -v5 is chatty
    #[clap(short = 'v', default_value_t = 1)]
    v: u8,

    /// LZ77 window size as a bit width (8-16)
    #[clap(
        long = "window-bits",
        default_value_t = DEFAULT_WINDOW_BITS,
        value_parser = clap::value_parser!(u8).range(MIN_WINDOW_BITS as i64..=MAX_WINDOW_BITS as i64)
    )]
    window_bits: u8,

    /// Refuse inputs larger than this many bytes
    #[clap(long = "max-size", default_value_t = DEFAULT_MAX_SIZE)]
    max_size: u64,
}

impl From<Args> for CodecOpts {
    fn from(args: Args) -> Self {
        let op_mode = if args.test {
            Mode::Test
        } else if args.decompress {
            Mode::Unzip
        } else {
            Mode::Zip
        };
        Self {
            algorithm: args.algorithm,
            files: args.files,
            force_overwrite: args.force,
            keep_input_files: args.keep,
            max_size: args.max_size,
            op_mode,
            output: if args.stdout {
                Output::Stdout
            } else {
                Output::File
            },
            settings: Settings {
                window_bits: args.window_bits,
            },
            verbose: Verbosity::from(args.v),
        }
    }
}

/// Parse the command line, set the log level, and report what we are about to do.
pub fn codec_opts_init() -> CodecOpts {
    let opts = CodecOpts::from(Args::parse());

    log::set_max_level(opts.verbose.level_filter());

    // Below we report initialization status to the user
    info!("---- Initialization Start ----");
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    match opts.algorithm {
        Some(a) => info!("Algorithm set to {}", a),
        None => info!("Algorithm taken from file extensions"),
    }
    if opts.files.is_empty() {
        warn!("Reading from stdin and sending output to stdout");
    }
    info!("Output sent to {}", opts.output);
    if opts.settings.window_bits != DEFAULT_WINDOW_BITS {
        info!("LZ77 window bits set to {}", opts.settings.window_bits)
    };
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    if opts.keep_input_files {
        info!("Keeping input files")
    };
    info!("---- Initialization End ----\n");
    opts
}
