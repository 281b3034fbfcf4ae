//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::path::Path;

use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use tricodec::tools::cli::{codec_opts_init, Verbosity};
use tricodec::tools::files::{process_file, process_stdin};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> Result<(), std::io::Error> {
    // Log to stderr so output sent to stdout stays clean.
    // Available log levels are Error, Warn, Info, Debug, Trace
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Could not start logging: {}", e);
    }

    let options = codec_opts_init();

    if options.files.is_empty() {
        let report = process_stdin(&options)?;
        info!("{}", report);
        return Ok(());
    }

    //----- Work through each file, carrying on past failures and returning the last one
    let mut result = Ok(());
    for file in &options.files {
        match process_file(&options, Path::new(file)) {
            Ok(report) => {
                info!("{}", report);
                if options.verbose != Verbosity::Quiet {
                    eprintln!("{}: {}", file, report);
                }
            }
            Err(e) => {
                error!("{}: {}", file, e);
                result = Err(e);
            }
        }
    }

    info!("Done.\n");
    result
}
