//! Logger initialization from CLI verbosity flags.

use std::fs::{self, OpenOptions};
use std::path::Path;

use log::LevelFilter;

/// Map `-v` repetition and `-q` onto a level filter.
///
/// Default is warnings only; `-v` info, `-vv` debug, `-vvv` trace,
/// `-q` errors only (quiet wins over verbose at the clap layer).
#[must_use]
pub const fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Initialize the global logger. Safe to call more than once (later calls
/// are no-ops), which keeps library tests independent of ordering.
pub fn init(verbosity: u8, quiet: bool, log_file: Option<&Path>) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for(verbosity, quiet))
        .format_timestamp_secs();

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(err) => {
                eprintln!("i3ctl: cannot open log file {}: {err}", path.display());
            }
        }
    }

    let _ = builder.try_init();
}
