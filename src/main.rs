#![forbid(unsafe_code)]

//! i3ctl — CLI entry point.

use std::path::PathBuf;
use std::thread;

use clap::Parser;
use clap::error::ErrorKind;
use signal_hook::consts::SIGINT;
use signal_hook::iterator::Signals;

use i3ctl::cli;
use i3ctl::core::config::ConfigStore;
use i3ctl::core::logging;

fn main() {
    // Exit code contract: 0 success (help/version included), 1 failure,
    // 130 interrupt. clap's default exit code for parse errors is 2.
    let args = match cli::Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let displayed = matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            );
            let _ = err.print();
            std::process::exit(i32::from(!displayed));
        }
    };

    // The configured log file receives structured output; I3CTL_LOG_FILE
    // overrides it, and an empty value logs to stderr instead.
    // Log destination: --log-file, then $I3CTL_LOG_FILE, then the
    // config key. An empty value keeps logging on stderr.
    let log_file = args.log_file.clone().or_else(|| {
        std::env::var("I3CTL_LOG_FILE")
            .ok()
            .or_else(|| {
                ConfigStore::open(args.config.as_deref())
                    .get_str("log_file")
                    .map(str::to_string)
            })
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
    });
    logging::init(args.verbose, args.quiet, log_file.as_deref());

    // Ctrl-C during an interactive backend (editor, bluetoothctl pair)
    // exits with the interrupt code instead of a half-finished state.
    match Signals::new([SIGINT]) {
        Ok(mut signals) => {
            thread::spawn(move || {
                if signals.forever().next().is_some() {
                    eprintln!("i3ctl: interrupted");
                    std::process::exit(130);
                }
            });
        }
        Err(err) => log::warn!("could not install SIGINT handler: {err}"),
    }

    std::process::exit(cli::run(&args));
}
