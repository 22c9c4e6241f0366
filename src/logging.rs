//! Logging infrastructure for phashdupe.
//!
//! Diagnostics go through the `log` facade to an `env_logger` backend on
//! stderr; standard output carries only the report. The level is chosen by
//! (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (errors only) or `--verbose` (debug/trace)
//! 3. Default: info level, which includes one line per computed fingerprint
//!
//! Lines read `LEVEL message`; with `--verbose` the emitting module is added
//! as `LEVEL [module] message`.

use env_logger::Builder;
use log::{Level, LevelFilter};
use std::env;
use std::io::Write;

/// Install the stderr logger for `--verbose` count and `--quiet`.
///
/// `RUST_LOG` replaces both flags when set. Only the first call has an effect.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();
    match env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) => {
            builder.filter_level(determine_level(verbose, quiet));
        }
    }
    configure_format(&mut builder, verbose);

    // A second call keeps the first logger
    let _ = builder.try_init();
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        writeln!(
            buf,
            "{style}{}{style:#} {}",
            line_prefix(record.level(), record.target(), verbose),
            record.args()
        )
    });
}

/// Level tag for a diagnostic line; verbose runs also name the emitting module.
fn line_prefix(level: Level, target: &str, verbose: u8) -> String {
    if verbose == 0 {
        level.to_string()
    } else {
        format!("{level} [{target}]")
    }
}
