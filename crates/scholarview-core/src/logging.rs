//! Log output for the terminal front-end.
//!
//! On a terminal every line is printed through the shared [`MultiProgress`],
//! so the acquisition bar is redrawn below it. Otherwise lines go straight to
//! stderr without color. Debug and trace lines carry the module target.

use indicatif::MultiProgress;
use log::Level;

const RESET: &str = "\x1b[0m";

fn label(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

fn ansi(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[31m",
        Level::Warn => "\x1b[33m",
        Level::Info => "\x1b[32m",
        Level::Debug => "\x1b[36m",
        Level::Trace => "\x1b[35m",
    }
}

/// One formatted line, without the trailing newline.
fn render(record: &log::Record, colored: bool) -> String {
    let level = record.level();
    let tag = if colored {
        format!("[{}{}{RESET}]", ansi(level), label(level))
    } else {
        format!("[{}]", label(level))
    };
    if level >= Level::Debug {
        format!("{tag} {}: {}", record.target(), record.args())
    } else {
        format!("{tag} {}", record.args())
    }
}

/// Filter used when `RUST_LOG` is unset. `debug` beats `quiet`.
pub fn default_level(quiet: bool, debug: bool) -> &'static str {
    match (debug, quiet) {
        (true, _) => "debug",
        (false, true) => "warn",
        (false, false) => "info",
    }
}

/// [`log::Log`] sink that suspends the progress display while it writes.
pub struct IndicatifLogger {
    filter: env_logger::Logger,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(filter: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { filter, multi }
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = render(record, true);
        self.multi.suspend(|| eprintln!("{line}"));
    }

    fn flush(&self) {}
}

/// Install the process logger. Pass `multi` only when stderr is a terminal.
///
/// Fails if a logger is already installed.
pub fn init_logging(
    quiet: bool,
    debug: bool,
    multi: Option<&MultiProgress>,
) -> Result<(), log::SetLoggerError> {
    use std::io::Write;

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level(quiet, debug)),
    );

    match multi {
        Some(multi) => {
            let filter = builder.build();
            let max_level = filter.filter();
            log::set_boxed_logger(Box::new(IndicatifLogger::new(filter, multi.clone())))?;
            log::set_max_level(max_level);
            Ok(())
        }
        None => builder
            .format(|buf, record| writeln!(buf, "{}", render(record, false)))
            .try_init(),
    }
}
