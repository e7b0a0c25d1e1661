//! Stderr logger for verbose output

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

/// Global logger instance
pub static LOGGER: Logger = Logger::new();

/// Logger writing "[LEVEL] message" lines to stderr
pub struct Logger {
    inner: Mutex<()>,
}

impl Logger {
    pub const fn new() -> Logger {
        Logger {
            inner: Mutex::new(()),
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _guard = self.inner.lock();
            let _ = writeln!(std::io::stderr(), "[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install the logger
///
/// # Arguments
/// * `verbose` - Log debug messages instead of warnings only
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    // A logger installed earlier keeps receiving messages
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
