// SPDX-License-Identifier: MPL-2.0

//! Logging support.
//!
//! The logger prints records to the early serial console. Messages are
//! always printed in their entirety, never mixed with messages printed
//! concurrently.
//!
//! The level comes from the kernel command line, e.g. `logger.log_level=debug`.
//! Without it, logging stays off.
#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

use alloc::format;

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use spin::Mutex;
use xk_frame::{cmdline, early_println};

static LOGGER: Logger = Logger {};

struct Logger {}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = format!("{:<5}", record.level());
        let record_str = format!("{}", record.args());

        #[cfg(feature = "log_color")]
        let (level, record_str) = {
            use alloc::string::ToString;

            use owo_colors::OwoColorize;

            let level = match record.level() {
                log::Level::Error => level.red().to_string(),
                log::Level::Warn => level.bright_yellow().to_string(),
                log::Level::Info => level.blue().to_string(),
                log::Level::Debug => level.bright_green().to_string(),
                log::Level::Trace => level.bright_black().to_string(),
            };
            let record_str = record_str.default_color().to_string();
            (level, record_str)
        };

        // Use a global lock to prevent interleaving of log messages.
        static RECORD_LOCK: Mutex<()> = Mutex::new(());
        let _lock = RECORD_LOCK.lock();

        early_println!("{}: {}", level, record_str);
    }

    fn flush(&self) {}
}

/// Logger settings taken from the kernel command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerConfig {
    /// The most verbose level that is printed.
    pub level: LevelFilter,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Off,
        }
    }
}

impl LoggerConfig {
    /// Reads `logger.log_level=<level>`.
    pub fn from_cmdline(cmdline: &str) -> Self {
        let level = cmdline::module_arg(cmdline, "logger", "log_level")
            .map(parse_log_level)
            .unwrap_or(LevelFilter::Off);
        Self { level }
    }
}

fn parse_log_level(value: &str) -> LevelFilter {
    match value {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        // Otherwise, OFF
        _ => LevelFilter::Off,
    }
}

/// Installs the console logger. Users should avoid using the log macros
/// before this function is called.
///
/// Fails if another logger is already installed; the maximum level is set
/// either way.
pub fn init(config: &LoggerConfig) -> Result<(), SetLoggerError> {
    log::set_max_level(config.level);
    log::set_logger(&LOGGER)
}
