//! Interop with the `log` facade.
//!
//! A [`Logger`] can stand in as the global `log` logger, so code written
//! against `log::info!` and friends flows into whichever handler this crate
//! selected. The mapping is lossy only in one direction: `log` has no
//! NOTICE, PANIC or FATAL, so those levels never arrive through the bridge.

use crate::{context::Context, facade::Logger, level::Level, record::{Attr, Record}};

fn level_from(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::ERROR,
        log::Level::Warn => Level::WARN,
        log::Level::Info => Level::INFO,
        log::Level::Debug => Level::DEBUG,
        log::Level::Trace => Level::TRACE,
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        Self::enabled(self, level_from(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        let level = level_from(record.level());
        if !Self::enabled(self, level) {
            return;
        }
        let emitted = Record::with_source(
            level,
            record.args().to_string(),
            record.file_static().unwrap_or("<unknown>"),
            record.line().unwrap_or(0),
            vec![Attr::new("target", record.target())],
        );
        let _ = self.handler().handle(&Context::background(), emitted);
    }

    fn flush(&self) {}
}

impl Logger {
    /// Installs this logger as the global `log` logger.
    ///
    /// # Errors
    ///
    /// Fails if a global logger was already installed.
    pub fn install_global(self, max_level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
        log::set_max_level(max_level);
        log::set_boxed_logger(Box::new(self))
    }
}
