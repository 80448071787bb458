//! Local (in-process) logging capability wrapped by the [`Logger`](crate::Logger).

use crate::level::Level;
use crate::log_record::Record;

/// Destination for the immediate, local copy of every record.
///
/// Implementations must be `Send + Sync`: the facade calls them from any
/// producer thread and the dispatcher thread reports failures through them.
pub trait LocalLogger: Send + Sync {
    /// Emit `record` under the logger name `target`.
    fn log(&self, target: &str, record: &Record);
}

/// Forwards records to whatever `log` implementation the process installed.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogCrateLogger;

impl LocalLogger for LogCrateLogger {
    fn log(&self, target: &str, record: &Record) {
        let level = record.level();
        if level == Level::Critical {
            log::log!(target: target, level.to_log_level(), "CRITICAL: {}", record.line());
        } else {
            log::log!(target: target, level.to_log_level(), "{}", record.line());
        }
    }
}

/// Discards every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLogger;

impl LocalLogger for NullLogger {
    fn log(&self, _target: &str, _record: &Record) {}
}
