use std::sync::Arc;

use logtest::Logger as CapturedLog;
use nextlog::{Level, LocalLogger, LogCrateLogger, LoggerBuilder, MemoryQueue, Record};
use serial_test::serial;

fn pop_for(log: &mut CapturedLog, target: &str) -> Option<logtest::Record> {
    std::iter::from_fn(|| log.pop()).find(|record| record.target() == target)
}

// logtest installs a process-wide logger, so everything here shares one
// capture.
#[test]
#[serial]
fn log_crate_forwarding() {
    let mut log = CapturedLog::start();

    LogCrateLogger.log("forward", &Record::new(Level::Warning, "careful"));
    let record = pop_for(&mut log, "forward").expect("warning forwarded");
    assert_eq!(record.level(), log::Level::Warn);
    assert_eq!(record.args(), "careful");

    LogCrateLogger.log("forward", &Record::new(Level::Critical, "meltdown"));
    let record = pop_for(&mut log, "forward").expect("critical forwarded");
    assert_eq!(record.level(), log::Level::Error);
    assert_eq!(record.args(), "CRITICAL: meltdown");

    let logger = LoggerBuilder::new()
        .with_name("facade")
        .with_local_logger(Arc::new(LogCrateLogger))
        .start(Arc::new(MemoryQueue::new()))
        .expect("start");
    logger.info("through the facade");
    let record = pop_for(&mut log, "facade").expect("facade record");
    assert_eq!(record.level(), log::Level::Info);
    assert_eq!(record.args(), "through the facade");
    logger.stop();
}
