//! Records buffered in a spool directory survive a logger restart.

mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use nextlog::test_utils::{CollectingLogger, ScriptedShipper};
use nextlog::{LoggerBuilder, SpoolQueue};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use test_utils::wait_until;

#[fixture]
fn spool_dir() -> TempDir {
    tempfile::tempdir().expect("temp dir")
}

fn builder() -> LoggerBuilder {
    LoggerBuilder::new()
        .with_name("spool")
        .with_poll_interval_ms(10)
        .with_shutdown_grace_ms(1_000)
        .with_local_logger(Arc::new(CollectingLogger::new()))
}

#[rstest]
fn queue_only_run_is_shipped_by_next_run(spool_dir: TempDir) {
    {
        let spool = Arc::new(SpoolQueue::open(spool_dir.path()).expect("open"));
        let logger = builder().start(spool).expect("first run");
        logger.info("one");
        logger.error("two");
        logger.stop();
    }

    let spool = Arc::new(SpoolQueue::open(spool_dir.path()).expect("reopen"));
    let shipper = ScriptedShipper::delivering();
    let logger = builder()
        .with_shipper(Arc::new(shipper.clone()))
        .start(spool)
        .expect("second run");

    assert!(wait_until(Duration::from_secs(5), || shipper.calls() >= 3));
    logger.stop();
    let shipped = shipper.shipped_lines();
    assert_eq!(
        &shipped[..3],
        ["one", "two", "Logger: Waiting for logs to finish sending..."]
    );
}

#[rstest]
fn halted_run_leaves_records_for_restart(spool_dir: TempDir) {
    let failing = ScriptedShipper::always_failing(503);
    {
        let spool = Arc::new(SpoolQueue::open(spool_dir.path()).expect("open"));
        let logger = builder()
            .with_shipper(Arc::new(failing.clone()))
            .start(spool)
            .expect("first run");
        logger.info("retained");
        assert!(wait_until(Duration::from_secs(5), || failing.calls() == 1));
        logger.stop();
    }
    assert_eq!(failing.calls(), 1);

    let spool = Arc::new(SpoolQueue::open(spool_dir.path()).expect("reopen"));
    let shipper = ScriptedShipper::delivering();
    let logger = builder()
        .with_shipper(Arc::new(shipper.clone()))
        .start(spool)
        .expect("second run");
    assert!(wait_until(Duration::from_secs(5), || shipper.calls() >= 2));
    logger.stop();

    let shipped = shipper.shipped_lines();
    assert_eq!(shipped[0], "retained");
    assert!(shipped[1].starts_with("Failed to send logs"));
}
