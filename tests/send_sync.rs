//! Send/Sync guarantees for core types.

use nextlog::{
    Dispatcher, HttpShipper, LabelSet, LogCrateLogger, Logger, LoggerBuilder, MemoryQueue,
    Record, RecordQueue, SpoolQueue,
};
use rstest::rstest;
use static_assertions::assert_impl_all;

#[rstest]
fn builders_are_send_sync() {
    assert_impl_all!(LoggerBuilder: Send, Sync);
    assert_impl_all!(LabelSet: Send, Sync);
}

#[rstest]
fn components_are_send_sync() {
    assert_impl_all!(Logger: Send, Sync);
    assert_impl_all!(Dispatcher: Send, Sync);
    assert_impl_all!(RecordQueue: Send, Sync);
    assert_impl_all!(MemoryQueue: Send, Sync);
    assert_impl_all!(SpoolQueue: Send, Sync);
    assert_impl_all!(HttpShipper: Send, Sync);
    assert_impl_all!(LogCrateLogger: Send, Sync);
    assert_impl_all!(Record: Send, Sync);
}
