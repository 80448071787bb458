//! Queue backend whose transport can be switched off per primitive.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::queue::{MemoryQueue, QueueBackend};

/// [`MemoryQueue`] wrapper that fails selected operations on demand.
#[derive(Debug, Default)]
pub struct FlakyQueue {
    inner: MemoryQueue,
    fail_push: AtomicBool,
    fail_peek: AtomicBool,
    fail_pop: AtomicBool,
}

impl FlakyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_push(&self, fail: bool) {
        self.fail_push.store(fail, Ordering::SeqCst);
    }

    pub fn fail_peek(&self, fail: bool) {
        self.fail_peek.store(fail, Ordering::SeqCst);
    }

    pub fn fail_pop(&self, fail: bool) {
        self.fail_pop.store(fail, Ordering::SeqCst);
    }

    /// Raw entries currently held, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.inner.entries()
    }

    fn check(flag: &AtomicBool, op: &str) -> io::Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("{op} refused"),
            ))
        } else {
            Ok(())
        }
    }
}

impl QueueBackend for FlakyQueue {
    fn push_tail(&self, entry: &str) -> io::Result<()> {
        Self::check(&self.fail_push, "push")?;
        self.inner.push_tail(entry)
    }

    fn peek_head(&self) -> io::Result<Option<String>> {
        Self::check(&self.fail_peek, "peek")?;
        self.inner.peek_head()
    }

    fn pop_head(&self) -> io::Result<()> {
        Self::check(&self.fail_pop, "pop")?;
        self.inner.pop_head()
    }

    fn len(&self) -> io::Result<usize> {
        self.inner.len()
    }
}
