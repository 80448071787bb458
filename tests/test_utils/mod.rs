#![allow(dead_code)]

pub mod mock_server;

use std::thread;
use std::time::{Duration, Instant};

pub use mock_server::{CapturedRequest, spawn_mock_server, tcp_listener};

/// Poll `cond` every few milliseconds until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}
