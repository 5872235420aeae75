#![cfg(unix)]

mod common;

use std::time::Duration;

use common::{init_tracing, TestResult};
use devloop::engine::{listen_for_shutdown, ShutdownSignal};
use devloop_test_utils::with_timeout;
use nix::sys::signal::{raise, Signal};

#[tokio::test]
async fn sigterm_requests_shutdown() -> TestResult {
    init_tracing();
    let shutdown = ShutdownSignal::new();
    listen_for_shutdown(shutdown.clone())?;
    assert!(!shutdown.is_requested());

    raise(Signal::SIGTERM)?;

    with_timeout(async {
        while !shutdown.is_requested() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    Ok(())
}
