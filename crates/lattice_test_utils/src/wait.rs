//! Bounded polling for state that settles asynchronously.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Default upper bound for [`wait_for`]
pub const DEFAULT_WAIT: Duration = Duration::from_secs(2);

/// Interval between probe attempts
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run `probe` until it yields `Some` or `timeout` elapses.
///
/// The probe always runs at least once, so a zero timeout is a single check.
pub async fn wait_for<T, F, Fut>(timeout: Duration, mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        if let Some(value) = probe().await {
            return Some(value);
        }
        if Instant::now() >= deadline {
            debug!(attempts, ?timeout, "wait_for gave up");
            return None;
        }
        sleep(POLL_INTERVAL).await;
    }
}
