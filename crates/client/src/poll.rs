//! Fixed-interval background pollers.
//!
//! Each poller runs only while its handle is alive; dropping the handle
//! aborts the task, which also abandons any in-flight request. There is no
//! cross-poller coordination and no backoff.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Handle to a background poller. Aborts the poller on drop.
#[derive(Debug)]
pub struct PollerHandle {
    handle: JoinHandle<()>,
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn a poller that awaits `tick` every `interval`.
///
/// The first tick fires after one full interval, not immediately; callers
/// that want fresh state right away do one explicit refresh first.
pub(crate) fn spawn<F, Fut>(interval: Duration, mut tick: F) -> PollerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let handle = tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick of tokio's interval completes immediately; swallow
        // it so the cadence starts one interval from now.
        timer.tick().await;

        loop {
            timer.tick().await;
            tick().await;
        }
    });

    PollerHandle { handle }
}
