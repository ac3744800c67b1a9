//! Cancellable delayed action.

use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs an action once after a delay unless cancelled first.
///
/// Dropping the handle cancels the action, so the timer never outlives
/// whatever owns it.
#[derive(Debug)]
pub struct ScheduledReset {
    handle: JoinHandle<()>,
}

impl ScheduledReset {
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(delay: Duration, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool { self.handle.is_finished() }

    /// Same as dropping the handle.
    pub fn cancel(self) { drop(self) }
}

impl Drop for ScheduledReset {
    fn drop(&mut self) { self.handle.abort(); }
}
