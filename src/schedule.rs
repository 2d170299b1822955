//! Cancellable delayed tasks and a replace-on-schedule debouncer.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

/// A future that runs after a delay unless cancelled first.
///
/// Dropping the task cancels it.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawn `task` to run after `delay` on the current Tokio runtime.
    /// Returns `None` when called outside a runtime.
    pub fn after<F>(delay: Duration, task: F) -> Option<Self>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let runtime = Handle::try_current().ok()?;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        Some(Self { handle })
    }

    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Coalesces bursts of `schedule` calls into one firing.
///
/// Each `schedule` replaces the pending timer, so only the last call in a
/// burst fires, `window` after it was made. Firings are delivered as the
/// `tag` passed to `schedule`; a tag that raced past a replacement can still
/// arrive, so consumers compare it against the latest tag they issued.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Option<ScheduledTask>,
    pending_tag: Option<u64>,
    fired_tx: UnboundedSender<u64>,
    fired_rx: UnboundedReceiver<u64>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        Self {
            window,
            pending: None,
            pending_tag: None,
            fired_tx,
            fired_rx,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace any pending timer with one that fires `tag` after the window.
    /// Returns false when no runtime is available to run the timer.
    pub fn schedule(&mut self, tag: u64) -> bool {
        self.cancel();
        let tx = self.fired_tx.clone();
        let task = ScheduledTask::after(self.window, async move {
            // The receiver lives as long as the debouncer; a closed channel
            // only means nobody is waiting any more.
            let _ = tx.send(tag);
        });
        match task {
            Some(task) => {
                self.pending = Some(task);
                self.pending_tag = Some(tag);
                true
            }
            None => {
                debug!(tag, "no runtime available, debounce timer not started");
                false
            }
        }
    }

    /// Drop the pending timer and any firing already queued.
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.cancel();
        }
        self.pending_tag = None;
        while self.fired_rx.try_recv().is_ok() {}
    }

    pub fn is_pending(&self) -> bool {
        self.pending_tag.is_some()
    }

    /// Wait for the next firing. Returns `None` immediately when nothing is
    /// pending and no firing is queued.
    pub async fn fired(&mut self) -> Option<u64> {
        let tag = match self.fired_rx.try_recv() {
            Ok(tag) => tag,
            Err(_) if self.pending_tag.is_none() => return None,
            Err(_) => self.fired_rx.recv().await?,
        };
        if self.pending_tag == Some(tag) {
            self.pending = None;
            self.pending_tag = None;
        }
        Some(tag)
    }
}
