//! Fixed-interval re-reads of one event.
//!
//! There is no push channel, so a gallery learns about new uploads by
//! reading the event again every few seconds. A tick may see a write that
//! happened just before it or miss it until the next one.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::{SnapError, SnapResult};
use crate::event::Event;
use crate::store::EventStore;

/// What each tick hands to the observer: the event, `None` once it is gone
/// (deleted or unreadable), or the storage failure.
pub type PollUpdate = SnapResult<Option<Event>>;

type Observer = Box<dyn FnMut(PollUpdate) -> ControlFlow<()> + Send>;
type ObserverSlot = Arc<Mutex<Option<Observer>>>;

fn lock(slot: &ObserverSlot) -> MutexGuard<'_, Option<Observer>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Clone)]
pub struct PollingSynchronizer {
    store: EventStore,
    interval: Duration,
}

impl PollingSynchronizer {
    pub fn new(store: EventStore, interval: Duration) -> Self {
        PollingSynchronizer { store, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling `event_id` on the current tokio runtime. The first read
    /// happens immediately.
    ///
    /// The observer keeps being called until it returns `Break`, the handle
    /// is cancelled, or the handle is dropped. It must not cancel its own
    /// handle; returning `Break` is the way to stop from inside.
    pub fn start<F>(&self, event_id: &str, on_update: F) -> PollHandle
    where
        F: FnMut(PollUpdate) -> ControlFlow<()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let on_update: Observer = Box::new(on_update);
        let observer: ObserverSlot = Arc::new(Mutex::new(Some(on_update)));

        let task = tokio::spawn(poll_loop(
            self.store.clone(),
            event_id.to_string(),
            self.interval,
            token.clone(),
            observer.clone(),
        ));

        info!(event_id = %event_id, interval_ms = self.interval.as_millis() as u64, "polling started");

        PollHandle {
            token,
            observer,
            task: Some(task),
        }
    }
}

async fn poll_loop(
    store: EventStore,
    event_id: String,
    interval: Duration,
    token: CancellationToken,
    observer: ObserverSlot,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let update = read_off_runtime(&store, &event_id).await;

                // Held while the observer runs so `cancel` can't return mid-call.
                let mut slot = lock(&observer);
                let Some(on_update) = slot.as_mut() else {
                    break;
                };
                if on_update(update).is_break() {
                    slot.take();
                    break;
                }
            }
        }
    }

    info!(event_id = %event_id, "polling stopped");
}

/// Storage backends do blocking I/O, so reads go to the blocking pool.
async fn read_off_runtime(store: &EventStore, event_id: &str) -> PollUpdate {
    let store = store.clone();
    let event_id = event_id.to_string();

    tokio::task::spawn_blocking(move || store.read(&event_id))
        .await
        .unwrap_or_else(|e| Err(SnapError::StorageUnavailable(format!("event read task failed: {e}"))))
}

/// Stops the poller when cancelled or dropped.
pub struct PollHandle {
    token: CancellationToken,
    observer: ObserverSlot,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop polling. Once this returns the observer is dropped and will not
    /// be called again. Safe to call any number of times.
    pub fn cancel(&self) {
        self.token.cancel();
        lock(&self.observer).take();
    }

    /// Wait for the polling task to exit without cancelling it.
    pub async fn join(mut self) -> Result<(), JoinError> {
        match self.task.take() {
            Some(task) => task.await,
            None => Ok(()),
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
