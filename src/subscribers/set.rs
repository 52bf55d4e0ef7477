//! # Fan-out of bus events to subscribers.
//!
//! Each subscriber gets a lane: a bounded queue plus a tokio task draining it
//! into [`Subscribe::on_event`]. [`SubscriberSet::emit`] only enqueues, so the
//! bus listener never waits on a subscriber.
//!
//! ```text
//! emit(&Event) ─► Arc<Event> ─┬─► lane "LogWriter"    ─► on_event()
//!                             ├─► lane "AliveTracker" ─► on_event()
//!                             └─► lane <custom>       ─► on_event()
//! ```
//!
//! Order is kept within a lane only. A full lane drops the event for that
//! subscriber; a panicking handler is logged and the lane keeps draining.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use super::Subscribe;
use crate::events::Event;

struct Lane {
    subscriber: &'static str,
    queue: mpsc::Sender<Arc<Event>>,
    drain: JoinHandle<()>,
}

impl Lane {
    fn open(sub: Arc<dyn Subscribe>) -> Self {
        let subscriber = sub.name();
        let (queue, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));

        let drain = tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                let handled = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await;
                if handled.is_err() {
                    tracing::error!(subscriber, seq = ev.seq, kind = ?ev.kind, "subscriber panicked");
                }
            }
        });

        Self {
            subscriber,
            queue,
            drain,
        }
    }
}

/// Subscribers of one coordinator run, each behind its own queue.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
}

impl SubscriberSet {
    /// Opens one lane per subscriber. Needs a running tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self {
            lanes: subs.into_iter().map(Lane::open).collect(),
        }
    }

    /// Enqueues `event` for every subscriber without waiting.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for lane in &self.lanes {
            let dropped = match lane.queue.try_send(Arc::clone(&ev)) {
                Ok(()) => continue,
                Err(TrySendError::Full(_)) => "queue full",
                Err(TrySendError::Closed(_)) => "lane closed",
            };
            tracing::warn!(subscriber = lane.subscriber, seq = ev.seq, dropped, "event not delivered");
        }
    }

    /// Closes every lane and waits until queued events have been handled.
    pub async fn shutdown(self) {
        let drains: Vec<JoinHandle<()>> = self
            .lanes
            .into_iter()
            .map(|lane| {
                drop(lane.queue);
                lane.drain
            })
            .collect();
        for drain in drains {
            let _ = drain.await;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}
