//! # Lifecycle event bus.
//!
//! [`Bus`] wraps a [`tokio::sync::broadcast`] channel. The supervisor publishes
//! from inside the monitor loop, so publishing must never wait: a send with no
//! receiver is a no-op and a slow receiver loses the oldest events
//! (`RecvError::Lagged`) instead of applying back-pressure.
//!
//! ```text
//!   Supervisor::start_worker / sweep / shutdown ──┐
//!   Coordinator (BackendResolved, ShutdownReq.) ──┴─► Bus ──► listener ──► SubscriberSet
//! ```

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable publishing handle; every clone feeds the same channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// `capacity` is the ring size shared by all receivers (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Fire-and-forget publish.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_only_later_events_are_seen() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::MonitorStarted));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::NoWorkersLeft));

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::NoWorkersLeft);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_lagging_receiver_skips_oldest() {
        let bus = Bus::new(2);
        let mut rx = bus.subscribe();
        for kind in [
            EventKind::WorkerStarted,
            EventKind::WorkerDied,
            EventKind::WorkerRestarted,
        ] {
            bus.publish(Event::new(kind));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::WorkerDied);
    }
}
