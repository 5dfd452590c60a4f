//! Coordinator events.
//!
//! Every state transition of a pending request is published on a broadcast bus. Hosts can
//! [`subscribe`](crate::coordinator::HttpCoordinator::subscribe) to drive UI or metrics without
//! registering callbacks for each request. Events are sent after the fact; the bus never
//! influences how a request is processed.

use crate::coordinator::RequestId;
use crate::errors::CoordinatorError;
use crate::net::TransportStatus;
use tokio::sync::broadcast;

/// Receiving side of the coordinator event bus.
pub type Subscription = broadcast::Receiver<CoordinatorEvent>;

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    /// A new transport call was started for `url`
    RequestIssued { id: RequestId, url: String },
    /// A caller joined an already running request. `waiters` includes the new caller.
    RequestAttached { id: RequestId, url: String, waiters: usize },
    /// The transport finished and all completion callbacks were drained
    RequestCompleted { id: RequestId, url: String, status: TransportStatus },
    /// The request exceeded its timeout and all completion callbacks were drained
    RequestTimedOut { id: RequestId, url: String },
    /// A completion or progress callback returned an error or panicked
    CallbackFailed { id: RequestId, error: CoordinatorError },
}

#[derive(Debug)]
pub(crate) struct EventBus {
    tx: broadcast::Sender<CoordinatorEvent>,
}

impl EventBus {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> Subscription {
        self.tx.subscribe()
    }

    pub(crate) fn publish(&self, ev: CoordinatorEvent) {
        // send() only fails when nobody is subscribed
        let _ = self.tx.send(ev);
    }
}
