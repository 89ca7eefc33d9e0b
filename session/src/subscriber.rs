use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use uuid::Uuid;

use crate::error::SendError;
use crate::model::{Payload, SubscriberId};

/// A connected consumer of market updates.
///
/// `send` must not block: a transport that cannot take the payload right now
/// reports an error and the payload is dropped for that subscriber.
pub trait Subscriber: Send + Sync {
    fn id(&self) -> SubscriberId;
    fn is_open(&self) -> bool;
    fn send(&self, payload: Payload) -> Result<(), SendError>;
}

/// Subscriber backed by a bounded channel whose receiver is drained by the
/// connection's writer task.
pub struct ChannelSubscriber {
    id: SubscriberId,
    tx: Sender<Payload>,
    open: AtomicBool,
}

impl ChannelSubscriber {
    pub fn new(capacity: usize) -> (Arc<Self>, Receiver<Payload>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let sub = Arc::new(Self {
            id: Uuid::new_v4(),
            tx,
            open: AtomicBool::new(true),
        });
        (sub, rx)
    }

    /// Marks the connection closed; later sends fail with [`SendError::Closed`].
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }
}

impl Subscriber for ChannelSubscriber {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire) && !self.tx.is_closed()
    }

    fn send(&self, payload: Payload) -> Result<(), SendError> {
        if !self.open.load(Ordering::Acquire) {
            return Err(SendError::Closed);
        }

        self.tx.try_send(payload).map_err(|e| match e {
            TrySendError::Full(_) => SendError::Full,
            TrySendError::Closed(_) => SendError::Closed,
        })
    }
}
