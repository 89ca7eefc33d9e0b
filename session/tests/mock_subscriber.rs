use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use uuid::Uuid;

use session::{Payload, SendError, Subscriber, SubscriberId};

/// Records every payload it accepts. `failing` makes every send error out;
/// `open` can be flipped to simulate a half-closed connection.
pub struct MockSubscriber {
    pub id: SubscriberId,
    pub open: AtomicBool,
    pub failing: bool,
    pub received: Mutex<Vec<Payload>>,
}

impl MockSubscriber {
    pub fn healthy() -> Self {
        Self::build(false)
    }

    pub fn failing() -> Self {
        Self::build(true)
    }

    fn build(failing: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            open: AtomicBool::new(true),
            failing,
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn received_len(&self) -> usize {
        self.received.lock().len()
    }
}

impl Subscriber for MockSubscriber {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn send(&self, payload: Payload) -> Result<(), SendError> {
        if self.failing {
            return Err(SendError::Transport("broken pipe".into()));
        }
        self.received.lock().push(payload);
        Ok(())
    }
}
