//! In-process event bus for identity-change notifications.
//!
//! Delivery is fire-and-forget: publishing never blocks and never fails the
//! mutation that triggered it. Subscribers (statistics aggregation and the
//! like) register once at startup and drain their receiver asynchronously;
//! ordering across subscribers is not guaranteed.

use tokio::sync::broadcast;

use crate::users::models::User;

const CHANNEL_CAPACITY: usize = 64;

/// Event emitted whenever a user identity is mutated (update or delete).
#[derive(Debug, Clone)]
pub enum UserEvent {
    Changed(User),
}

pub struct EventBus {
    tx: broadcast::Sender<UserEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Register a new subscriber. Events published before this call are not
    /// replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<UserEvent> {
        self.tx.subscribe()
    }

    /// Publish an identity-change notification. A send error only means
    /// nobody is listening, which is fine.
    pub fn publish_user_changed(&self, user: User) {
        let _ = self.tx.send(UserEvent::Changed(user));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
