//! Broadcast bus for chat view updates.
//!
//! Built on `tokio::sync::broadcast`, so any number of views can follow one
//! transport. Publishing with no active subscribers is a no-op.

use tokio::sync::broadcast;

use fooorum_types::chat::{ChatMessage, ConnectionState};

/// Something the chat view should re-render for.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// The socket moved to a new lifecycle state.
    StateChanged(ConnectionState),
    /// A new message entered the feed (history or live).
    MessageAccepted(ChatMessage),
    /// The history seed completed; `accepted` messages were new.
    HistoryLoaded { accepted: usize },
    /// A prune tick removed `removed` messages.
    Pruned { removed: usize },
    /// A user-visible error banner was raised.
    Error(String),
}

/// Multi-consumer event bus for a mounted chat transport.
///
/// Cloning the bus clones the sender.
pub struct ChatEventBus {
    sender: broadcast::Sender<ChatEvent>,
}

impl ChatEventBus {
    /// Create a bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.sender.subscribe()
    }

    /// Publish to all current subscribers; dropped silently if there are none.
    pub fn publish(&self, event: ChatEvent) {
        let _ = self.sender.send(event);
    }
}

impl Clone for ChatEventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for ChatEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_subscribe_delivers_event() {
        let bus = ChatEventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(ChatEvent::StateChanged(ConnectionState::Open));

        let received = rx.recv().await.unwrap();
        assert_eq!(received, ChatEvent::StateChanged(ConnectionState::Open));
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = ChatEventBus::new(4);
        bus.publish(ChatEvent::Pruned { removed: 1 });
    }

    #[test]
    fn clone_shares_channel() {
        let bus = ChatEventBus::new(16);
        let bus2 = bus.clone();
        let mut rx = bus.subscribe();

        bus2.publish(ChatEvent::HistoryLoaded { accepted: 3 });

        assert_eq!(rx.try_recv().unwrap(), ChatEvent::HistoryLoaded { accepted: 3 });
        assert!(format!("{bus:?}").contains("ChatEventBus"));
    }
}
