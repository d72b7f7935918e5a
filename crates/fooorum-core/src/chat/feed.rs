//! The in-memory message list behind the chat view.
//!
//! Invariants:
//! - at most one entry per [`MessageId`], even after the seen cache has
//!   forgotten an id whose message is still listed;
//! - entries are ordered newest-first by `created_at` (ties keep arrival order);
//! - an id accepted once is never accepted again while the seen cache remembers it;
//! - a message already older than the retention window on arrival is not listed.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};

use fooorum_types::chat::{ChatMessage, IncomingMessage, MessageId};

use super::seen::SeenCache;

/// Default trailing retention window.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
pub struct MessageFeed {
    messages: Vec<ChatMessage>,
    listed: HashSet<MessageId>,
    seen: SeenCache,
    retention: chrono::Duration,
}

impl MessageFeed {
    pub fn new(retention: Duration, seen: SeenCache) -> Self {
        Self {
            messages: Vec::new(),
            listed: HashSet::new(),
            seen,
            retention: chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Accept one frame unless its id has been seen. Returns the stored message.
    pub fn merge(
        &mut self,
        incoming: IncomingMessage,
        received_at: DateTime<Utc>,
    ) -> Option<ChatMessage> {
        let message = self.admit(incoming, received_at)?;
        let position = self
            .messages
            .partition_point(|m| m.created_at >= message.created_at);
        self.messages.insert(position, message.clone());
        Some(message)
    }

    /// Accept a batch (e.g. the history seed). Returns how many were new.
    ///
    /// Duplicates within the batch itself are collapsed as well.
    pub fn merge_batch(
        &mut self,
        batch: impl IntoIterator<Item = IncomingMessage>,
        received_at: DateTime<Utc>,
    ) -> usize {
        let before = self.messages.len();
        for incoming in batch {
            if let Some(message) = self.admit(incoming, received_at) {
                self.messages.push(message);
            }
        }
        self.sort();
        self.messages.len() - before
    }

    /// Drop messages older than the retention window relative to `now`.
    ///
    /// Idempotent for a fixed `now`. Returns the number of messages removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = self.cutoff(now);
        let before = self.messages.len();
        let listed = &mut self.listed;
        self.messages.retain(|m| {
            let keep = m.created_at > cutoff;
            if !keep {
                listed.remove(&m.id);
            }
            keep
        });
        self.sort();
        self.seen.evict_expired(now);
        before - self.messages.len()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.listed.contains(id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Stamp `incoming` and decide whether it may be listed. Records the id
    /// as seen and listed when it is.
    fn admit(
        &mut self,
        incoming: IncomingMessage,
        received_at: DateTime<Utc>,
    ) -> Option<ChatMessage> {
        if self.listed.contains(&incoming.id) {
            return None;
        }
        let message = incoming.stamp(received_at);
        if message.created_at <= self.cutoff(received_at) {
            return None;
        }
        if !self.seen.insert(message.id.clone(), received_at) {
            return None;
        }
        self.listed.insert(message.id.clone());
        Some(message)
    }

    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn sort(&mut self) {
        self.messages
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}

impl Default for MessageFeed {
    fn default() -> Self {
        Self::new(
            DEFAULT_RETENTION,
            SeenCache::new(10_000, DEFAULT_RETENTION * 2),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incoming(id: &str, created_at: Option<DateTime<Utc>>) -> IncomingMessage {
        IncomingMessage {
            id: MessageId::from(id),
            author: "bob".to_string(),
            text: format!("text {id}"),
            created_at,
        }
    }

    fn ids(feed: &MessageFeed) -> Vec<&str> {
        feed.messages().iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn merge_same_id_twice_keeps_one_entry() {
        let mut feed = MessageFeed::default();
        let now = Utc::now();

        assert!(feed.merge(incoming("m1", None), now).is_some());
        assert!(feed.merge(incoming("m1", None), now).is_none());

        assert_eq!(ids(&feed), vec!["m1"]);
    }

    #[test]
    fn merge_keeps_newest_first_regardless_of_arrival() {
        let mut feed = MessageFeed::default();
        let now = Utc::now();
        let minutes = |m| Some(now - chrono::Duration::minutes(m));

        feed.merge(incoming("middle", minutes(5)), now);
        feed.merge(incoming("oldest", minutes(10)), now);
        feed.merge(incoming("newest", minutes(1)), now);

        assert_eq!(ids(&feed), vec!["newest", "middle", "oldest"]);
    }

    #[test]
    fn history_overlapping_live_frames_is_deduplicated() {
        let mut feed = MessageFeed::default();
        let now = Utc::now();
        let minutes = |m| Some(now - chrono::Duration::minutes(m));

        // Live frames arrive before the history response.
        feed.merge(incoming("m3", minutes(1)), now);
        feed.merge(incoming("m2", minutes(2)), now);

        let accepted = feed.merge_batch(
            vec![
                incoming("m1", minutes(3)),
                incoming("m2", minutes(2)),
                incoming("m1", minutes(3)),
            ],
            now,
        );

        assert_eq!(accepted, 1);
        assert_eq!(ids(&feed), vec!["m3", "m2", "m1"]);
    }

    #[test]
    fn prune_drops_messages_outside_window() {
        let mut feed = MessageFeed::default();
        let now = Utc::now();
        let received = now - chrono::Duration::minutes(5);

        feed.merge(incoming("stale", Some(now - chrono::Duration::minutes(31))), received);
        feed.merge(incoming("fresh", Some(now - chrono::Duration::minutes(1))), received);
        assert_eq!(feed.len(), 2);

        let removed = feed.prune(now);
        assert_eq!(removed, 1);
        assert_eq!(ids(&feed), vec!["fresh"]);
    }

    #[test]
    fn prune_is_idempotent() {
        let mut feed = MessageFeed::default();
        let now = Utc::now();
        let received = now - chrono::Duration::minutes(20);
        for (id, age) in [("a", 45), ("b", 29), ("c", 2), ("d", 31)] {
            feed.merge(incoming(id, Some(now - chrono::Duration::minutes(age))), received);
        }

        feed.prune(now);
        let once: Vec<ChatMessage> = feed.messages().to_vec();
        let removed_again = feed.prune(now);

        assert_eq!(removed_again, 0);
        assert_eq!(feed.messages(), once.as_slice());
        assert_eq!(ids(&feed), vec!["c", "b"]);
    }

    #[test]
    fn pruned_message_is_not_readmitted() {
        let mut feed = MessageFeed::default();
        let now = Utc::now();
        let received = now - chrono::Duration::minutes(15);
        let old = Some(now - chrono::Duration::minutes(40));

        feed.merge(incoming("m1", old), received);
        feed.prune(now);
        assert!(feed.is_empty());

        // Redelivered while still inside the window relative to its receipt.
        assert!(feed.merge(incoming("m1", old), received).is_none());
        assert!(!feed.contains(&MessageId::from("m1")));
    }

    #[test]
    fn message_without_timestamp_uses_receipt_time() {
        let mut feed = MessageFeed::default();
        let received = Utc::now();

        let stored = feed.merge(incoming("m1", None), received).unwrap();
        assert_eq!(stored.created_at, received);
    }

    #[test]
    fn full_seen_cache_never_duplicates_a_listed_message() {
        let mut feed = MessageFeed::new(
            DEFAULT_RETENTION,
            SeenCache::new(2, Duration::from_secs(60 * 60)),
        );
        let now = Utc::now();

        for id in ["a", "b", "c"] {
            assert!(feed.merge(incoming(id, None), now).is_some());
        }
        assert!(feed.merge(incoming("a", None), now).is_none());
        assert_eq!(
            feed.merge_batch(vec![incoming("a", None), incoming("b", None)], now),
            0
        );

        let a_count = feed.messages().iter().filter(|m| m.id.as_str() == "a").count();
        assert_eq!(a_count, 1);
        assert_eq!(feed.len(), 3);
    }

    #[test]
    fn message_already_outside_window_is_not_listed() {
        let mut feed = MessageFeed::default();
        let now = Utc::now();

        assert!(
            feed.merge(incoming("old", Some(now - chrono::Duration::minutes(40))), now)
                .is_none()
        );
        let accepted = feed.merge_batch(
            vec![
                incoming("older", Some(now - chrono::Duration::minutes(31))),
                incoming("recent", Some(now - chrono::Duration::minutes(29))),
            ],
            now,
        );

        assert_eq!(accepted, 1);
        assert_eq!(ids(&feed), vec!["recent"]);
    }
}
