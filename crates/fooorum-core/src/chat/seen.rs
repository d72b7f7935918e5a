//! Bounded memory of message ids already delivered.
//!
//! An id stays remembered after its message is pruned from the feed, so a
//! re-delivery is never shown twice. Entries expire after `ttl` (never
//! shorter than the feed's retention window) or when `capacity` is exceeded,
//! oldest first.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};

use fooorum_types::chat::MessageId;

#[derive(Debug)]
pub struct SeenCache {
    order: VecDeque<(MessageId, DateTime<Utc>)>,
    ids: HashSet<MessageId>,
    capacity: usize,
    ttl: chrono::Duration,
}

impl SeenCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            order: VecDeque::new(),
            ids: HashSet::new(),
            capacity: capacity.max(1),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    /// Record `id` as seen at `now`. Returns `false` if it was already known.
    pub fn insert(&mut self, id: MessageId, now: DateTime<Utc>) -> bool {
        if !self.ids.insert(id.clone()) {
            return false;
        }
        self.order.push_back((id, now));

        while self.order.len() > self.capacity {
            if let Some((evicted, _)) = self.order.pop_front() {
                self.ids.remove(&evicted);
            }
        }
        true
    }

    /// Forget ids first seen more than `ttl` before `now`.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        let mut evicted = 0;
        while let Some((_, seen_at)) = self.order.front() {
            if now.signed_duration_since(*seen_at) < self.ttl {
                break;
            }
            if let Some((id, _)) = self.order.pop_front() {
                self.ids.remove(&id);
                evicted += 1;
            }
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> MessageId {
        MessageId::from(s)
    }

    #[test]
    fn insert_reports_duplicates() {
        let mut seen = SeenCache::new(10, Duration::from_secs(60));
        let now = Utc::now();
        assert!(seen.insert(id("a"), now));
        assert!(!seen.insert(id("a"), now));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut seen = SeenCache::new(2, Duration::from_secs(60));
        let now = Utc::now();
        seen.insert(id("a"), now);
        seen.insert(id("b"), now);
        seen.insert(id("c"), now);

        assert!(!seen.contains(&id("a")));
        assert!(seen.contains(&id("b")));
        assert!(seen.contains(&id("c")));
    }

    #[test]
    fn ttl_expiry_forgets_old_ids_only() {
        let mut seen = SeenCache::new(10, Duration::from_secs(3600));
        let start = Utc::now();
        seen.insert(id("old"), start);
        seen.insert(id("new"), start + chrono::Duration::minutes(45));

        let evicted = seen.evict_expired(start + chrono::Duration::minutes(61));
        assert_eq!(evicted, 1);
        assert!(!seen.contains(&id("old")));
        assert!(seen.contains(&id("new")));
    }

    #[test]
    fn zero_capacity_still_remembers_latest() {
        let mut seen = SeenCache::new(0, Duration::from_secs(60));
        assert!(seen.insert(id("a"), Utc::now()));
        assert!(seen.contains(&id("a")));
    }
}
