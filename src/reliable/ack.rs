//! Pending-ACK bookkeeping.
//!
//! Sequence ids observed from the peer that have not yet been echoed back.
//! The derived layer drains the set when it encapsulates an outbound packet
//! (piggy-backed ACKs) or when it generates a standalone ACK packet.

use std::collections::VecDeque;

use crate::core::constants;
use super::SeqId;

/// Bounded, duplicate-suppressing set of sequence ids awaiting
/// acknowledgement to the peer.
#[derive(Debug)]
pub struct PendingAcks {
    ids: VecDeque<SeqId>,
    capacity: usize,
    max_batch: usize,
    dropped: u64,
}

impl PendingAcks {
    /// Create a set with the default capacity and batch limit.
    pub fn new() -> Self {
        Self::with_limits(
            constants::DEFAULT_PENDING_ACK_CAPACITY,
            constants::DEFAULT_MAX_ACK_LIST,
        )
    }

    /// Create a set bounded to `capacity` ids, draining at most `max_batch`
    /// per outbound packet.
    pub fn with_limits(capacity: usize, max_batch: usize) -> Self {
        assert!(capacity > 0, "pending-ACK capacity must be non-zero");
        assert!(max_batch > 0, "ACK batch limit must be non-zero");
        Self {
            ids: VecDeque::with_capacity(capacity),
            capacity,
            max_batch,
            dropped: 0,
        }
    }

    /// Record a sequence id to acknowledge.
    ///
    /// Returns whether the id was recorded. Duplicates are ignored; pushes
    /// beyond capacity are dropped and counted, relying on the peer's
    /// retransmission to offer the id again.
    pub fn push(&mut self, id: SeqId) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        if self.ids.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.ids.push_back(id);
        true
    }

    /// Remove and return up to one batch of ids, oldest first.
    ///
    /// The batch size is the per-packet limit the set was built with.
    pub fn take_batch(&mut self) -> Vec<SeqId> {
        let n = self.max_batch.min(self.ids.len());
        self.ids.drain(..n).collect()
    }

    /// Maximum number of ids a single outbound packet may carry.
    pub fn max_batch(&self) -> usize {
        self.max_batch
    }

    /// Whether no ids are pending.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether the set is at capacity.
    pub fn is_full(&self) -> bool {
        self.ids.len() >= self.capacity
    }

    /// Number of pending ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Number of ids dropped because the set was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Discard all pending ids.
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl Default for PendingAcks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain() {
        let mut acks = PendingAcks::with_limits(8, 3);
        assert!(acks.is_empty());

        for id in 0..5u64 {
            assert!(acks.push(id));
        }
        assert_eq!(acks.len(), 5);

        assert_eq!(acks.take_batch(), vec![0, 1, 2]);
        assert_eq!(acks.take_batch(), vec![3, 4]);
        assert!(acks.is_empty());
    }

    #[test]
    fn test_duplicates_suppressed() {
        let mut acks = PendingAcks::with_limits(8, 4);
        assert!(acks.push(7));
        assert!(!acks.push(7));
        assert_eq!(acks.len(), 1);
        assert_eq!(acks.dropped(), 0);
    }

    #[test]
    fn test_capacity_bound() {
        let mut acks = PendingAcks::with_limits(2, 1);
        assert!(acks.push(0));
        assert!(acks.push(1));
        assert!(acks.is_full());

        assert!(!acks.push(2));
        assert_eq!(acks.dropped(), 1);
        assert_eq!(acks.len(), 2);

        // Draining frees capacity again.
        acks.take_batch();
        assert!(acks.push(2));
    }

    #[test]
    fn test_clear() {
        let mut acks = PendingAcks::with_limits(4, 4);
        acks.push(1);
        acks.push(2);
        acks.clear();
        assert!(acks.is_empty());
    }
}
