//! Reliable send window.
//!
//! Tracks outstanding sent messages by monotonically increasing sequence id,
//! each carrying its own retransmit deadline. Storage is a ring of `span`
//! slots keyed by `id % span`; an id is never reused while its entry is
//! still outstanding, so the live id range is always at most `span` wide.

use std::time::{Duration, Instant};

use crate::core::constants;
use super::SeqId;

/// Retransmission timing configuration for send-window entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryTiming {
    /// Timeout for the first retransmission of a fresh entry.
    pub initial_rto: Duration,
    /// Cap on backoff growth.
    pub max_rto: Duration,
    /// Multiplier applied to an entry's timeout after each retransmission.
    pub backoff_multiplier: u32,
}

impl Default for RetryTiming {
    fn default() -> Self {
        Self {
            initial_rto: constants::DEFAULT_INITIAL_RTO,
            max_rto: constants::DEFAULT_MAX_RTO,
            backoff_multiplier: constants::DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

/// One outstanding sent message awaiting acknowledgement.
#[derive(Debug)]
pub struct SendEntry<P> {
    id: SeqId,
    /// The encapsulated packet, retransmitted verbatim until acknowledged.
    pub packet: P,
    next_retry: Instant,
    rto: Duration,
    retransmit_count: u32,
}

impl<P> SendEntry<P> {
    /// Sequence id of this entry.
    pub fn id(&self) -> SeqId {
        self.id
    }

    /// How many times this entry has been retransmitted.
    pub fn retransmit_count(&self) -> u32 {
        self.retransmit_count
    }

    /// Whether this entry's retransmit deadline has elapsed.
    pub fn ready_retransmit(&self, now: Instant) -> bool {
        now >= self.next_retry
    }

    /// Reset the deadline after a retransmission, with exponential backoff.
    pub fn reset_retransmit(&mut self, now: Instant, timing: &RetryTiming) {
        self.retransmit_count += 1;
        self.rto = (self.rto * timing.backoff_multiplier).min(timing.max_rto);
        self.next_retry = now + self.rto;
    }

    /// Time until this entry's deadline, zero if already due.
    fn until_retry(&self, now: Instant) -> Duration {
        self.next_retry.saturating_duration_since(now)
    }
}

/// Bounded window of outstanding, unacknowledged outbound messages.
#[derive(Debug)]
pub struct SendWindow<P> {
    slots: Vec<Option<SendEntry<P>>>,
    span: u64,
    /// Oldest id that may still be outstanding.
    head: SeqId,
    /// Next id to allocate.
    next: SeqId,
    timing: RetryTiming,
}

impl<P> SendWindow<P> {
    /// Create a window with the given span and default retry timing.
    pub fn new(span: u64) -> Self {
        Self::with_timing(span, RetryTiming::default())
    }

    /// Create a window with explicit retry timing.
    pub fn with_timing(span: u64, timing: RetryTiming) -> Self {
        assert!(span > 0, "window span must be non-zero");
        Self {
            slots: (0..span).map(|_| None).collect(),
            span,
            head: 0,
            next: 0,
            timing,
        }
    }

    /// Window span (maximum outstanding entries).
    pub fn span(&self) -> u64 {
        self.span
    }

    /// Whether there is room to send another message.
    pub fn ready(&self) -> bool {
        self.next - self.head < self.span
    }

    /// Oldest id that may still be outstanding.
    pub fn head_id(&self) -> SeqId {
        self.head
    }

    /// One past the newest allocated id.
    pub fn tail_id(&self) -> SeqId {
        self.next
    }

    /// The id the next [`push`](Self::push) will allocate.
    pub fn next_id(&self) -> SeqId {
        self.next
    }

    /// Number of outstanding entries.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether no entries are outstanding.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Store a sent packet under the next sequence id.
    ///
    /// The entry's first retransmit deadline is `now + initial_rto`.
    /// Callers must check [`ready`](Self::ready) first.
    pub fn push(&mut self, packet: P, now: Instant) -> SeqId {
        assert!(self.ready(), "send window is full");
        let id = self.next;
        self.next += 1;
        let slot = (id % self.span) as usize;
        self.slots[slot] = Some(SendEntry {
            id,
            packet,
            next_retry: now + self.timing.initial_rto,
            rto: self.timing.initial_rto,
            retransmit_count: 0,
        });
        id
    }

    /// Look up an outstanding entry by id.
    pub fn get(&self, id: SeqId) -> Option<&SendEntry<P>> {
        if id < self.head || id >= self.next {
            return None;
        }
        self.slots[(id % self.span) as usize]
            .as_ref()
            .filter(|e| e.id == id)
    }

    /// Mutable lookup of an outstanding entry by id.
    pub fn get_mut(&mut self, id: SeqId) -> Option<&mut SendEntry<P>> {
        if id < self.head || id >= self.next {
            return None;
        }
        self.slots[(id % self.span) as usize]
            .as_mut()
            .filter(|e| e.id == id)
    }

    /// Reset the given entry's retransmit deadline with backoff applied.
    pub fn reset_retransmit(&mut self, id: SeqId, now: Instant) {
        let timing = self.timing;
        if let Some(entry) = self.get_mut(id) {
            entry.reset_retransmit(now, &timing);
        }
    }

    /// Retire the entry for `id` after the peer acknowledged it.
    ///
    /// Returns whether an outstanding entry was retired. Duplicate and
    /// out-of-range ACKs are ignored.
    pub fn acknowledge(&mut self, id: SeqId) -> bool {
        if id < self.head || id >= self.next {
            return false;
        }
        let slot = (id % self.span) as usize;
        let retired = match &self.slots[slot] {
            Some(entry) if entry.id == id => {
                self.slots[slot] = None;
                true
            }
            _ => false,
        };
        // Advance head past retired entries to free window capacity.
        while self.head < self.next && self.slots[(self.head % self.span) as usize].is_none() {
            self.head += 1;
        }
        retired
    }

    /// Time until the earliest outstanding entry is due for retransmission.
    ///
    /// `None` when the window is empty (the infinite sentinel).
    pub fn until_retransmit(&self, now: Instant) -> Option<Duration> {
        self.slots
            .iter()
            .flatten()
            .map(|e| e.until_retry(now))
            .min()
    }

    /// Iterate outstanding entries oldest-to-newest by sequence id.
    pub fn iter(&self) -> impl Iterator<Item = &SendEntry<P>> {
        (self.head..self.next).filter_map(|id| self.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(span: u64) -> SendWindow<Vec<u8>> {
        SendWindow::with_timing(
            span,
            RetryTiming {
                initial_rto: Duration::from_millis(100),
                max_rto: Duration::from_millis(400),
                backoff_multiplier: 2,
            },
        )
    }

    #[test]
    fn test_push_allocates_sequential_ids() {
        let mut w = window(4);
        let now = Instant::now();
        assert_eq!(w.push(vec![0], now), 0);
        assert_eq!(w.push(vec![1], now), 1);
        assert_eq!(w.head_id(), 0);
        assert_eq!(w.tail_id(), 2);
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn test_ready_respects_span() {
        let mut w = window(2);
        let now = Instant::now();
        assert!(w.ready());
        w.push(vec![0], now);
        w.push(vec![1], now);
        assert!(!w.ready());

        // Retiring the oldest entry frees a slot.
        assert!(w.acknowledge(0));
        assert!(w.ready());
        assert_eq!(w.head_id(), 1);
    }

    #[test]
    fn test_acknowledge_out_of_order() {
        let mut w = window(4);
        let now = Instant::now();
        for i in 0..4u8 {
            w.push(vec![i], now);
        }

        // Selective ack in the middle does not advance head.
        assert!(w.acknowledge(2));
        assert_eq!(w.head_id(), 0);
        assert!(!w.ready());

        // Acking the head skips the hole.
        assert!(w.acknowledge(0));
        assert!(w.acknowledge(1));
        assert_eq!(w.head_id(), 3);
        assert!(w.ready());
    }

    #[test]
    fn test_duplicate_ack_ignored() {
        let mut w = window(4);
        let now = Instant::now();
        w.push(vec![0], now);
        assert!(w.acknowledge(0));
        assert!(!w.acknowledge(0));
        assert!(!w.acknowledge(7));
    }

    #[test]
    fn test_retransmit_deadline_and_backoff() {
        let mut w = window(4);
        let start = Instant::now();
        let id = w.push(vec![9], start);

        let entry = w.get(id).unwrap();
        assert!(!entry.ready_retransmit(start));
        assert!(entry.ready_retransmit(start + Duration::from_millis(100)));

        // Backoff doubles the timeout each retransmission, capped at max.
        w.reset_retransmit(id, start);
        assert!(!w.get(id).unwrap().ready_retransmit(start + Duration::from_millis(150)));
        assert!(w.get(id).unwrap().ready_retransmit(start + Duration::from_millis(200)));

        w.reset_retransmit(id, start);
        w.reset_retransmit(id, start);
        w.reset_retransmit(id, start);
        // 100 -> 200 -> 400 -> capped at 400.
        let entry = w.get(id).unwrap();
        assert_eq!(entry.retransmit_count(), 4);
        assert!(entry.ready_retransmit(start + Duration::from_millis(400)));
    }

    #[test]
    fn test_until_retransmit() {
        let mut w = window(4);
        let start = Instant::now();
        assert_eq!(w.until_retransmit(start), None);

        w.push(vec![0], start);
        let until = w.until_retransmit(start).unwrap();
        assert!(until <= Duration::from_millis(100));

        // Past the deadline the wait clamps to zero.
        assert_eq!(
            w.until_retransmit(start + Duration::from_millis(200)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_ring_reuses_slots() {
        let mut w = window(2);
        let now = Instant::now();
        for round in 0..10u64 {
            let id = w.push(vec![round as u8], now);
            assert_eq!(id, round);
            assert!(w.acknowledge(id));
        }
        assert!(w.is_empty());
        assert_eq!(w.head_id(), 10);
    }

    #[test]
    fn test_iter_oldest_to_newest() {
        let mut w = window(4);
        let now = Instant::now();
        for i in 0..4u8 {
            w.push(vec![i], now);
        }
        w.acknowledge(1);
        let ids: Vec<_> = w.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![0, 2, 3]);
    }
}
