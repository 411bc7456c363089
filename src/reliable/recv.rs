//! Reliable receive window.
//!
//! Buffers received-but-possibly-out-of-order messages by sequence id and
//! releases them strictly in order. Storage mirrors the send window: a ring
//! of `span` slots keyed by `id % span` ahead of an in-order cursor. The
//! window never reorders delivery; ids below the cursor are duplicates and
//! ids at or beyond `cursor + span` are outside the window.

use super::SeqId;

/// Classification of an inbound sequence id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// In-window id not seen before; the packet was (or may be) stored.
    New,
    /// Already delivered or already buffered.
    Duplicate,
    /// Too far ahead of the in-order cursor to buffer.
    OutOfWindow,
}

/// Bounded reassembly window for inbound sequenced messages.
#[derive(Debug)]
pub struct RecvWindow<P> {
    slots: Vec<Option<P>>,
    span: u64,
    /// Next id to deliver in order.
    cursor: SeqId,
}

impl<P> RecvWindow<P> {
    /// Create a window with the given span.
    pub fn new(span: u64) -> Self {
        assert!(span > 0, "window span must be non-zero");
        Self {
            slots: (0..span).map(|_| None).collect(),
            span,
            cursor: 0,
        }
    }

    /// Window span.
    pub fn span(&self) -> u64 {
        self.span
    }

    /// Next sequence id to be delivered in order.
    pub fn next_seq(&self) -> SeqId {
        self.cursor
    }

    /// Classify an inbound id without storing anything.
    pub fn accept(&self, id: SeqId) -> Disposition {
        if id < self.cursor {
            Disposition::Duplicate
        } else if id >= self.cursor + self.span {
            Disposition::OutOfWindow
        } else if self.slots[(id % self.span) as usize].is_some() {
            Disposition::Duplicate
        } else {
            Disposition::New
        }
    }

    /// Store an inbound packet under its sequence id.
    ///
    /// The packet is kept only when the id classifies as
    /// [`Disposition::New`]; duplicates and out-of-window packets are
    /// dropped.
    pub fn insert(&mut self, id: SeqId, packet: P) -> Disposition {
        let disposition = self.accept(id);
        if disposition == Disposition::New {
            self.slots[(id % self.span) as usize] = Some(packet);
        }
        disposition
    }

    /// Whether the next-in-order message is available.
    pub fn ready(&self) -> bool {
        self.slots[(self.cursor % self.span) as usize].is_some()
    }

    /// Borrow the next-in-order packet without consuming it.
    pub fn peek_sequenced(&self) -> Option<&P> {
        self.slots[(self.cursor % self.span) as usize].as_ref()
    }

    /// Pop the next-in-order message and advance the cursor.
    pub fn pop_sequenced(&mut self) -> Option<(SeqId, P)> {
        let slot = (self.cursor % self.span) as usize;
        let packet = self.slots[slot].take()?;
        let id = self.cursor;
        self.cursor += 1;
        Some((id, packet))
    }

    /// Number of buffered (not yet delivered) messages.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether no messages are buffered.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }
}
