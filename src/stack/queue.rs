//! Outbound queues.
//!
//! Two FIFO queues feed the down-direction pipelines: cleartext buffers
//! headed for the secure session, and raw packets headed straight for the
//! send window. Items leave a queue only after being fully handed off
//! downstream; a cleartext buffer the session only partially accepted stays
//! at the front with its consumed prefix recorded, so the retry resumes at
//! the exact byte where back-pressure hit.

use std::collections::VecDeque;

/// One queued cleartext buffer with its consumed prefix.
#[derive(Debug)]
pub struct CleartextItem {
    data: Vec<u8>,
    offset: usize,
}

impl CleartextItem {
    fn new(data: Vec<u8>) -> Self {
        Self { data, offset: 0 }
    }

    /// The bytes not yet accepted by the session.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.offset..]
    }

    /// Record `n` more bytes as accepted; returns whether the buffer is
    /// fully consumed.
    pub fn consume(&mut self, n: usize) -> bool {
        self.offset = (self.offset + n).min(self.data.len());
        self.offset == self.data.len()
    }
}

/// FIFO of outbound cleartext buffers awaiting the secure session.
#[derive(Debug, Default)]
pub struct CleartextQueue {
    items: VecDeque<CleartextItem>,
}

impl CleartextQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a buffer at the back.
    pub fn push(&mut self, data: Vec<u8>) {
        self.items.push_back(CleartextItem::new(data));
    }

    /// Borrow the front item mutably, if any.
    pub fn front_mut(&mut self) -> Option<&mut CleartextItem> {
        self.items.front_mut()
    }

    /// Drop the (fully consumed) front item.
    pub fn pop_front(&mut self) {
        self.items.pop_front();
    }

    /// Number of queued buffers.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// FIFO of outbound raw packets awaiting the send window.
#[derive(Debug)]
pub struct RawQueue<P> {
    items: VecDeque<P>,
}

impl<P> RawQueue<P> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Append a packet at the back.
    pub fn push(&mut self, pkt: P) {
        self.items.push_back(pkt);
    }

    /// Remove and return the front packet.
    pub fn pop_front(&mut self) -> Option<P> {
        self.items.pop_front()
    }

    /// Number of queued packets.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<P> Default for RawQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}
