//! Sliding-window reliability layer.
//!
//! Three small bookkeeping structures give in-order, exactly-once delivery
//! over a lossy link: the [`SendWindow`] of outstanding unacknowledged
//! messages, the [`RecvWindow`] that reassembles inbound messages into
//! sequence order, and the [`PendingAcks`] set of ids waiting to be echoed
//! back to the peer. The orchestrator in [`crate::stack`] owns all three and
//! lends them to the derived protocol layer during decapsulation.

pub mod ack;
pub mod recv;
pub mod send;

pub use ack::PendingAcks;
pub use recv::{Disposition, RecvWindow};
pub use send::{RetryTiming, SendEntry, SendWindow};

/// Sequence id: the sole ordering key for both windows.
///
/// Strictly increasing per direction; the window span bounds the live range
/// so an id is never reused while its entry is active. Any narrower wire
/// modulus is the encapsulation layer's concern.
pub type SeqId = u64;

/// Mutable view of the reliability state, lent to the decapsulation hook.
///
/// Decapsulation must insert the unframed packet into `recv`, mark any ACKs
/// the packet carried against `send`, and record the packet's own id in
/// `acks`.
pub struct ReliabilityView<'a, P> {
    /// Send window, for marking ACKs received from the peer.
    pub send: &'a mut SendWindow<P>,
    /// Receive window, for inserting the unframed packet.
    pub recv: &'a mut RecvWindow<P>,
    /// Pending-ACK set, for recording the packet's sequence id.
    pub acks: &'a mut PendingAcks,
}
