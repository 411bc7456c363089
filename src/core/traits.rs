//! Collaborator contracts for the protocol stack.
//!
//! The engine is polymorphic over three seams: the packet type moved through
//! it ([`WirePacket`]), the secure-session object layered above it
//! ([`SecureSession`]), and the derived protocol layer that owns the wire
//! format ([`ProtocolHooks`]). The stack itself fixes none of these; it only
//! sequences their interactions.

use crate::core::error::{DecapsulateError, EncapsulateError, SslError};
use crate::frame::{FramePurpose, FrameSizing};
use crate::reliable::{PendingAcks, ReliabilityView, SeqId};
use crate::stack::ProtoStack;

/// Outcome of a non-blocking write into the secure session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The session accepted this many bytes from the front of the buffer.
    Accepted(usize),
    /// The session cannot accept data right now; retry after draining it.
    WouldBlock,
}

/// Outcome of a non-blocking read out of the secure session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many bytes were produced into the scratch buffer.
    Read(usize),
    /// No cleartext is available right now.
    WouldBlock,
}

/// Capabilities required of the packet type moved through the stack.
///
/// A packet is either *raw* (sequenced and acknowledged but not passed
/// through the secure session) or *ciphertext* (an opaque secure-session
/// record). The default-constructed packet is the "empty" sentinel.
pub trait WirePacket: Default {
    /// Build a ciphertext packet around a buffer produced by the session.
    fn from_ciphertext(buf: Vec<u8>) -> Self;

    /// Whether this packet holds data (false for the empty sentinel).
    fn is_defined(&self) -> bool;

    /// Whether this packet bypasses the secure session.
    fn is_raw(&self) -> bool;

    /// Reset back to the empty sentinel state.
    fn reset(&mut self);

    /// Borrow the underlying buffer.
    fn payload(&self) -> &[u8];

    /// Take the underlying buffer, leaving the packet empty.
    fn take_payload(&mut self) -> Vec<u8>;

    /// Prepare the underlying buffer for the given purpose, sized by the
    /// frame policy.
    fn frame_prepare(&mut self, sizing: &FrameSizing, purpose: FramePurpose);
}

/// Non-blocking adapter over the external secure-session object.
///
/// The session exposes byte-stream cleartext on one side and discrete
/// ciphertext records on the other. All operations are synchronous;
/// back-pressure is signalled through [`WriteOutcome::WouldBlock`] and
/// [`ReadOutcome::WouldBlock`], never by blocking. Every failure is fatal to
/// the stack that owns the session.
pub trait SecureSession {
    /// Begin the handshake.
    fn start_handshake(&mut self) -> Result<(), SslError>;

    /// Feed application cleartext into the session for encryption.
    ///
    /// May accept a prefix of `data`; the stack retries the remainder on the
    /// next flush.
    fn write_cleartext(&mut self, data: &[u8]) -> Result<WriteOutcome, SslError>;

    /// Whether an encrypted record is ready to be pulled.
    fn read_ciphertext_ready(&self) -> bool;

    /// Pull one encrypted record (handshake or application data).
    fn read_ciphertext(&mut self) -> Result<Vec<u8>, SslError>;

    /// Whether previously written inbound ciphertext is still awaiting
    /// processing, so a cleartext read may make progress.
    fn write_ciphertext_ready(&self) -> bool;

    /// Feed one inbound ciphertext record into the session.
    fn write_ciphertext(&mut self, buf: Vec<u8>) -> Result<(), SslError>;

    /// Read decrypted cleartext into `out`.
    fn read_cleartext(&mut self, out: &mut [u8]) -> Result<ReadOutcome, SslError>;
}

/// Wire-format and delivery callbacks implemented by the derived protocol
/// layer.
///
/// Exactly one hook set is attached per stack, at construction. The
/// wire-format hooks (`encapsulate`, `decapsulate`, `generate_ack`,
/// `net_send`) receive only the state they operate on; the delivery hooks
/// (`app_recv`, `raw_recv`, `invalidated`) additionally receive the stack so
/// the application layer may re-enter the public API. A re-entered
/// [`flush`] is suppressed until the dispatch in progress completes.
///
/// [`flush`]: ProtoStack::flush
pub trait ProtocolHooks<S, P>: Sized
where
    S: SecureSession,
    P: WirePacket,
{
    /// Write wire framing into `pkt`, using `id` as its sequence number.
    ///
    /// If the pending-ACK set is non-empty, ACK ids should be piggy-backed
    /// into the packet and drained from `acks`. An error here invalidates
    /// the session.
    fn encapsulate(
        &mut self,
        id: SeqId,
        pkt: &mut P,
        acks: &mut PendingAcks,
    ) -> Result<(), EncapsulateError>;

    /// Integrity-check and unframe one inbound packet.
    ///
    /// On success the packet should be inserted into `rel.recv`, any ACKs it
    /// carried marked against `rel.send`, and its own sequence number
    /// recorded in `rel.acks`. Returns whether the packet was placed into
    /// the receive window. Errors are reported to the caller of
    /// [`net_recv`] and do not invalidate the session.
    ///
    /// [`net_recv`]: ProtoStack::net_recv
    fn decapsulate(
        &mut self,
        pkt: P,
        rel: ReliabilityView<'_, P>,
    ) -> Result<bool, DecapsulateError>;

    /// Build a standalone ACK packet from the pending-ACK set.
    ///
    /// `pkt` has already been prepared by the frame policy. Must drain at
    /// least one id from `acks`; [`send_pending_acks`] loops until the set
    /// is empty.
    ///
    /// [`send_pending_acks`]: ProtoStack::send_pending_acks
    fn generate_ack(&mut self, pkt: &mut P, acks: &mut PendingAcks);

    /// Hand a finished packet to the network.
    ///
    /// Must not retain the packet or its underlying data beyond the call
    /// unless it copies; retransmissions resend the same packet.
    fn net_send(&mut self, pkt: &P);

    /// Deliver decrypted cleartext to the application.
    fn app_recv(&mut self, cleartext: Vec<u8>, stack: &mut ProtoStack<S, P, Self>);

    /// Deliver an in-order raw packet to the application.
    fn raw_recv(&mut self, pkt: P, stack: &mut ProtoStack<S, P, Self>);

    /// Invoked exactly once when the stack transitions to invalidated.
    fn invalidated(&mut self, stack: &mut ProtoStack<S, P, Self>) {
        let _ = stack;
    }
}
