//! Error types for the relstack engine.
//!
//! Failures fall into two disjoint classes. Errors from the secure-session
//! adapter or from packet encapsulation are *fatal*: they permanently
//! invalidate the stack. Errors from packet decapsulation are *recoverable*:
//! they are reported to the caller of [`net_recv`] and the stack stays
//! usable, since integrity failures on individual inbound packets are
//! expected on a lossy or adversarial network.
//!
//! [`net_recv`]: crate::stack::ProtoStack::net_recv

use thiserror::Error;

/// Errors reported by the secure-session adapter.
///
/// Any of these invalidates the stack; the session layer's own error
/// semantics are not second-guessed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SslError {
    /// Handshake could not be started or failed mid-flight.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    /// Cleartext write into the session failed.
    #[error("cleartext write failed: {0}")]
    WriteFailed(String),

    /// Cleartext read out of the session failed.
    #[error("cleartext read failed: {0}")]
    ReadFailed(String),

    /// The session rejected inbound ciphertext.
    #[error("ciphertext rejected: {0}")]
    CiphertextRejected(String),
}

/// Error from the encapsulation hook.
///
/// Encapsulation failure is fatal to the whole session, never a per-packet
/// skip.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("encapsulation failed: {0}")]
pub struct EncapsulateError(pub String);

/// Errors from the decapsulation hook.
///
/// These are recoverable: the offending packet is discarded and the stack
/// remains usable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecapsulateError {
    /// Packet failed its integrity check.
    #[error("packet integrity check failed")]
    Integrity,

    /// Packet framing could not be parsed.
    #[error("malformed packet: {0}")]
    Malformed(String),
}

/// Fatal, session-invalidating errors.
///
/// After one of these is returned the stack is permanently unusable; every
/// further mutating call is a no-op and [`next_retransmit`] reports the
/// infinite sentinel.
///
/// [`next_retransmit`]: crate::stack::ProtoStack::next_retransmit
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FatalError {
    /// Secure-session adapter failure.
    #[error("secure session error: {0}")]
    Ssl(#[from] SslError),

    /// Encapsulation hook failure.
    #[error("encapsulation error: {0}")]
    Encapsulation(#[from] EncapsulateError),
}

/// Errors surfaced by [`net_recv`].
///
/// Distinguishes the recoverable per-packet class from the fatal class so
/// callers can pattern-match on the result kind instead of guessing from
/// stack state.
///
/// [`net_recv`]: crate::stack::ProtoStack::net_recv
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecvError {
    /// The inbound packet was rejected; the stack is still usable.
    #[error("decapsulation error: {0}")]
    Decapsulate(#[from] DecapsulateError),

    /// The session was invalidated while dispatching the packet.
    #[error(transparent)]
    Fatal(#[from] FatalError),
}

impl RecvError {
    /// Whether this error invalidated the stack.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RecvError::Fatal(_))
    }
}
