//! # relstack
//!
//! A reliability-and-encapsulation engine that lets a TLS-like secure
//! session run over an unreliable, unordered datagram link. It provides:
//!
//! - **Reliability**: sliding-window sequencing, selective ACKs, and
//!   per-packet retransmission with exponential backoff
//! - **Encapsulation**: a pluggable wire format owned by the layer above
//! - **Back-pressure**: non-blocking session I/O with byte-exact resume
//! - **Sans-IO**: no sockets, no threads, no clock of its own; the caller
//!   drives everything and may pass an explicit `Instant`
//!
//! ## Modules
//!
//! - [`core`]: collaborator traits and error types
//! - [`frame`]: buffer sizing policy
//! - [`reliable`]: send/receive windows and pending-ACK bookkeeping
//! - [`stack`]: the [`ProtoStack`] orchestrator and its queues
//!
//! ## Example
//!
//! The reliability layer can be used on its own:
//!
//! ```rust
//! use std::time::Instant;
//! use relstack::reliable::{RecvWindow, SendWindow};
//!
//! let now = Instant::now();
//! let mut send: SendWindow<Vec<u8>> = SendWindow::new(8);
//! let id = send.push(b"hello".to_vec(), now);
//! assert!(send.get(id).is_some());
//! send.acknowledge(id);
//! assert!(send.is_empty());
//!
//! let mut recv: RecvWindow<Vec<u8>> = RecvWindow::new(8);
//! recv.insert(1, b"second".to_vec());
//! // Nothing is released until id 0 fills the gap.
//! assert!(recv.pop_sequenced().is_none());
//! recv.insert(0, b"first".to_vec());
//! assert_eq!(recv.pop_sequenced(), Some((0, b"first".to_vec())));
//! assert_eq!(recv.pop_sequenced(), Some((1, b"second".to_vec())));
//! ```
//!
//! The full engine is assembled by implementing the three [`core`] traits
//! ([`WirePacket`], [`SecureSession`], [`ProtocolHooks`]) and constructing a
//! [`ProtoStack`] around them. A driving loop feeds inbound packets to
//! [`ProtoStack::net_recv`], queues outbound data with
//! [`ProtoStack::app_send`] or [`ProtoStack::raw_send`], calls
//! [`ProtoStack::flush`] after each burst of activity, and schedules
//! [`ProtoStack::retransmit`] from [`ProtoStack::next_retransmit`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod core;
pub mod frame;
pub mod reliable;
pub mod stack;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;
    pub use crate::frame::{FramePurpose, FrameSizing};
    pub use crate::reliable::{
        Disposition, PendingAcks, RecvWindow, ReliabilityView, RetryTiming, SendWindow, SeqId,
    };
    pub use crate::stack::{ProtoStack, StackConfig, StackStats};
}

// Re-export commonly used items at crate root
pub use crate::core::error::{DecapsulateError, EncapsulateError, FatalError, RecvError, SslError};
pub use crate::core::traits::{ProtocolHooks, SecureSession, WirePacket};
pub use crate::reliable::SeqId;
pub use crate::stack::{ProtoStack, StackConfig, StackStats};
