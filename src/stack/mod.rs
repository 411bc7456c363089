//! Protocol orchestrator.
//!
//! [`ProtoStack`] is the single owner of the reliability windows, the
//! pending-ACK set, and the outbound queues; it drives the bidirectional
//! pipeline between an application, a secure session, and a derived
//! protocol layer's wire format.

pub mod queue;
pub mod stats;

mod proto;

pub use proto::ProtoStack;
pub use stats::StackStats;

use crate::core::constants;
use crate::frame::FrameSizing;
use crate::reliable::RetryTiming;

/// Construction-time configuration for a [`ProtoStack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackConfig {
    /// Reliability window span for both directions.
    pub span: u64,
    /// Maximum ACK ids bundled into one packet.
    pub max_ack_list: usize,
    /// Capacity of the pending-ACK set.
    pub pending_ack_capacity: usize,
    /// Retransmission timing for send-window entries.
    pub retry: RetryTiming,
    /// Buffer sizing policy.
    pub frame: FrameSizing,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            span: constants::DEFAULT_WINDOW_SPAN,
            max_ack_list: constants::DEFAULT_MAX_ACK_LIST,
            pending_ack_capacity: constants::DEFAULT_PENDING_ACK_CAPACITY,
            retry: RetryTiming::default(),
            frame: FrameSizing::default(),
        }
    }
}
