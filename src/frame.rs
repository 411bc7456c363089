//! Frame sizing policy.
//!
//! Buffers handed to the derived layer or to the secure session are prepared
//! for a specific purpose; the sizing policy maps each purpose to a buffer
//! capacity. Wire formats are not fixed here, only how much room they get.

use crate::core::constants;

/// What a prepared buffer is about to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePurpose {
    /// A standalone ACK packet to be generated and transmitted.
    AckStandalone,
    /// A scratch buffer for one cleartext read out of the secure session.
    SslCleartextRead,
}

/// Buffer capacity policy, one knob per [`FramePurpose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSizing {
    /// Capacity for standalone ACK packets.
    pub ack_capacity: usize,
    /// Capacity for cleartext reads from the session.
    pub cleartext_capacity: usize,
}

impl FrameSizing {
    /// Capacity for the given purpose.
    pub fn capacity(&self, purpose: FramePurpose) -> usize {
        match purpose {
            FramePurpose::AckStandalone => self.ack_capacity,
            FramePurpose::SslCleartextRead => self.cleartext_capacity,
        }
    }
}

impl Default for FrameSizing {
    fn default() -> Self {
        Self {
            ack_capacity: constants::DEFAULT_ACK_FRAME_CAPACITY,
            cleartext_capacity: constants::DEFAULT_CLEARTEXT_FRAME_CAPACITY,
        }
    }
}
