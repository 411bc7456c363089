//! Protocol constants and default tuning values.

use std::time::Duration;

/// Default reliability window span (maximum outstanding sequence ids per
/// direction).
pub const DEFAULT_WINDOW_SPAN: u64 = 8;

/// Default maximum number of ACK ids bundled into a single packet.
pub const DEFAULT_MAX_ACK_LIST: usize = 4;

/// Default capacity of the pending-ACK set.
///
/// Pushes beyond this bound are dropped and counted; the ids are recovered
/// by the peer's retransmission.
pub const DEFAULT_PENDING_ACK_CAPACITY: usize = 64;

/// Initial retransmission timeout for a freshly sent window entry.
pub const DEFAULT_INITIAL_RTO: Duration = Duration::from_millis(1000);

/// Maximum retransmission timeout.
///
/// Caps exponential backoff growth during sustained packet loss.
pub const DEFAULT_MAX_RTO: Duration = Duration::from_secs(60);

/// Exponential backoff multiplier applied after each retransmission.
pub const DEFAULT_BACKOFF_MULTIPLIER: u32 = 2;

/// Default buffer capacity for a standalone ACK packet.
pub const DEFAULT_ACK_FRAME_CAPACITY: usize = 256;

/// Default buffer capacity for one cleartext read out of the secure session.
pub const DEFAULT_CLEARTEXT_FRAME_CAPACITY: usize = 2048;
