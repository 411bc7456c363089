//! Error and traffic counters.

/// Counters maintained by the orchestrator.
///
/// Diagnostic only; counters keep accumulating after invalidation reads.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StackStats {
    /// Fatal secure-session failures observed.
    pub ssl_errors: u64,
    /// Fatal encapsulation failures observed.
    pub encapsulation_errors: u64,
    /// Inbound packets rejected by decapsulation.
    pub packets_rejected: u64,
    /// Send-window entries retransmitted after deadline expiry.
    pub retransmissions: u64,
    /// Standalone ACK packets transmitted.
    pub ack_packets_sent: u64,
}
