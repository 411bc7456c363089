//! The protocol orchestration state machine.
//!
//! `ProtoStack` interleaves three concerns inside one single-threaded,
//! reentrant dispatch loop: secure-session byte-stream semantics,
//! sliding-window reliable delivery, and packet encapsulation. Data moves
//! down (application -> session -> encapsulation -> send window -> network)
//! and up (network -> receive window -> decapsulation -> session ->
//! application); a periodic [`retransmit`](ProtoStack::retransmit) call
//! resends expired send-window entries.

use std::time::Instant;

use crate::core::error::{FatalError, RecvError};
use crate::core::traits::{ProtocolHooks, ReadOutcome, SecureSession, WirePacket, WriteOutcome};
use crate::frame::{FramePurpose, FrameSizing};
use crate::reliable::{PendingAcks, RecvWindow, ReliabilityView, SendWindow};
use crate::stack::queue::{CleartextQueue, RawQueue};
use crate::stack::{StackConfig, StackStats};

/// Reliability-and-encapsulation engine for one secure session over an
/// unreliable datagram link.
///
/// Single-threaded and synchronous: all operations must be invoked serially
/// by one driving loop that owns timers and the socket. The loop polls
/// [`next_retransmit`](Self::next_retransmit) and calls
/// [`retransmit`](Self::retransmit) when due, and calls
/// [`flush`](Self::flush) as a final step after one or more `net_recv`,
/// `app_send`, `raw_send`, or `start_handshake` calls.
///
/// Any fatal error permanently invalidates the stack: further mutating
/// calls become no-ops and only read-only queries remain meaningful. There
/// is no recovery; the caller discards the instance.
#[derive(Debug)]
pub struct ProtoStack<S, P, H>
where
    S: SecureSession,
    P: WirePacket,
    H: ProtocolHooks<S, P>,
{
    ssl: S,
    /// Taken out for the duration of a dispatch; a reentrant public call
    /// that finds it absent is a no-op.
    hooks: Option<H>,
    frame: FrameSizing,

    /// Depth of the up-direction dispatch in progress. `flush` is
    /// suppressed while non-zero so the down pipeline never interleaves
    /// with an unfinished receive-window drain.
    reentry_depth: u32,
    invalidated: bool,
    invalidate_notified: bool,
    ssl_started: bool,
    next_retransmit: Option<Instant>,

    app_queue: CleartextQueue,
    raw_queue: RawQueue<P>,
    rel_send: SendWindow<P>,
    rel_recv: RecvWindow<P>,
    xmit_acks: PendingAcks,
    /// Reused for standalone ACKs only.
    ack_send_buf: P,
    stats: StackStats,
}

impl<S, P, H> ProtoStack<S, P, H>
where
    S: SecureSession,
    P: WirePacket,
    H: ProtocolHooks<S, P>,
{
    /// Create a stack around a secure session and a hook set.
    pub fn new(ssl: S, hooks: H, config: StackConfig) -> Self {
        Self {
            ssl,
            hooks: Some(hooks),
            frame: config.frame,
            reentry_depth: 0,
            invalidated: false,
            invalidate_notified: false,
            ssl_started: false,
            next_retransmit: None,
            app_queue: CleartextQueue::new(),
            raw_queue: RawQueue::new(),
            rel_send: SendWindow::with_timing(config.span, config.retry),
            rel_recv: RecvWindow::new(config.span),
            xmit_acks: PendingAcks::with_limits(config.pending_ack_capacity, config.max_ack_list),
            ack_send_buf: P::default(),
            stats: StackStats::default(),
        }
    }

    /// Begin the secure-session handshake.
    ///
    /// Also drains any in-order receive-window data that was buffered while
    /// the session had not started. No-op if invalidated.
    pub fn start_handshake(&mut self) -> Result<(), FatalError> {
        if self.invalidated {
            return Ok(());
        }
        let Some(mut hooks) = self.hooks.take() else {
            return Ok(());
        };
        let result = self.start_handshake_inner(&mut hooks);
        self.hooks = Some(hooks);
        self.finish_dispatch();
        result
    }

    fn start_handshake_inner(&mut self, hooks: &mut H) -> Result<(), FatalError> {
        if let Err(e) = self.ssl.start_handshake() {
            self.stats.ssl_errors += 1;
            self.invalidate_with(hooks);
            return Err(e.into());
        }
        self.ssl_started = true;
        self.up_sequenced(hooks)
    }

    /// Accept one inbound packet from the network, taking ownership.
    ///
    /// Decapsulation failures are recoverable: they are returned to the
    /// caller and the stack stays usable. Secure-session failures during
    /// the in-order delivery pass are fatal. No-op if invalidated.
    pub fn net_recv(&mut self, pkt: P) -> Result<(), RecvError> {
        if self.invalidated {
            return Ok(());
        }
        let Some(mut hooks) = self.hooks.take() else {
            return Ok(());
        };
        self.reentry_depth += 1;
        let result = self.up_stack(&mut hooks, pkt);
        self.reentry_depth -= 1;
        self.hooks = Some(hooks);
        self.finish_dispatch();
        result
    }

    /// Queue one outbound cleartext buffer for encryption.
    ///
    /// Performs no I/O; encryption and encapsulation happen in
    /// [`flush`](Self::flush). No-op if invalidated.
    pub fn app_send(&mut self, buf: Vec<u8>) {
        if !self.invalidated {
            self.app_queue.push(buf);
        }
    }

    /// Queue one outbound raw packet.
    ///
    /// Raw packets bypass the secure session but are still sequenced,
    /// encapsulated, and acknowledged. No-op if invalidated.
    pub fn raw_send(&mut self, pkt: P) {
        if !self.invalidated {
            self.raw_queue.push(pkt);
        }
    }

    /// Write pending outbound data to the network and update the
    /// retransmit deadline.
    ///
    /// Drains the raw queue, then the cleartext -> session -> ciphertext
    /// pipeline, subject to send-window capacity. No-op if invalidated or
    /// while an up-direction dispatch is in progress.
    pub fn flush(&mut self) -> Result<(), FatalError> {
        self.flush_at(Instant::now())
    }

    /// [`flush`](Self::flush) against an explicit clock.
    pub fn flush_at(&mut self, now: Instant) -> Result<(), FatalError> {
        if self.invalidated || self.reentry_depth > 0 {
            return Ok(());
        }
        let Some(mut hooks) = self.hooks.take() else {
            return Ok(());
        };
        let mut result = self.down_stack_raw(&mut hooks, now);
        if result.is_ok() {
            result = self.down_stack_app(&mut hooks, now);
        }
        self.update_retransmit(now);
        self.hooks = Some(hooks);
        self.finish_dispatch();
        result
    }

    /// Transmit standalone ACK packets until the pending-ACK set drains.
    ///
    /// Each iteration prepares the ACK buffer via the frame policy, asks
    /// the hook set to fill it, and hands it to the network. No-op if
    /// invalidated.
    pub fn send_pending_acks(&mut self) {
        if self.invalidated {
            return;
        }
        let Some(mut hooks) = self.hooks.take() else {
            return;
        };
        while !self.xmit_acks.is_empty() {
            self.ack_send_buf
                .frame_prepare(&self.frame, FramePurpose::AckStandalone);
            hooks.generate_ack(&mut self.ack_send_buf, &mut self.xmit_acks);
            hooks.net_send(&self.ack_send_buf);
            self.stats.ack_packets_sent += 1;
        }
        self.hooks = Some(hooks);
        self.finish_dispatch();
    }

    /// Resend every outstanding send-window entry whose deadline elapsed.
    ///
    /// No-op if invalidated or before the global retransmit deadline.
    pub fn retransmit(&mut self) {
        self.retransmit_at(Instant::now());
    }

    /// [`retransmit`](Self::retransmit) against an explicit clock.
    pub fn retransmit_at(&mut self, now: Instant) {
        if self.invalidated {
            return;
        }
        match self.next_retransmit {
            Some(due) if now >= due => {}
            _ => return,
        }
        let Some(mut hooks) = self.hooks.take() else {
            return;
        };
        let (head, tail) = (self.rel_send.head_id(), self.rel_send.tail_id());
        for id in head..tail {
            let Some(entry) = self.rel_send.get(id) else {
                continue;
            };
            if !entry.ready_retransmit(now) {
                continue;
            }
            hooks.net_send(&entry.packet);
            self.rel_send.reset_retransmit(id, now);
            self.stats.retransmissions += 1;
        }
        self.update_retransmit(now);
        self.hooks = Some(hooks);
        self.finish_dispatch();
    }

    /// When [`retransmit`](Self::retransmit) should next be called.
    ///
    /// `None` is the infinite sentinel: nothing is outstanding, or the
    /// stack is invalidated.
    pub fn next_retransmit(&self) -> Option<Instant> {
        if self.invalidated {
            None
        } else {
            self.next_retransmit
        }
    }

    /// Whether the secure-session handshake has been started.
    pub fn ssl_started(&self) -> bool {
        self.ssl_started
    }

    /// Whether the stack has been invalidated by a fatal error.
    pub fn invalidated(&self) -> bool {
        self.invalidated
    }

    /// Force the one-way transition to the invalidated state.
    ///
    /// The hook set is notified exactly once; if the transition happens
    /// inside a dispatch, notification follows when the dispatch completes.
    pub fn invalidate(&mut self) {
        if !self.invalidated {
            self.invalidated = true;
            self.next_retransmit = None;
        }
        self.notify_invalidated();
    }

    /// Error and traffic counters.
    pub fn stats(&self) -> &StackStats {
        &self.stats
    }

    /// Number of sequence ids awaiting acknowledgement to the peer.
    pub fn pending_ack_count(&self) -> usize {
        self.xmit_acks.len()
    }

    /// Number of queued outbound cleartext buffers.
    pub fn app_queue_len(&self) -> usize {
        self.app_queue.len()
    }

    /// Number of queued outbound raw packets.
    pub fn raw_queue_len(&self) -> usize {
        self.raw_queue.len()
    }

    /// Read-only view of the send window.
    pub fn send_window(&self) -> &SendWindow<P> {
        &self.rel_send
    }

    /// Read-only view of the receive window.
    pub fn recv_window(&self) -> &RecvWindow<P> {
        &self.rel_recv
    }

    // network -> reliability layer -> decapsulation -> session -> app
    fn up_stack(&mut self, hooks: &mut H, pkt: P) -> Result<(), RecvError> {
        let rel = ReliabilityView {
            send: &mut self.rel_send,
            recv: &mut self.rel_recv,
            acks: &mut self.xmit_acks,
        };
        let queued = match hooks.decapsulate(pkt, rel) {
            Ok(queued) => queued,
            Err(e) => {
                self.stats.packets_rejected += 1;
                return Err(e.into());
            }
        };
        if queued {
            self.up_sequenced(hooks)?;
        }
        Ok(())
    }

    // Move whatever the receive window can release in order up the stack.
    fn up_sequenced(&mut self, hooks: &mut H) -> Result<(), FatalError> {
        while self.rel_recv.ready() {
            let is_raw = self
                .rel_recv
                .peek_sequenced()
                .is_some_and(|p| p.is_raw());
            if !is_raw && !self.ssl_started {
                // Ciphertext with no session to feed it to; leave it queued.
                break;
            }
            let Some((_, mut pkt)) = self.rel_recv.pop_sequenced() else {
                break;
            };
            if is_raw {
                hooks.raw_recv(pkt, self);
            } else {
                let buf = pkt.take_payload();
                if let Err(e) = self.ssl.write_ciphertext(buf) {
                    self.stats.ssl_errors += 1;
                    self.invalidate_with(hooks);
                    return Err(e.into());
                }
            }
        }

        // Read decrypted cleartext out of the session.
        if self.ssl_started {
            while self.ssl.write_ciphertext_ready() {
                let cap = self.frame.capacity(FramePurpose::SslCleartextRead);
                let mut buf = vec![0u8; cap];
                match self.ssl.read_cleartext(&mut buf) {
                    Ok(ReadOutcome::Read(n)) => {
                        buf.truncate(n);
                        hooks.app_recv(buf, self);
                    }
                    Ok(ReadOutcome::WouldBlock) => break,
                    Err(e) => {
                        self.stats.ssl_errors += 1;
                        self.invalidate_with(hooks);
                        return Err(e.into());
                    }
                }
            }
        }
        Ok(())
    }

    // raw queue -> encapsulation -> send window -> network
    fn down_stack_raw(&mut self, hooks: &mut H, now: Instant) -> Result<(), FatalError> {
        while self.rel_send.ready() {
            let Some(pkt) = self.raw_queue.pop_front() else {
                break;
            };
            self.transmit(hooks, pkt, now)?;
        }
        Ok(())
    }

    // cleartext queue -> session -> encapsulation -> send window -> network
    fn down_stack_app(&mut self, hooks: &mut H, now: Instant) -> Result<(), FatalError> {
        if !self.ssl_started {
            return Ok(());
        }

        // Push queued cleartext through the session until back-pressure.
        loop {
            let Some(front) = self.app_queue.front_mut() else {
                break;
            };
            match self.ssl.write_cleartext(front.remaining()) {
                Ok(WriteOutcome::Accepted(n)) => {
                    let done = front.consume(n);
                    if done {
                        self.app_queue.pop_front();
                    } else if n == 0 {
                        break;
                    }
                }
                Ok(WriteOutcome::WouldBlock) => break,
                Err(e) => {
                    self.stats.ssl_errors += 1;
                    self.invalidate_with(hooks);
                    return Err(e.into());
                }
            }
        }

        // Encapsulate whatever ciphertext the session produced.
        while self.ssl.read_ciphertext_ready() && self.rel_send.ready() {
            let buf = match self.ssl.read_ciphertext() {
                Ok(buf) => buf,
                Err(e) => {
                    self.stats.ssl_errors += 1;
                    self.invalidate_with(hooks);
                    return Err(e.into());
                }
            };
            self.transmit(hooks, P::from_ciphertext(buf), now)?;
        }
        Ok(())
    }

    // Allocate a sequence id, encapsulate, transmit, and track the packet
    // in the send window.
    fn transmit(&mut self, hooks: &mut H, mut pkt: P, now: Instant) -> Result<(), FatalError> {
        let id = self.rel_send.next_id();
        if let Err(e) = hooks.encapsulate(id, &mut pkt, &mut self.xmit_acks) {
            self.stats.encapsulation_errors += 1;
            self.invalidate_with(hooks);
            return Err(e.into());
        }
        hooks.net_send(&pkt);
        let assigned = self.rel_send.push(pkt, now);
        debug_assert_eq!(assigned, id);
        Ok(())
    }

    fn update_retransmit(&mut self, now: Instant) {
        self.next_retransmit = if self.invalidated {
            None
        } else {
            self.rel_send.until_retransmit(now).map(|wait| now + wait)
        };
    }

    fn invalidate_with(&mut self, hooks: &mut H) {
        if !self.invalidated {
            self.invalidated = true;
            self.next_retransmit = None;
            self.invalidate_notified = true;
            hooks.invalidated(self);
        }
    }

    fn notify_invalidated(&mut self) {
        if !self.invalidated || self.invalidate_notified {
            return;
        }
        if let Some(mut hooks) = self.hooks.take() {
            self.invalidate_notified = true;
            hooks.invalidated(self);
            self.hooks = Some(hooks);
        }
    }

    fn finish_dispatch(&mut self) {
        if self.invalidated {
            self.notify_invalidated();
        }
    }
}
