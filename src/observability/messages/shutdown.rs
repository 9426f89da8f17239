// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the shutdown protocol.

use crate::channel::Rank;
use crate::errors::ChannelError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Either role started shutting down.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use frame_reducer::observability::messages::shutdown::ShutdownInitiated;
///
/// let msg = ShutdownInitiated { role: "coordinator", rank: 0, reason: &"all workers finished" };
/// assert_eq!(msg.to_string(), "Shutting down: all workers finished");
/// ```
pub struct ShutdownInitiated<'a> {
    pub role: &'a str,
    pub rank: Rank,
    pub reason: &'a dyn Display,
}

impl Display for ShutdownInitiated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Shutting down: {}", self.reason)
    }
}

impl StructuredLog for ShutdownInitiated<'_> {
    fn log(&self) {
        tracing::info!(
            role = self.role,
            rank = self.rank,
            reason = %self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "shutdown",
            span_name = name,
            role = self.role,
            rank = self.rank,
        )
    }
}

/// Die signal dispatched to one worker.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct DieSent {
    pub worker: Rank,
    pub delivered: bool,
}

impl Display for DieSent {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.delivered {
            write!(f, "Sent die signal to worker {}", self.worker)
        } else {
            write!(f, "Worker {} already gone; die signal not delivered", self.worker)
        }
    }
}

impl StructuredLog for DieSent {
    fn log(&self) {
        tracing::debug!(worker = self.worker, delivered = self.delivered, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("die_sent", span_name = name, worker = self.worker)
    }
}

/// Death confirmation received from a worker.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct DeathConfirmed {
    pub worker: Rank,
    pub confirmations: usize,
    pub expected: usize,
}

impl Display for DeathConfirmed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} confirmed death ({} of {})",
            self.worker, self.confirmations, self.expected
        )
    }
}

impl StructuredLog for DeathConfirmed {
    fn log(&self) {
        tracing::debug!(
            worker = self.worker,
            confirmations = self.confirmations,
            expected = self.expected,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("death_confirmed", span_name = name, worker = self.worker)
    }
}

/// A result or end message arrived after the die broadcast and was dropped.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct StaleMessageDiscarded {
    pub worker: Rank,
}

impl Display for StaleMessageDiscarded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Discarding stale message from worker {}", self.worker)
    }
}

/// Worker sent its death confirmation.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct DeathConfirmationSent {
    pub rank: Rank,
}

impl Display for DeathConfirmationSent {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker {} sent death confirmation", self.rank)
    }
}

/// Every worker confirmed; the coordinator is done.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ShutdownComplete {
    pub confirmations: usize,
    pub stale_discarded: u64,
}

impl Display for ShutdownComplete {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Shutdown complete: {} worker(s) confirmed, {} stale message(s) discarded",
            self.confirmations, self.stale_discarded
        )
    }
}

impl StructuredLog for ShutdownComplete {
    fn log(&self) {
        tracing::info!(
            confirmations = self.confirmations,
            stale_discarded = self.stale_discarded,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("shutdown_complete", span_name = name)
    }
}

/// Channel fault during the confirmation drain; aborting the whole group.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct GroupAbortEscalated<'a> {
    pub error: &'a ChannelError,
    pub confirmations: usize,
    pub expected: usize,
}

impl Display for GroupAbortEscalated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Shutdown failed with {} of {} confirmations: {}; aborting process group",
            self.confirmations, self.expected, self.error
        )
    }
}

impl StructuredLog for GroupAbortEscalated<'_> {
    fn log(&self) {
        tracing::error!(
            error = %self.error,
            confirmations = self.confirmations,
            expected = self.expected,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("group_abort", span_name = name)
    }
}

/// A group member's task panicked; the group is being aborted.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use frame_reducer::observability::messages::shutdown::MemberPanicked;
///
/// let msg = MemberPanicked { rank: 2, reason: "mapper overflow" };
/// assert_eq!(
///     msg.to_string(),
///     "Process 2 panicked: mapper overflow; aborting process group"
/// );
/// ```
pub struct MemberPanicked<'a> {
    pub rank: Rank,
    pub reason: &'a str,
}

impl Display for MemberPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Process {} panicked: {}; aborting process group",
            self.rank, self.reason
        )
    }
}

impl StructuredLog for MemberPanicked<'_> {
    fn log(&self) {
        tracing::error!(rank = self.rank, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("member_panicked", span_name = name, rank = self.rank)
    }
}
