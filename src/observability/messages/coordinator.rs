// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the coordinator receive loop.
//!
//! This module contains message types for logging events related to:
//! * Coordinator start-up
//! * Worker completion and departure tracking
//! * Operator interrupts
//! * Receive faults that abort the group
//! * The end-of-processing summary

use crate::channel::Rank;
use crate::errors::ChannelError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Coordinator entered its receive loop.
///
/// # Log Level
/// `info!` - Important operational event
pub struct CoordinatorStarted {
    pub group_size: usize,
}

impl Display for CoordinatorStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Coordinator started, waiting on {} worker(s)",
            self.group_size.saturating_sub(1)
        )
    }
}

impl StructuredLog for CoordinatorStarted {
    fn log(&self) {
        tracing::info!(group_size = self.group_size, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "coordinator",
            span_name = name,
            role = "coordinator",
            rank = 0usize,
            group_size = self.group_size,
        )
    }
}

/// A worker sent its end message.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use frame_reducer::observability::messages::coordinator::WorkerFinished;
///
/// let msg = WorkerFinished { worker: 3, completed_workers: 2, expected: 4 };
/// assert_eq!(msg.to_string(), "Finalizing 3 (2 of 4 workers finished)");
/// ```
pub struct WorkerFinished {
    pub worker: Rank,
    pub completed_workers: usize,
    pub expected: usize,
}

impl Display for WorkerFinished {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Finalizing {} ({} of {} workers finished)",
            self.worker, self.completed_workers, self.expected
        )
    }
}

impl StructuredLog for WorkerFinished {
    fn log(&self) {
        tracing::info!(
            worker = self.worker,
            completed_workers = self.completed_workers,
            expected = self.expected,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("worker_finished", span_name = name, worker = self.worker)
    }
}

/// A worker sent a second end message.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct DuplicateEnd {
    pub worker: Rank,
}

impl Display for DuplicateEnd {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignoring duplicate end message from worker {}",
            self.worker
        )
    }
}

impl StructuredLog for DuplicateEnd {
    fn log(&self) {
        tracing::warn!(worker = self.worker, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("duplicate_end", span_name = name, worker = self.worker)
    }
}

/// An end message names a different worker than the rank that sent it.
///
/// The sender's rank is the one marked as finished.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
///
/// # Example
/// ```
/// use frame_reducer::observability::messages::coordinator::EndSenderMismatch;
///
/// let msg = EndSenderMismatch { sender: 1, claimed: 2 };
/// assert_eq!(
///     msg.to_string(),
///     "End message from worker 1 claims worker 2; counting worker 1 as finished"
/// );
/// ```
pub struct EndSenderMismatch {
    pub sender: Rank,
    pub claimed: Rank,
}

impl Display for EndSenderMismatch {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "End message from worker {} claims worker {}; counting worker {} as finished",
            self.sender, self.claimed, self.sender
        )
    }
}

impl StructuredLog for EndSenderMismatch {
    fn log(&self) {
        tracing::warn!(sender = self.sender, claimed = self.claimed, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("end_sender_mismatch", span_name = name, sender = self.sender)
    }
}

/// A worker confirmed its death without finishing its events.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct WorkerDeparted {
    pub worker: Rank,
}

impl Display for WorkerDeparted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} terminated before sending its end message",
            self.worker
        )
    }
}

impl StructuredLog for WorkerDeparted {
    fn log(&self) {
        tracing::warn!(worker = self.worker, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("worker_departed", span_name = name, worker = self.worker)
    }
}

/// The channel failed while the coordinator was waiting for messages.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ReceiveFailed<'a> {
    pub error: &'a ChannelError,
    pub processed_count: u64,
}

impl Display for ReceiveFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Receive failed after {} result(s): {}; aborting process group",
            self.processed_count, self.error
        )
    }
}

impl StructuredLog for ReceiveFailed<'_> {
    fn log(&self) {
        tracing::error!(
            error = %self.error,
            processed_count = self.processed_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("receive_failed", span_name = name)
    }
}

/// Operator interrupt caught during the receive loop.
///
/// # Log Level
/// `info!` - Important operational event
pub struct InterruptReceived {
    pub processed_count: u64,
}

impl Display for InterruptReceived {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Interrupt received after {} result(s); stopping workers",
            self.processed_count
        )
    }
}

impl StructuredLog for InterruptReceived {
    fn log(&self) {
        tracing::info!(processed_count = self.processed_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("interrupt", span_name = name)
    }
}

/// Default end-of-processing summary.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use frame_reducer::observability::messages::coordinator::ProcessingFinished;
///
/// let msg = ProcessingFinished { processed_count: 12 };
/// assert_eq!(msg.to_string(), "Processing finished. Processed 12 events in total.");
/// ```
pub struct ProcessingFinished {
    pub processed_count: u64,
}

impl Display for ProcessingFinished {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processing finished. Processed {} events in total.",
            self.processed_count
        )
    }
}

impl StructuredLog for ProcessingFinished {
    fn log(&self) {
        tracing::info!(processed_count = self.processed_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "processing_finished",
            span_name = name,
            processed_count = self.processed_count,
        )
    }
}
