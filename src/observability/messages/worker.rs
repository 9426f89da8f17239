// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the worker loop.
//!
//! This module contains message types for logging events related to:
//! * Worker start-up and start-up failures
//! * Event filtering, opening and closing
//! * Per-frame extraction failures
//! * Die-signal observation and generator exhaustion

use crate::channel::Rank;
use crate::errors::EngineError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Worker entered its event loop.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WorkerStarted<'a> {
    pub rank: Rank,
    pub group_size: usize,
    pub required_data: &'a [String],
    pub frames_per_event: usize,
}

impl Display for WorkerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} of {} started: extracting [{}], up to {} frame(s) per event",
            self.rank,
            self.group_size.saturating_sub(1),
            self.required_data.join(", "),
            self.frames_per_event
        )
    }
}

impl StructuredLog for WorkerStarted<'_> {
    fn log(&self) {
        tracing::info!(
            rank = self.rank,
            group_size = self.group_size,
            required_data = self.required_data.join(","),
            frames_per_event = self.frames_per_event,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker",
            span_name = name,
            role = "worker",
            rank = self.rank,
            group_size = self.group_size,
        )
    }
}

/// Worker could not start its event loop.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct WorkerStartupFailed<'a> {
    pub rank: Rank,
    pub error: &'a EngineError,
}

impl Display for WorkerStartupFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker {} failed to start: {}", self.rank, self.error)
    }
}

impl StructuredLog for WorkerStartupFailed<'_> {
    fn log(&self) {
        tracing::error!(rank = self.rank, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("worker_startup_failed", span_name = name, rank = self.rank)
    }
}

/// Event rejected by the source's filter.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct EventRejected {
    pub rank: Rank,
    pub event_index: u64,
}

impl Display for EventRejected {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} rejected event #{}",
            self.rank, self.event_index
        )
    }
}

impl StructuredLog for EventRejected {
    fn log(&self) {
        tracing::debug!(rank = self.rank, event_index = self.event_index, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "event_rejected",
            span_name = name,
            rank = self.rank,
            event_index = self.event_index,
        )
    }
}

/// Configured frame count exceeds what the event holds.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct FrameCountClamped {
    pub rank: Rank,
    pub event_index: u64,
    pub configured: usize,
    pub available: usize,
}

impl Display for FrameCountClamped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Event #{} holds {} frame(s), fewer than the configured {}; processing {}",
            self.event_index, self.available, self.configured, self.available
        )
    }
}

impl StructuredLog for FrameCountClamped {
    fn log(&self) {
        tracing::debug!(
            rank = self.rank,
            event_index = self.event_index,
            configured = self.configured,
            available = self.available,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "frame_count_clamped",
            span_name = name,
            rank = self.rank,
            event_index = self.event_index,
        )
    }
}

/// Opening an event failed; the event is skipped.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct EventOpenFailed<'a> {
    pub rank: Rank,
    pub event_index: u64,
    pub error: &'a anyhow::Error,
}

impl Display for EventOpenFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} skipping event #{}: failed to open: {}",
            self.rank, self.event_index, self.error
        )
    }
}

impl StructuredLog for EventOpenFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            rank = self.rank,
            event_index = self.event_index,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "event_open_failed",
            span_name = name,
            rank = self.rank,
            event_index = self.event_index,
        )
    }
}

/// Closing an event failed.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct EventCloseFailed<'a> {
    pub rank: Rank,
    pub event_index: u64,
    pub error: &'a anyhow::Error,
}

impl Display for EventCloseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} failed to close event #{}: {}",
            self.rank, self.event_index, self.error
        )
    }
}

impl StructuredLog for EventCloseFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            rank = self.rank,
            event_index = self.event_index,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "event_close_failed",
            span_name = name,
            rank = self.rank,
            event_index = self.event_index,
        )
    }
}

/// One frame failed extraction and was skipped.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
///
/// # Example
/// ```
/// use frame_reducer::errors::EngineError;
/// use frame_reducer::observability::messages::worker::FrameSkipped;
///
/// let error = EngineError::DataExtraction {
///     field: "beam_energy".to_string(),
///     source: anyhow::anyhow!("corrupt frame"),
/// };
/// let msg = FrameSkipped {
///     rank: 2,
///     event_index: 7,
///     frame_index: 1,
///     error: &error,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Worker 2 skipping frame 1 of event #7: Error extracting beam_energy: corrupt frame"
/// );
/// ```
pub struct FrameSkipped<'a> {
    pub rank: Rank,
    pub event_index: u64,
    pub frame_index: usize,
    pub error: &'a EngineError,
}

impl Display for FrameSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} skipping frame {} of event #{}: {}",
            self.rank, self.frame_index, self.event_index, self.error
        )
    }
}

impl StructuredLog for FrameSkipped<'_> {
    fn log(&self) {
        tracing::warn!(
            rank = self.rank,
            event_index = self.event_index,
            frame_index = self.frame_index,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "frame_skipped",
            span_name = name,
            rank = self.rank,
            event_index = self.event_index,
            frame_index = self.frame_index,
        )
    }
}

/// Worker observed a die signal at an event boundary.
///
/// # Log Level
/// `info!` - Important operational event
pub struct DieSignalObserved {
    pub rank: Rank,
    pub events_processed: u64,
}

impl Display for DieSignalObserved {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} received die signal after {} event(s)",
            self.rank, self.events_processed
        )
    }
}

impl StructuredLog for DieSignalObserved {
    fn log(&self) {
        tracing::info!(
            rank = self.rank,
            events_processed = self.events_processed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("die_observed", span_name = name, rank = self.rank)
    }
}

/// The event generator is exhausted; the worker is sending its end message.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WorkerExhausted {
    pub rank: Rank,
    pub events_processed: u64,
    pub frames_processed: u64,
    pub frames_skipped: u64,
}

impl Display for WorkerExhausted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} exhausted its events: {} event(s), {} frame(s) processed, {} frame(s) skipped",
            self.rank, self.events_processed, self.frames_processed, self.frames_skipped
        )
    }
}

impl StructuredLog for WorkerExhausted {
    fn log(&self) {
        tracing::info!(
            rank = self.rank,
            events_processed = self.events_processed,
            frames_processed = self.frames_processed,
            frames_skipped = self.frames_skipped,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("worker_exhausted", span_name = name, rank = self.rank)
    }
}
