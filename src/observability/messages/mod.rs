// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for human-readable output. Most also
//! implement [`StructuredLog`], which emits the message at its intended level with
//! the message's fields attached as structured `tracing` fields.
//!
//! # Usage Pattern
//!
//! ```rust
//! use frame_reducer::observability::messages::worker::WorkerStarted;
//! use frame_reducer::observability::messages::StructuredLog;
//!
//! let required = vec!["detector_data".to_string()];
//! let msg = WorkerStarted {
//!     rank: 1,
//!     group_size: 4,
//!     required_data: &required,
//!     frames_per_event: 2,
//! };
//!
//! msg.log();
//! ```

pub mod coordinator;
pub mod extraction;
pub mod shutdown;
pub mod worker;

use tracing::Span;

/// Emit a message at its intended level with structured fields.
pub trait StructuredLog {
    /// Log the message once.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
