// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error taxonomy for the parallelization engine.
//!
//! * [`EngineError::MissingExtractionFunction`] is fatal at start-of-run on the worker
//!   that encounters it.
//! * [`EngineError::DataExtraction`] is scoped to a single frame; the worker reports it
//!   and moves on to the next frame.
//! * [`EngineError::GroupAborted`] means the shutdown handshake itself failed and the
//!   whole group was torn down.
//! * [`EngineError::MemberPanicked`] means a member died without confirming, which is
//!   fatal for the group.

use crate::channel::Rank;
use crate::errors::{ChannelError, ConfigError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// No extraction layer provides a function for a required field.
    #[error("Data extraction function not defined for the following data type: {field}")]
    MissingExtractionFunction { field: String },

    /// An extraction function failed on one frame.
    #[error("Error extracting {field}: {source}")]
    DataExtraction {
        field: String,
        #[source]
        source: anyhow::Error,
    },

    /// The event source could not be started.
    #[error("Event source failure on process {rank}: {source}")]
    Source {
        rank: Rank,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The shutdown handshake failed and the group was aborted.
    #[error("Process group aborted during shutdown: {reason}")]
    GroupAborted { reason: String },

    /// A group member's task panicked; the group was aborted.
    #[error("Process {rank} panicked: {reason}")]
    MemberPanicked { rank: Rank, reason: String },

    /// A run needs one coordinator and at least one worker.
    #[error("Process group of size {size} is too small: one coordinator and at least one worker are required")]
    GroupTooSmall { size: usize },
}

/// Convenience alias used across the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
