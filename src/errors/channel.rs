// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors reported by the message channel between group members.

use crate::channel::Rank;
use thiserror::Error;

/// Faults raised by a [`Communicator`](crate::traits::Communicator) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// A process group must contain at least one member.
    #[error("Invalid process group size: {0}")]
    InvalidGroupSize(usize),

    /// A message was addressed to a rank outside the group.
    #[error("Rank {rank} is outside the process group of size {size}")]
    InvalidRank { rank: Rank, size: usize },

    /// The peer's mailbox is gone (the process has terminated).
    #[error("Process {rank} is no longer reachable")]
    Disconnected { rank: Rank },

    /// The whole group was aborted; no further communication is possible.
    #[error("Process group aborted (exit code {code})")]
    Aborted { code: i32 },
}
