// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::channel::Rank;

/// Rank of the single coordinator in every group.
pub const COORDINATOR_RANK: Rank = 0;

/// Role a group member plays for the whole run.
///
/// Assigned once from the member's rank at start-up; there is no re-election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessRole {
    Coordinator,
    Worker,
}

impl ProcessRole {
    pub fn for_rank(rank: Rank) -> Self {
        if rank == COORDINATOR_RANK {
            ProcessRole::Coordinator
        } else {
            ProcessRole::Worker
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessRole::Coordinator => "coordinator",
            ProcessRole::Worker => "worker",
        }
    }
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
