// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Two-phase shutdown: the coordinator broadcasts "die" and waits for a "dead"
//! confirmation from every worker; a worker just confirms and stops.
//!
//! Any channel fault while the coordinator waits is unrecoverable and aborts the
//! whole group.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::channel::{Message, Rank, Source, Tag};
use crate::engine::role::COORDINATOR_RANK;
use crate::errors::{ChannelError, EngineError, EngineResult};
use crate::observability::messages::shutdown::{
    DeathConfirmationSent, DeathConfirmed, DieSent, GroupAbortEscalated, ShutdownComplete,
    ShutdownInitiated, StaleMessageDiscarded,
};
use crate::observability::messages::StructuredLog;
use crate::traits::Communicator;

/// Exit code passed to [`Communicator::abort`] when the handshake fails.
pub const ABORT_EXIT_CODE: i32 = 1;

/// Why a member is shutting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Every worker finished or departed.
    AllWorkersFinished,
    /// Operator interrupt on the coordinator.
    Interrupted,
    /// Worker observed a die signal.
    DieSignal,
    /// Worker ran out of events.
    Exhausted,
    /// Worker hit an unrecoverable error.
    Failed(String),
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::AllWorkersFinished => f.write_str("all workers finished"),
            ShutdownReason::Interrupted => f.write_str("interrupted by operator"),
            ShutdownReason::DieSignal => f.write_str("die signal received from coordinator"),
            ShutdownReason::Exhausted => f.write_str("no more events"),
            ShutdownReason::Failed(error) => write!(f, "unrecoverable error: {}", error),
        }
    }
}

/// What the coordinator observed while waiting for confirmations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownOutcome {
    pub confirmations: usize,
    pub stale_discarded: u64,
}

/// Worker side: send a death confirmation to the coordinator and stop participating.
///
/// The confirmation is not waited on.
pub fn worker_shutdown<C>(comm: &C, reason: &ShutdownReason) -> Result<(), ChannelError>
where
    C: Communicator + ?Sized,
{
    ShutdownInitiated {
        role: "worker",
        rank: comm.rank(),
        reason,
    }
    .log();

    comm.isend(COORDINATOR_RANK, Message::Dead)?;
    tracing::debug!("{}", DeathConfirmationSent { rank: comm.rank() });
    Ok(())
}

/// Coordinator side: broadcast die, discard stale traffic, and wait until every
/// worker has confirmed.
///
/// `confirmed` holds workers whose confirmation already arrived during the
/// receive loop. A channel fault escalates to [`Communicator::abort`] and returns
/// [`EngineError::GroupAborted`].
pub async fn coordinator_shutdown<C>(
    comm: &mut C,
    reason: &ShutdownReason,
    confirmed: HashSet<Rank>,
    poll_interval: Duration,
) -> EngineResult<ShutdownOutcome>
where
    C: Communicator + ?Sized,
{
    ShutdownInitiated {
        role: "coordinator",
        rank: comm.rank(),
        reason,
    }
    .log();

    let expected = comm.size().saturating_sub(1);
    let mut confirmed = confirmed;
    let mut stale_discarded = 0u64;

    let drained = drain_confirmations(
        comm,
        expected,
        &mut confirmed,
        &mut stale_discarded,
        poll_interval,
    )
    .await;

    match drained {
        Ok(()) => {
            let outcome = ShutdownOutcome {
                confirmations: confirmed.len(),
                stale_discarded,
            };
            ShutdownComplete {
                confirmations: outcome.confirmations,
                stale_discarded: outcome.stale_discarded,
            }
            .log();
            Ok(outcome)
        }
        Err(error) => {
            GroupAbortEscalated {
                error: &error,
                confirmations: confirmed.len(),
                expected,
            }
            .log();
            comm.abort(ABORT_EXIT_CODE);
            Err(EngineError::GroupAborted {
                reason: error.to_string(),
            })
        }
    }
}

async fn drain_confirmations<C>(
    comm: &mut C,
    expected: usize,
    confirmed: &mut HashSet<Rank>,
    stale_discarded: &mut u64,
    poll_interval: Duration,
) -> Result<(), ChannelError>
where
    C: Communicator + ?Sized,
{
    for worker in 1..comm.size() {
        match comm.isend(worker, Message::Die) {
            Ok(_) => DieSent {
                worker,
                delivered: true,
            }
            .log(),
            Err(ChannelError::Disconnected { .. }) => DieSent {
                worker,
                delivered: false,
            }
            .log(),
            Err(error) => return Err(error),
        }
    }

    loop {
        discard_stale(comm, stale_discarded)?;

        while let Some(dead) = comm.try_recv(Source::Any, &[Tag::Dead])? {
            if confirmed.insert(dead.source) {
                DeathConfirmed {
                    worker: dead.source,
                    confirmations: confirmed.len(),
                    expected,
                }
                .log();
            }
        }

        if confirmed.len() >= expected {
            // Results a worker sent before its confirmation are already queued.
            discard_stale(comm, stale_discarded)?;
            return Ok(());
        }

        tokio::time::sleep(poll_interval).await;
    }
}

fn discard_stale<C>(comm: &mut C, stale_discarded: &mut u64) -> Result<(), ChannelError>
where
    C: Communicator + ?Sized,
{
    while let Some(stale) = comm.try_recv(Source::Any, &[Tag::Data, Tag::End])? {
        *stale_discarded += 1;
        tracing::debug!(
            "{}",
            StaleMessageDiscarded {
                worker: stale.source
            }
        );
    }
    Ok(())
}
