// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Coordinator state machine: receive, reduce, and decide when the run is over.
//!
//! The coordinator blocks on a single receive accepting results, end messages and
//! death confirmations from any worker. The run is over once every worker has either
//! sent its end message or confirmed its death without one. An operator interrupt
//! short-circuits the loop.

use std::collections::HashSet;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::channel::{Message, Rank, ResultMessage, Source, Tag};
use crate::config::EngineSettings;
use crate::engine::shutdown::{coordinator_shutdown, ShutdownReason, ABORT_EXIT_CODE};
use crate::errors::EngineResult;
use crate::observability::messages::coordinator::{
    CoordinatorStarted, DuplicateEnd, EndSenderMismatch, InterruptReceived, ReceiveFailed,
    WorkerDeparted, WorkerFinished,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Communicator, Reducer};

/// Counters handed to [`Reducer::end_processing`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownCounters {
    /// Workers that sent their end message
    pub completed_workers: usize,
    /// Results passed to the reducer
    pub processed_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorExit {
    AllWorkersFinished,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoordinatorReport {
    pub exit: CoordinatorExit,
    pub counters: ShutdownCounters,
    /// Death confirmations collected, during the loop and the shutdown drain
    pub confirmations: usize,
    /// Results and end messages dropped during the shutdown drain
    pub stale_discarded: u64,
}

pub struct Coordinator<Red> {
    settings: EngineSettings,
    reducer: Red,
    interrupt: CancellationToken,
}

impl<Red> Coordinator<Red> {
    pub fn new(settings: EngineSettings, reducer: Red) -> Self {
        Self {
            settings,
            reducer,
            interrupt: CancellationToken::new(),
        }
    }

    /// Cancelling `interrupt` stops the receive loop and shuts the group down.
    pub fn with_interrupt(mut self, interrupt: CancellationToken) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn reducer(&self) -> &Red {
        &self.reducer
    }

    pub fn into_reducer(self) -> Red {
        self.reducer
    }

    /// Receive and reduce until every worker is accounted for or an interrupt
    /// arrives, then run the shutdown protocol.
    pub async fn run<C>(&mut self, comm: &mut C) -> EngineResult<CoordinatorReport>
    where
        C: Communicator,
        Red: Reducer<C::Payload>,
    {
        let started = CoordinatorStarted {
            group_size: comm.size(),
        };
        let span = started.span("coordinator_loop");

        async {
            started.log();
            self.run_loop(comm).await
        }
        .instrument(span)
        .await
    }

    async fn run_loop<C>(&mut self, comm: &mut C) -> EngineResult<CoordinatorReport>
    where
        C: Communicator,
        Red: Reducer<C::Payload>,
    {
        let workers = comm.size().saturating_sub(1);
        let interrupt = self.interrupt.clone();
        let mut counters = ShutdownCounters::default();
        let mut finished: HashSet<Rank> = HashSet::new();
        let mut confirmed: HashSet<Rank> = HashSet::new();

        let exit = loop {
            if finished.union(&confirmed).count() >= workers {
                break CoordinatorExit::AllWorkersFinished;
            }

            let received = tokio::select! {
                biased;
                _ = interrupt.cancelled() => None,
                received = comm.recv(Source::Any, &[Tag::Data, Tag::End, Tag::Dead]) => Some(received),
            };

            let received = match received {
                Some(Ok(received)) => received,
                Some(Err(error)) => {
                    ReceiveFailed {
                        error: &error,
                        processed_count: counters.processed_count,
                    }
                    .log();
                    comm.abort(ABORT_EXIT_CODE);
                    return Err(error.into());
                }
                None => {
                    InterruptReceived {
                        processed_count: counters.processed_count,
                    }
                    .log();
                    break CoordinatorExit::Interrupted;
                }
            };

            match received.message {
                Message::Result(payload) => {
                    self.reducer.reduce(ResultMessage {
                        worker: received.source,
                        payload,
                    });
                    counters.processed_count += 1;
                }
                Message::End { worker: claimed } => {
                    let worker = received.source;
                    if claimed != worker {
                        EndSenderMismatch {
                            sender: worker,
                            claimed,
                        }
                        .log();
                    }
                    if finished.insert(worker) {
                        counters.completed_workers = finished.len();
                        WorkerFinished {
                            worker,
                            completed_workers: counters.completed_workers,
                            expected: workers,
                        }
                        .log();
                    } else {
                        DuplicateEnd { worker }.log();
                    }
                }
                Message::Dead => {
                    let worker = received.source;
                    if confirmed.insert(worker) && !finished.contains(&worker) {
                        WorkerDeparted { worker }.log();
                    }
                }
                Message::Die => {
                    tracing::debug!(source = received.source, "Ignoring die message");
                }
            }
        };

        let reason = match exit {
            CoordinatorExit::AllWorkersFinished => {
                self.reducer.end_processing(&counters);
                ShutdownReason::AllWorkersFinished
            }
            CoordinatorExit::Interrupted => ShutdownReason::Interrupted,
        };

        let outcome =
            coordinator_shutdown(comm, &reason, confirmed, self.settings.poll_interval).await?;

        Ok(CoordinatorReport {
            exit,
            counters,
            confirmations: outcome.confirmations,
            stale_discarded: outcome.stale_discarded,
        })
    }
}
