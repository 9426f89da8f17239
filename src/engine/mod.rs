// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Master-worker parallelization engine.
//!
//! Every group member builds the same [`Engine`] and calls [`Engine::start`] with its
//! own channel endpoint. Rank 0 becomes the [`Coordinator`]; every other rank becomes a
//! [`Worker`]. The role is chosen once and never changes. When every member runs as a
//! task on one runtime, [`join_group`] collects their reports and turns a panicking
//! member into a group abort.

mod coordinator;
mod group;
mod role;
mod send_slot;
mod shutdown;
mod worker;


pub use coordinator::{Coordinator, CoordinatorExit, CoordinatorReport, ShutdownCounters};
pub use group::join_group;
pub use role::{ProcessRole, COORDINATOR_RANK};
pub use send_slot::SendSlot;
pub use shutdown::{
    coordinator_shutdown, worker_shutdown, ShutdownOutcome, ShutdownReason, ABORT_EXIT_CODE,
};
pub use worker::{Worker, WorkerExit, WorkerReport, WorkerStats};

use tokio_util::sync::CancellationToken;

use crate::config::EngineSettings;
use crate::errors::{EngineError, EngineResult};
use crate::extraction::ExtractionLayer;
use crate::traits::{Communicator, EventSource, Mapper, Reducer};

/// What one group member reports after its run.
#[derive(Debug)]
pub enum MemberReport<Red> {
    Coordinator {
        report: CoordinatorReport,
        reducer: Red,
    },
    Worker(WorkerReport),
}

impl<Red> MemberReport<Red> {
    pub fn role(&self) -> ProcessRole {
        match self {
            MemberReport::Coordinator { .. } => ProcessRole::Coordinator,
            MemberReport::Worker(_) => ProcessRole::Worker,
        }
    }
}

/// Everything a group member needs to play either role.
///
/// Only the parts relevant to the member's role are used: a worker never touches the
/// reducer and the coordinator never touches the source, layers or mapper.
pub struct Engine<S, V, M, Red>
where
    S: EventSource,
{
    settings: EngineSettings,
    source: S,
    layers: Vec<ExtractionLayer<S::Frame, V>>,
    mapper: M,
    reducer: Red,
    interrupt: CancellationToken,
}

impl<S, V, M, Red> Engine<S, V, M, Red>
where
    S: EventSource,
    V: Send + 'static,
{
    pub fn new(
        settings: EngineSettings,
        source: S,
        layers: Vec<ExtractionLayer<S::Frame, V>>,
        mapper: M,
        reducer: Red,
    ) -> Self {
        Self {
            settings,
            source,
            layers,
            mapper,
            reducer,
            interrupt: CancellationToken::new(),
        }
    }

    /// Operator interrupt observed by the coordinator.
    pub fn with_interrupt(mut self, interrupt: CancellationToken) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Pick this member's role from its rank and run it to completion.
    pub async fn start<C>(self, mut comm: C) -> EngineResult<MemberReport<Red>>
    where
        C: Communicator,
        M: Mapper<V, C::Payload>,
        Red: Reducer<C::Payload>,
    {
        let size = comm.size();
        if size < 2 {
            return Err(EngineError::GroupTooSmall { size });
        }

        match ProcessRole::for_rank(comm.rank()) {
            ProcessRole::Coordinator => {
                let mut coordinator = Coordinator::new(self.settings, self.reducer)
                    .with_interrupt(self.interrupt);
                let report = coordinator.run(&mut comm).await?;
                Ok(MemberReport::Coordinator {
                    report,
                    reducer: coordinator.into_reducer(),
                })
            }
            ProcessRole::Worker => {
                let worker = Worker::new(self.settings, self.source, self.layers, self.mapper);
                let report = worker.run(&mut comm).await?;
                Ok(MemberReport::Worker(report))
            }
        }
    }
}
