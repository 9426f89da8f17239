// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker state machine.
//!
//! ```text
//! Idle ─► Fetching ─► (die?) ─► Filtering ─► Extracting ─► Mapping ─► Sending ─► Closing ─┐
//!            ▲                      │                                                      │
//!            └──────────────────────┴──────────────────────────────────────────────────────┘
//! exhausted: flush ─► End ─► Draining ─► Terminated       die: Draining ─► Terminated
//! ```
//!
//! At most one result is in flight at a time (see [`SendSlot`]). The die signal is
//! checked once per event, before the event is filtered.

use serde::Serialize;
use tracing::Instrument;

use crate::channel::{Message, Rank, Source, Tag};
use crate::config::EngineSettings;
use crate::engine::role::COORDINATOR_RANK;
use crate::engine::send_slot::SendSlot;
use crate::engine::shutdown::{worker_shutdown, ShutdownReason};
use crate::errors::{EngineError, EngineResult};
use crate::extraction::{ExtractionLayer, ResolvedExtractors};
use crate::observability::messages::worker::{
    DieSignalObserved, EventCloseFailed, EventOpenFailed, EventRejected, FrameCountClamped,
    FrameSkipped, WorkerExhausted, WorkerStarted, WorkerStartupFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Communicator, EventSource, Mapper};

/// How a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerExit {
    /// The event generator ran dry and the end message was delivered.
    Exhausted,
    /// A die signal arrived from the coordinator.
    Killed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub events_fetched: u64,
    pub events_rejected: u64,
    pub events_processed: u64,
    pub events_failed: u64,
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub results_sent: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub rank: Rank,
    pub exit: WorkerExit,
    pub stats: WorkerStats,
}

/// One worker: pulls its share of events, extracts, maps and ships results.
pub struct Worker<S, V, M>
where
    S: EventSource,
{
    settings: EngineSettings,
    source: S,
    layers: Vec<ExtractionLayer<S::Frame, V>>,
    mapper: M,
}

impl<S, V, M> Worker<S, V, M>
where
    S: EventSource,
    V: Send + 'static,
{
    /// `layers` are searched in order when binding field names, detector layer first.
    pub fn new(
        settings: EngineSettings,
        source: S,
        layers: Vec<ExtractionLayer<S::Frame, V>>,
        mapper: M,
    ) -> Self {
        Self {
            settings,
            source,
            layers,
            mapper,
        }
    }

    /// Run the worker to completion.
    ///
    /// Start-up failures (unresolvable field, event generator that will not start)
    /// send a death confirmation before returning the error so the coordinator is
    /// not left waiting.
    pub async fn run<C>(self, comm: &mut C) -> EngineResult<WorkerReport>
    where
        C: Communicator,
        M: Mapper<V, C::Payload>,
    {
        let span = WorkerStarted {
            rank: comm.rank(),
            group_size: comm.size(),
            required_data: &self.settings.required_data,
            frames_per_event: self.settings.frames_per_event,
        }
        .span("worker_loop");

        self.run_loop(comm).instrument(span).await
    }

    async fn run_loop<C>(mut self, comm: &mut C) -> EngineResult<WorkerReport>
    where
        C: Communicator,
        M: Mapper<V, C::Payload>,
    {
        let rank = comm.rank();

        let started = ResolvedExtractors::resolve(&self.settings.required_data, &self.layers)
            .and_then(|extractors| {
                self.source
                    .events(&self.settings.source, rank, comm.size())
                    .map(|events| (extractors, events))
                    .map_err(|source| EngineError::Source { rank, source })
            });

        let (extractors, events) = match started {
            Ok(started) => started,
            Err(error) => {
                WorkerStartupFailed {
                    rank,
                    error: &error,
                }
                .log();
                if let Err(send_error) =
                    worker_shutdown(comm, &ShutdownReason::Failed(error.to_string()))
                {
                    tracing::debug!(rank, error = %send_error, "Death confirmation not sent");
                }
                return Err(error);
            }
        };

        WorkerStarted {
            rank,
            group_size: comm.size(),
            required_data: &self.settings.required_data,
            frames_per_event: self.settings.frames_per_event,
        }
        .log();

        let ceiling = self.settings.frames_per_event;
        let mut stats = WorkerStats::default();
        let mut slot = SendSlot::new();

        for event in events {
            stats.events_fetched += 1;
            let event_index = stats.events_fetched;

            if comm
                .iprobe(Source::Rank(COORDINATOR_RANK), &[Tag::Die])?
                .is_some()
            {
                comm.try_recv(Source::Rank(COORDINATOR_RANK), &[Tag::Die])?;
                DieSignalObserved {
                    rank,
                    events_processed: stats.events_processed,
                }
                .log();
                slot.detach();
                worker_shutdown(comm, &ShutdownReason::DieSignal)?;
                return Ok(WorkerReport {
                    rank,
                    exit: WorkerExit::Killed,
                    stats,
                });
            }

            if self.source.reject(&event) {
                stats.events_rejected += 1;
                EventRejected { rank, event_index }.log();
                continue;
            }

            let available = self.source.num_frames(&event);
            let count = ceiling.min(available);
            if count < ceiling {
                FrameCountClamped {
                    rank,
                    event_index,
                    configured: ceiling,
                    available,
                }
                .log();
            }

            let opened = match self.source.open(event) {
                Ok(opened) => opened,
                Err(error) => {
                    stats.events_failed += 1;
                    EventOpenFailed {
                        rank,
                        event_index,
                        error: &error,
                    }
                    .log();
                    continue;
                }
            };

            for frame_index in (available - count)..available {
                let extracted = {
                    let frame = self.source.frame(&opened, frame_index);
                    extractors.extract(&frame)
                };

                match extracted {
                    Ok(record) => {
                        let payload = self.mapper.map(record);
                        slot.submit(comm, COORDINATOR_RANK, Message::Result(payload))
                            .await?;
                        stats.frames_processed += 1;
                        stats.results_sent += 1;
                    }
                    Err(error) => {
                        stats.frames_skipped += 1;
                        FrameSkipped {
                            rank,
                            event_index,
                            frame_index,
                            error: &error,
                        }
                        .log();
                    }
                }
            }

            if let Err(error) = self.source.close(opened) {
                EventCloseFailed {
                    rank,
                    event_index,
                    error: &error,
                }
                .log();
            }
            stats.events_processed += 1;
        }

        WorkerExhausted {
            rank,
            events_processed: stats.events_processed,
            frames_processed: stats.frames_processed,
            frames_skipped: stats.frames_skipped,
        }
        .log();

        slot.flush().await?;
        comm.send(COORDINATOR_RANK, Message::End { worker: rank })
            .await?;
        worker_shutdown(comm, &ShutdownReason::Exhausted)?;

        Ok(WorkerReport {
            rank,
            exit: WorkerExit::Exhausted,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{ScriptedEvent, ScriptedFrame, ScriptedSource};
    use crate::channel::{LocalEndpoint, LocalGroup, Received};
    use std::time::Duration;
    use tokio::time::timeout;

    type StubWorker = Worker<ScriptedSource, i64, fn(crate::extraction::ExtractedRecord<i64>) -> i64>;

    fn pair() -> (LocalEndpoint<i64>, LocalEndpoint<i64>) {
        let mut endpoints = LocalGroup::<i64>::new(2).unwrap().into_endpoints();
        let worker = endpoints.pop().unwrap();
        let coordinator = endpoints.pop().unwrap();
        (coordinator, worker)
    }

    fn worker(source: ScriptedSource, required: &[&str], frames: usize) -> StubWorker {
        Worker::new(
            EngineSettings::new("scripted", required.iter().copied())
                .with_frames_per_event(frames),
            source,
            ScriptedSource::layers(),
            ScriptedSource::value_of as fn(_) -> i64,
        )
    }

    /// Receive everything the worker sends until its death confirmation.
    async fn collect_until_dead(coordinator: &mut LocalEndpoint<i64>) -> Vec<Received<i64>> {
        let mut received = Vec::new();
        loop {
            let next = timeout(
                Duration::from_secs(2),
                coordinator.recv(Source::Any, &[Tag::Data, Tag::End, Tag::Dead]),
            )
            .await
            .expect("worker went silent")
            .unwrap();
            let dead = next.message == Message::Dead;
            received.push(next);
            if dead {
                return received;
            }
        }
    }

    fn results(received: &[Received<i64>]) -> Vec<i64> {
        received
            .iter()
            .filter_map(|r| match r.message {
                Message::Result(value) => Some(value),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_frame_ceiling_is_clamped_per_event() {
        let source = ScriptedSource::new().with_worker(
            1,
            vec![
                ScriptedEvent::new(1, vec![10, 11, 12]),
                ScriptedEvent::new(2, vec![20, 21, 22, 23, 24, 25, 26]),
            ],
        );
        let (mut coordinator, mut endpoint) = pair();

        let handle =
            tokio::spawn(async move { worker(source, &["value"], 5).run(&mut endpoint).await });
        let received = collect_until_dead(&mut coordinator).await;
        let report = handle.await.unwrap().unwrap();

        assert_eq!(results(&received), vec![10, 11, 12, 22, 23, 24, 25, 26]);
        assert_eq!(report.exit, WorkerExit::Exhausted);
        assert_eq!(report.stats.frames_processed, 8);
    }

    #[tokio::test]
    async fn test_last_frames_are_processed_in_arrival_order() {
        let source =
            ScriptedSource::new().with_worker(1, vec![ScriptedEvent::new(1, vec![1, 2, 3, 4])]);
        let (mut coordinator, mut endpoint) = pair();

        let handle =
            tokio::spawn(async move { worker(source, &["value"], 2).run(&mut endpoint).await });
        let received = collect_until_dead(&mut coordinator).await;
        handle.await.unwrap().unwrap();

        assert_eq!(results(&received), vec![3, 4]);
    }

    #[tokio::test]
    async fn test_failing_frame_is_skipped_and_event_continues() {
        let source = ScriptedSource::new().with_worker(
            1,
            vec![
                ScriptedEvent::new(1, vec![5, -1, 7]),
                ScriptedEvent::new(2, vec![8]),
            ],
        );
        let counters = source.counters();
        let (mut coordinator, mut endpoint) = pair();

        let handle = tokio::spawn(async move {
            worker(source, &["event_id", "value"], 3)
                .run(&mut endpoint)
                .await
        });
        let received = collect_until_dead(&mut coordinator).await;
        let report = handle.await.unwrap().unwrap();

        assert_eq!(results(&received), vec![5, 7, 8]);
        assert_eq!(report.stats.frames_skipped, 1);
        assert_eq!(report.stats.events_processed, 2);
        assert_eq!(counters.closed(), 2);
    }

    #[tokio::test]
    async fn test_rejected_events_send_nothing() {
        let source = ScriptedSource::new().with_worker(
            1,
            vec![
                ScriptedEvent::new(1, vec![1]).rejected(),
                ScriptedEvent::new(2, vec![2]),
                ScriptedEvent::new(3, vec![3]).rejected(),
            ],
        );
        let counters = source.counters();
        let (mut coordinator, mut endpoint) = pair();

        let handle =
            tokio::spawn(async move { worker(source, &["value"], 1).run(&mut endpoint).await });
        let received = collect_until_dead(&mut coordinator).await;
        let report = handle.await.unwrap().unwrap();

        assert_eq!(results(&received), vec![2]);
        assert_eq!(report.stats.events_rejected, 2);
        assert_eq!(counters.opened(), 1);
    }

    #[tokio::test]
    async fn test_unopenable_event_is_skipped() {
        let source = ScriptedSource::new().with_worker(
            1,
            vec![
                ScriptedEvent::new(1, vec![1]).failing_open(),
                ScriptedEvent::new(2, vec![2]).failing_close(),
            ],
        );
        let (mut coordinator, mut endpoint) = pair();

        let handle =
            tokio::spawn(async move { worker(source, &["value"], 1).run(&mut endpoint).await });
        let received = collect_until_dead(&mut coordinator).await;
        let report = handle.await.unwrap().unwrap();

        assert_eq!(results(&received), vec![2]);
        assert_eq!(report.stats.events_failed, 1);
        assert_eq!(report.exit, WorkerExit::Exhausted);
    }

    #[tokio::test]
    async fn test_end_message_precedes_death_confirmation() {
        let source =
            ScriptedSource::new().with_worker(1, vec![ScriptedEvent::new(1, vec![4, 5])]);
        let (mut coordinator, mut endpoint) = pair();

        let handle =
            tokio::spawn(async move { worker(source, &["value"], 2).run(&mut endpoint).await });
        let received = collect_until_dead(&mut coordinator).await;
        handle.await.unwrap().unwrap();

        let tags: Vec<Tag> = received.iter().map(|r| r.message.tag()).collect();
        assert_eq!(tags, vec![Tag::Data, Tag::Data, Tag::End, Tag::Dead]);
        assert_eq!(received[2].message, Message::End { worker: 1 });
    }

    #[tokio::test]
    async fn test_missing_extraction_function_is_fatal_before_fetching() {
        let source = ScriptedSource::new().with_worker(1, vec![ScriptedEvent::new(1, vec![1])]);
        let counters = source.counters();
        let (mut coordinator, mut endpoint) = pair();

        let result = worker(source, &["value", "beam_energy"], 1)
            .run(&mut endpoint)
            .await;

        match result {
            Err(EngineError::MissingExtractionFunction { field }) => {
                assert_eq!(field, "beam_energy")
            }
            other => panic!("expected MissingExtractionFunction, got {:?}", other),
        }
        assert_eq!(counters.fetched(), 0);

        let received = collect_until_dead(&mut coordinator).await;
        assert_eq!(received.len(), 1);
    }

    #[tokio::test]
    async fn test_source_start_failure_confirms_death() {
        let source = ScriptedSource::new().failing_start();
        let (mut coordinator, mut endpoint) = pair();

        let result = worker(source, &["value"], 1).run(&mut endpoint).await;

        assert!(matches!(result, Err(EngineError::Source { rank: 1, .. })));
        let received = collect_until_dead(&mut coordinator).await;
        assert_eq!(received.len(), 1);
    }

    #[tokio::test]
    async fn test_die_signal_stops_worker_at_event_boundary() {
        let events = (1..=20).map(|id| ScriptedEvent::new(id, vec![id as i64])).collect();
        let source = ScriptedSource::new().with_worker(1, events);
        let (mut coordinator, mut endpoint) = pair();

        let handle =
            tokio::spawn(async move { worker(source, &["value"], 1).run(&mut endpoint).await });

        for expected in 1..=2 {
            let received = coordinator.recv(Source::Any, &[Tag::Data]).await.unwrap();
            assert_eq!(received.message, Message::Result(expected));
        }
        coordinator.isend(1, Message::Die).unwrap();

        let received = collect_until_dead(&mut coordinator).await;
        let report = handle.await.unwrap().unwrap();

        assert_eq!(report.exit, WorkerExit::Killed);
        assert!(results(&received).len() <= 2);
        assert!(report.stats.results_sent <= 4);
        assert!(received.iter().all(|r| r.message.tag() != Tag::End));
    }

    #[tokio::test]
    async fn test_at_most_one_result_in_flight() {
        let events = (1..=5).map(|id| ScriptedEvent::new(id, vec![id as i64])).collect();
        let source = ScriptedSource::new().with_worker(1, events);
        let (mut coordinator, mut endpoint) = pair();

        let handle =
            tokio::spawn(async move { worker(source, &["value"], 1).run(&mut endpoint).await });

        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(coordinator.queued_messages(), 1);
            coordinator.recv(Source::Any, &[Tag::Data]).await.unwrap();
        }

        let received = collect_until_dead(&mut coordinator).await;
        assert_eq!(received[0].message, Message::End { worker: 1 });
        handle.await.unwrap().unwrap();
    }

    #[test]
    fn test_frame_carries_requested_index() {
        let source = ScriptedSource::new();
        let event = ScriptedEvent::new(3, vec![7, 8]);
        assert_eq!(
            source.frame(&event, 1),
            ScriptedFrame {
                event_id: 3,
                index: 1,
                value: 8
            }
        );
    }
}
