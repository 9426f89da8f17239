// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::channel::ResultMessage;
use crate::engine::ShutdownCounters;
use crate::extraction::ExtractedRecord;
use crate::observability::messages::coordinator::ProcessingFinished;
use crate::observability::messages::StructuredLog;

/// Transform applied on a worker to every successfully extracted frame.
pub trait Mapper<V, R>: Send {
    fn map(&mut self, record: ExtractedRecord<V>) -> R;
}

impl<V, R, F> Mapper<V, R> for F
where
    F: FnMut(ExtractedRecord<V>) -> R + Send,
{
    fn map(&mut self, record: ExtractedRecord<V>) -> R {
        self(record)
    }
}

/// Aggregation applied on the coordinator to every result it receives.
///
/// `reduce` runs on the coordinator's only control path and blocks every further
/// receive while it runs, so it must not block indefinitely.
pub trait Reducer<R>: Send {
    fn reduce(&mut self, message: ResultMessage<R>);

    /// Called exactly once, after every worker has reported the end of its events.
    fn end_processing(&mut self, counters: &ShutdownCounters) {
        ProcessingFinished {
            processed_count: counters.processed_count,
        }
        .log();
    }
}

impl<R, F> Reducer<R> for F
where
    F: FnMut(ResultMessage<R>) + Send,
{
    fn reduce(&mut self, message: ResultMessage<R>) {
        self(message)
    }
}
