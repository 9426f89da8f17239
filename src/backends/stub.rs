// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, bail};

use crate::channel::Rank;
use crate::extraction::{ExtractedRecord, ExtractionLayer};
use crate::traits::{EventSource, EventStream};

/// One scripted event: its id and a value per frame.
///
/// A negative frame value makes the `value` extraction function fail for that frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedEvent {
    pub id: u64,
    pub frames: Vec<i64>,
    pub reject: bool,
    pub fail_open: bool,
    pub fail_close: bool,
}

impl ScriptedEvent {
    pub fn new(id: u64, frames: Vec<i64>) -> Self {
        Self {
            id,
            frames,
            reject: false,
            fail_open: false,
            fail_close: false,
        }
    }

    pub fn rejected(mut self) -> Self {
        self.reject = true;
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

/// What a scripted event hands to the extraction functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedFrame {
    pub event_id: u64,
    pub index: usize,
    pub value: i64,
}

/// Shared call counters, readable after the source has moved into a worker.
#[derive(Debug, Default)]
pub struct ScriptedCounters {
    fetched: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl ScriptedCounters {
    pub fn fetched(&self) -> usize {
        self.fetched.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Event source replaying a fixed script per worker rank.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    scripts: HashMap<Rank, Vec<ScriptedEvent>>,
    fail_start: bool,
    counters: Arc<ScriptedCounters>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_worker(mut self, rank: Rank, events: Vec<ScriptedEvent>) -> Self {
        self.scripts.insert(rank, events);
        self
    }

    /// Every call to `events` fails.
    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn counters(&self) -> Arc<ScriptedCounters> {
        self.counters.clone()
    }

    /// Detector layer (`value`, `frame_index`) and facility layer (`event_id`).
    pub fn layers() -> Vec<ExtractionLayer<ScriptedFrame, i64>> {
        let detector = ExtractionLayer::new("stub-detector")
            .with("value", |frame: &ScriptedFrame| {
                if frame.value < 0 {
                    Err(anyhow!("corrupt frame {}", frame.index))
                } else {
                    Ok(frame.value)
                }
            })
            .with("frame_index", |frame: &ScriptedFrame| Ok(frame.index as i64));
        let facility = ExtractionLayer::new("stub-facility")
            .with("event_id", |frame: &ScriptedFrame| Ok(frame.event_id as i64));
        vec![detector, facility]
    }

    /// Mapper forwarding the `value` field.
    pub fn value_of(record: ExtractedRecord<i64>) -> i64 {
        record.get("value").copied().unwrap_or_default()
    }
}

impl EventSource for ScriptedSource {
    type Event = ScriptedEvent;
    type Opened = ScriptedEvent;
    type Frame = ScriptedFrame;

    fn events(
        &self,
        _source: &str,
        rank: Rank,
        _group_size: usize,
    ) -> anyhow::Result<EventStream<ScriptedEvent>> {
        if self.fail_start {
            bail!("scripted source refused to start");
        }
        let counters = self.counters.clone();
        let events = self.scripts.get(&rank).cloned().unwrap_or_default();
        Ok(Box::new(events.into_iter().inspect(move |_| {
            counters.fetched.fetch_add(1, Ordering::SeqCst);
        })))
    }

    fn reject(&self, event: &ScriptedEvent) -> bool {
        event.reject
    }

    fn num_frames(&self, event: &ScriptedEvent) -> usize {
        event.frames.len()
    }

    fn open(&self, event: ScriptedEvent) -> anyhow::Result<ScriptedEvent> {
        if event.fail_open {
            bail!("event {} is unreadable", event.id);
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(event)
    }

    fn close(&self, event: ScriptedEvent) -> anyhow::Result<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        if event.fail_close {
            bail!("event {} could not be released", event.id);
        }
        Ok(())
    }

    fn frame(&self, event: &ScriptedEvent, index: usize) -> ScriptedFrame {
        ScriptedFrame {
            event_id: event.id,
            index,
            value: event.frames.get(index).copied().unwrap_or_default(),
        }
    }
}
