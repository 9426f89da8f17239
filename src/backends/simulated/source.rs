// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::str::FromStr;

use anyhow::{anyhow, bail, Context};

use crate::channel::Rank;
use crate::traits::{EventSource, EventStream};

const DEFAULT_EVENTS: u64 = 100;
const DEFAULT_FRAMES: usize = 1;
const DEFAULT_PIXELS: usize = 16;
const BASE_TIMESTAMP: f64 = 1_700_000_000.0;

/// Parsed simulated source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpec {
    pub events: u64,
    pub frames: usize,
    pub pixels: usize,
    pub reject_every: u64,
    pub corrupt_every: u64,
}

impl Default for SourceSpec {
    fn default() -> Self {
        Self {
            events: DEFAULT_EVENTS,
            frames: DEFAULT_FRAMES,
            pixels: DEFAULT_PIXELS,
            reject_every: 0,
            corrupt_every: 0,
        }
    }
}

impl FromStr for SourceSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut spec = SourceSpec::default();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("expected key=value, found '{}'", pair))?;
            let value = value.trim();
            match key.trim() {
                "events" => spec.events = parse_number(key, value)?,
                "frames" => spec.frames = parse_number(key, value)?,
                "pixels" => spec.pixels = parse_number(key, value)?,
                "reject_every" => spec.reject_every = parse_number(key, value)?,
                "corrupt_every" => spec.corrupt_every = parse_number(key, value)?,
                other => bail!("unknown simulated source option '{}'", other),
            }
        }
        Ok(spec)
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid value '{}' for '{}'", value, key))
}

/// Handle for an event not yet opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimEvent {
    pub id: u64,
    pub spec: SourceSpec,
}

impl SimEvent {
    fn is_corrupt(&self, frame_index: usize) -> bool {
        let every = self.spec.corrupt_every;
        let ordinal = self.id * self.spec.frames as u64 + frame_index as u64 + 1;
        every > 0 && ordinal % every == 0
    }
}

/// One detector frame as seen by the extraction functions.
#[derive(Debug, Clone, PartialEq)]
pub struct SimFrame {
    pub event_id: u64,
    pub frame_index: usize,
    pub timestamp: f64,
    pub beam_energy: f64,
    pub corrupt: bool,
    pub pixels: Vec<f64>,
}

/// Event source backed by the synthetic facility.
///
/// Stateless: everything about an event is derived from the source string and the
/// event id.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedSource;

impl SimulatedSource {
    pub fn new() -> Self {
        SimulatedSource
    }

    /// Check a source string without starting a generator.
    pub fn validate_source(source: &str) -> anyhow::Result<SourceSpec> {
        source
            .parse()
            .with_context(|| format!("invalid simulated source '{}'", source))
    }
}

impl EventSource for SimulatedSource {
    type Event = SimEvent;
    type Opened = SimEvent;
    type Frame = SimFrame;

    fn events(
        &self,
        source: &str,
        rank: Rank,
        group_size: usize,
    ) -> anyhow::Result<EventStream<SimEvent>> {
        if rank == 0 || rank >= group_size {
            bail!("rank {} is not a worker in a group of {}", rank, group_size);
        }
        let spec = Self::validate_source(source)?;

        let workers = (group_size - 1) as u64;
        let slot = (rank - 1) as u64;
        Ok(Box::new(
            (0..spec.events)
                .filter(move |id| id % workers == slot)
                .map(move |id| SimEvent { id, spec }),
        ))
    }

    fn reject(&self, event: &SimEvent) -> bool {
        let every = event.spec.reject_every;
        every > 0 && (event.id + 1) % every == 0
    }

    fn num_frames(&self, event: &SimEvent) -> usize {
        event.spec.frames
    }

    fn open(&self, event: SimEvent) -> anyhow::Result<SimEvent> {
        Ok(event)
    }

    fn close(&self, _opened: SimEvent) -> anyhow::Result<()> {
        Ok(())
    }

    fn frame(&self, event: &SimEvent, index: usize) -> SimFrame {
        let id = event.id;
        let pixels = (0..event.spec.pixels)
            .map(|p| ((id * 31 + index as u64 * 17 + p as u64 * 7) % 100) as f64)
            .collect();
        SimFrame {
            event_id: id,
            frame_index: index,
            timestamp: BASE_TIMESTAMP + id as f64 * 0.1 + index as f64 * 0.01,
            beam_energy: 9.5 + (id % 5) as f64 * 0.1,
            corrupt: event.is_corrupt(index),
            pixels,
        }
    }
}
