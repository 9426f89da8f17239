// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::channel::{Rank, ResultMessage};
use crate::engine::ShutdownCounters;
use crate::extraction::ExtractedRecord;
use crate::observability::messages::coordinator::ProcessingFinished;
use crate::observability::messages::StructuredLog;
use crate::traits::Reducer;

/// Per-frame result shipped from a worker to the coordinator.
///
/// Fields are present only when the matching value was extracted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameSummary {
    pub event_id: Option<u64>,
    pub frame_index: Option<u64>,
    pub timestamp: Option<f64>,
    pub beam_energy: Option<f64>,
    pub mean_intensity: Option<f64>,
    pub peak_intensity: Option<f64>,
}

/// Map function: reduce a frame's pixels to mean and peak intensity.
pub fn summarize_frame(record: ExtractedRecord<Value>) -> FrameSummary {
    let mut summary = FrameSummary {
        event_id: record.get("event_id").and_then(Value::as_u64),
        frame_index: record.get("frame_index").and_then(Value::as_u64),
        timestamp: record.get("timestamp").and_then(Value::as_f64),
        beam_energy: record.get("beam_energy").and_then(Value::as_f64),
        ..FrameSummary::default()
    };

    if let Some(Value::Array(pixels)) = record.get("detector_data") {
        let values: Vec<f64> = pixels.iter().filter_map(Value::as_f64).collect();
        if !values.is_empty() {
            summary.mean_intensity = Some(values.iter().sum::<f64>() / values.len() as f64);
            summary.peak_intensity = values.iter().copied().reduce(f64::max);
        }
    }

    summary
}

/// Reduce function: running statistics over every frame summary received.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunningStatistics {
    pub frames: u64,
    pub intensity_sum: f64,
    pub peak_intensity: Option<f64>,
    pub beam_energy_sum: f64,
    pub beam_energy_samples: u64,
    pub frames_per_worker: BTreeMap<Rank, u64>,
    /// Set by the end-of-processing hook
    pub finished: Option<ShutdownCounters>,
}

impl RunningStatistics {
    pub fn mean_intensity(&self) -> Option<f64> {
        (self.frames > 0).then(|| self.intensity_sum / self.frames as f64)
    }

    pub fn mean_beam_energy(&self) -> Option<f64> {
        (self.beam_energy_samples > 0)
            .then(|| self.beam_energy_sum / self.beam_energy_samples as f64)
    }
}

impl Reducer<FrameSummary> for RunningStatistics {
    fn reduce(&mut self, message: ResultMessage<FrameSummary>) {
        let summary = message.payload;
        self.frames += 1;
        *self.frames_per_worker.entry(message.worker).or_insert(0) += 1;

        if let Some(mean) = summary.mean_intensity {
            self.intensity_sum += mean;
        }
        if let Some(peak) = summary.peak_intensity {
            self.peak_intensity = Some(self.peak_intensity.map_or(peak, |p| p.max(peak)));
        }
        if let Some(energy) = summary.beam_energy {
            self.beam_energy_sum += energy;
            self.beam_energy_samples += 1;
        }
    }

    fn end_processing(&mut self, counters: &ShutdownCounters) {
        self.finished = Some(*counters);
        ProcessingFinished {
            processed_count: counters.processed_count,
        }
        .log();
        tracing::info!(
            frames = self.frames,
            mean_intensity = ?self.mean_intensity(),
            peak_intensity = ?self.peak_intensity,
            "Running statistics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summarize_frame() {
        let mut record = ExtractedRecord::new();
        record.insert("detector_data", json!([2.0, 4.0, 9.0]));
        record.insert("event_id", json!(7));
        record.insert("timestamp", json!(1.5));

        let summary = summarize_frame(record);
        assert_eq!(summary.event_id, Some(7));
        assert_eq!(summary.timestamp, Some(1.5));
        assert_eq!(summary.mean_intensity, Some(5.0));
        assert_eq!(summary.peak_intensity, Some(9.0));
        assert_eq!(summary.beam_energy, None);
    }

    #[test]
    fn test_running_statistics_accumulate() {
        let mut stats = RunningStatistics::default();
        for (worker, mean, peak) in [(1, 2.0, 3.0), (2, 4.0, 8.0), (1, 6.0, 7.0)] {
            stats.reduce(ResultMessage {
                worker,
                payload: FrameSummary {
                    mean_intensity: Some(mean),
                    peak_intensity: Some(peak),
                    beam_energy: Some(10.0),
                    ..FrameSummary::default()
                },
            });
        }

        assert_eq!(stats.frames, 3);
        assert_eq!(stats.mean_intensity(), Some(4.0));
        assert_eq!(stats.peak_intensity, Some(8.0));
        assert_eq!(stats.mean_beam_energy(), Some(10.0));
        assert_eq!(stats.frames_per_worker.get(&1), Some(&2));

        let counters = ShutdownCounters {
            completed_workers: 2,
            processed_count: 3,
        };
        stats.end_processing(&counters);
        assert_eq!(stats.finished, Some(counters));
    }
}
