// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::bail;
use serde_json::{json, Value};

use super::source::SimFrame;
use crate::config::consts::SIMULATED_LAYER;
use crate::extraction::ExtractionLayer;

/// Facility functions: `timestamp`, `event_id`, `frame_index`.
pub fn facility_layer() -> ExtractionLayer<SimFrame, Value> {
    ExtractionLayer::new(format!("{}-facility", SIMULATED_LAYER))
        .with("timestamp", |frame: &SimFrame| Ok(json!(frame.timestamp)))
        .with("event_id", |frame: &SimFrame| Ok(json!(frame.event_id)))
        .with("frame_index", |frame: &SimFrame| Ok(json!(frame.frame_index)))
}

/// Detector functions: `detector_data`, `num_pixels`, `beam_energy`.
///
/// `detector_data` and `beam_energy` fail on corrupt frames.
pub fn detector_layer() -> ExtractionLayer<SimFrame, Value> {
    ExtractionLayer::new(format!("{}-detector", SIMULATED_LAYER))
        .with("detector_data", |frame: &SimFrame| {
            if frame.corrupt {
                bail!(
                    "detector readout of event {} frame {} is corrupt",
                    frame.event_id,
                    frame.frame_index
                );
            }
            Ok(json!(frame.pixels))
        })
        .with("num_pixels", |frame: &SimFrame| Ok(json!(frame.pixels.len())))
        .with("beam_energy", |frame: &SimFrame| {
            if frame.corrupt {
                bail!("beam energy missing for event {}", frame.event_id);
            }
            Ok(json!(frame.beam_energy))
        })
}
