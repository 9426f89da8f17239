// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::config::consts::{DEFAULT_FRAMES_PER_EVENT, DEFAULT_SHUTDOWN_POLL_INTERVAL_MS};
use crate::config::Config;

/// Immutable run settings handed to the worker and coordinator state machines.
///
/// Built once from a validated [`Config`]; nothing in the engine mutates it.
///
/// # Examples
///
/// ```
/// use frame_reducer::config::EngineSettings;
/// use std::time::Duration;
///
/// let settings = EngineSettings::new("events=8", ["detector_data", "timestamp"])
///     .with_frames_per_event(2)
///     .with_poll_interval(Duration::from_millis(5));
///
/// assert_eq!(settings.required_data, vec!["detector_data", "timestamp"]);
/// assert_eq!(settings.frames_per_event, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Handed verbatim to the event generator
    pub source: String,
    /// Field names to extract, in order
    pub required_data: Vec<String>,
    /// Ceiling on frames processed per event
    pub frames_per_event: usize,
    /// Sleep between sweeps while waiting for shutdown confirmations
    pub poll_interval: Duration,
}

impl EngineSettings {
    pub fn new<I, S>(source: impl Into<String>, required_data: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into(),
            required_data: required_data.into_iter().map(Into::into).collect(),
            frames_per_event: DEFAULT_FRAMES_PER_EVENT,
            poll_interval: Duration::from_millis(DEFAULT_SHUTDOWN_POLL_INTERVAL_MS),
        }
    }

    pub fn with_frames_per_event(mut self, frames_per_event: usize) -> Self {
        self.frames_per_event = frames_per_event;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl From<&Config> for EngineSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            source: cfg.general.source.clone(),
            required_data: cfg.engine.required_data.clone(),
            frames_per_event: cfg.general.num_frames_in_event_to_process,
            poll_interval: Duration::from_millis(cfg.shutdown.get_poll_interval_ms()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, GeneralConfig, ShutdownConfig};

    #[test]
    fn test_settings_from_config() {
        let cfg = Config {
            engine: EngineConfig {
                facility_layer: "simulated".to_string(),
                detector_layer: "simulated".to_string(),
                required_data: vec!["timestamp".to_string()],
            },
            general: GeneralConfig {
                source: "events=3".to_string(),
                num_frames_in_event_to_process: 4,
                verbose: false,
            },
            shutdown: ShutdownConfig {
                poll_interval_ms: Some(10),
            },
        };

        let settings = EngineSettings::from(&cfg);
        assert_eq!(settings.source, "events=3");
        assert_eq!(settings.required_data, vec!["timestamp"]);
        assert_eq!(settings.frames_per_event, 4);
        assert_eq!(settings.poll_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_new_uses_defaults() {
        let settings = EngineSettings::new("events=1", ["a"]);
        assert_eq!(settings.frames_per_event, DEFAULT_FRAMES_PER_EVENT);
        assert_eq!(
            settings.poll_interval,
            Duration::from_millis(DEFAULT_SHUTDOWN_POLL_INTERVAL_MS)
        );
    }
}
