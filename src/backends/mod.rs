// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Facility and detector layer implementations.
//!
//! A layer contributes extraction functions by field name; the facility layer also
//! supplies the event source. Layers are picked by name from the `engine` section
//! of the configuration:
//! ```text
//! Configuration → LayerFactory → (EventSource, [detector layer, facility layer]) → Engine
//! ```
//!
//! # Available Layers
//!
//! ## Simulated
//! Deterministic synthetic events and detector frames, selected with the name
//! `simulated`. See [`simulated`] for the source string format.
//!
//! ## Stub (Test-Only)
//! `ScriptedSource` replays a fixed script of events per worker and counts calls
//! into the source. Only available in test builds.
//!
//! # Examples
//!
//! ```rust
//! use frame_reducer::backends::LayerFactory;
//! use frame_reducer::config::{Config, EngineConfig, GeneralConfig, ShutdownConfig};
//!
//! let config = Config {
//!     engine: EngineConfig {
//!         facility_layer: "simulated".to_string(),
//!         detector_layer: "simulated".to_string(),
//!         required_data: vec!["detector_data".to_string()],
//!     },
//!     general: GeneralConfig {
//!         source: "events=10".to_string(),
//!         num_frames_in_event_to_process: 1,
//!         verbose: false,
//!     },
//!     shutdown: ShutdownConfig::default(),
//! };
//!
//! let (_source, layers) = LayerFactory::from_config(&config)?;
//! assert_eq!(layers.len(), 2);
//! # Ok::<(), frame_reducer::errors::ConfigError>(())
//! ```

pub mod simulated;
#[cfg(test)]
pub mod stub;

use serde_json::Value;

use crate::config::consts::SIMULATED_LAYER;
use crate::config::Config;
use crate::errors::{ConfigError, ValidationError};
use crate::extraction::ExtractionLayer;
use simulated::{SimFrame, SimulatedSource};

/// Builds the event source and extraction layers named by a configuration.
pub struct LayerFactory;

impl LayerFactory {
    /// Returns the source and the layers in resolution order: detector, then facility.
    ///
    /// The source string is checked up front so a typo fails at start-up rather than
    /// on every worker.
    pub fn from_config(
        cfg: &Config,
    ) -> Result<(SimulatedSource, Vec<ExtractionLayer<SimFrame, Value>>), ConfigError> {
        let detector = match cfg.engine.detector_layer.as_str() {
            SIMULATED_LAYER => simulated::detector_layer(),
            other => {
                return Err(ConfigError::UnknownLayer {
                    kind: "detector",
                    name: other.to_string(),
                })
            }
        };

        let facility = match cfg.engine.facility_layer.as_str() {
            SIMULATED_LAYER => simulated::facility_layer(),
            other => {
                return Err(ConfigError::UnknownLayer {
                    kind: "facility",
                    name: other.to_string(),
                })
            }
        };

        if let Err(error) = SimulatedSource::validate_source(&cfg.general.source) {
            return Err(ConfigError::Invalid {
                errors: vec![ValidationError::InvalidSource {
                    reason: format!("{:#}", error),
                }],
            });
        }

        Ok((SimulatedSource::new(), vec![detector, facility]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, GeneralConfig, ShutdownConfig};

    fn config(facility: &str, detector: &str, source: &str) -> Config {
        Config {
            engine: EngineConfig {
                facility_layer: facility.to_string(),
                detector_layer: detector.to_string(),
                required_data: vec!["timestamp".to_string()],
            },
            general: GeneralConfig {
                source: source.to_string(),
                num_frames_in_event_to_process: 1,
                verbose: false,
            },
            shutdown: ShutdownConfig::default(),
        }
    }

    #[test]
    fn test_simulated_layers_in_resolution_order() {
        let (_, layers) = LayerFactory::from_config(&config("simulated", "simulated", "events=2"))
            .unwrap();
        let names: Vec<&str> = layers.iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["simulated-detector", "simulated-facility"]);
    }

    #[test]
    fn test_unknown_layers_are_rejected() {
        match LayerFactory::from_config(&config("simulated", "cspad", "events=2")) {
            Err(ConfigError::UnknownLayer { kind, name }) => {
                assert_eq!(kind, "detector");
                assert_eq!(name, "cspad");
            }
            other => panic!("expected UnknownLayer, got {:?}", other.map(|_| ())),
        }

        assert!(matches!(
            LayerFactory::from_config(&config("lcls", "simulated", "events=2")),
            Err(ConfigError::UnknownLayer {
                kind: "facility",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_source_is_rejected_up_front() {
        assert!(matches!(
            LayerFactory::from_config(&config("simulated", "simulated", "events=lots")),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
