// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_FRAMES_PER_EVENT, DEFAULT_SHUTDOWN_POLL_INTERVAL_MS};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure for a reduction run.
///
/// # Fields
/// * `engine` - Which extraction layers to use and which fields to extract
/// * `general` - Event source and per-event processing options
/// * `shutdown` - Shutdown protocol tuning (optional)
///
/// # Example
/// ```yaml
/// engine:
///   facility_layer: simulated
///   detector_layer: simulated
///   required_data: [detector_data, timestamp]
/// general:
///   source: "events=40,frames=3"
///   num_frames_in_event_to_process: 2
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    pub engine: EngineConfig,
    pub general: GeneralConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

/// Extraction layer selection and the ordered list of fields to extract.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EngineConfig {
    pub facility_layer: String,
    pub detector_layer: String,
    pub required_data: Vec<String>,
}

/// Event source and per-event processing options.
///
/// # Fields
/// * `source` - Source string handed verbatim to the event generator
/// * `num_frames_in_event_to_process` - Ceiling on frames per event, taken from the end
///   of the event (defaults to 1)
/// * `verbose` - Raise the default log level to debug
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GeneralConfig {
    pub source: String,
    #[serde(default = "default_frames_per_event")]
    pub num_frames_in_event_to_process: usize,
    #[serde(default)]
    pub verbose: bool,
}

fn default_frames_per_event() -> usize {
    DEFAULT_FRAMES_PER_EVENT
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ShutdownConfig {
    pub poll_interval_ms: Option<u64>,
}

impl ShutdownConfig {
    /// Get the poll interval, using the built-in default if not configured.
    pub fn get_poll_interval_ms(&self) -> u64 {
        self.poll_interval_ms
            .unwrap_or(DEFAULT_SHUTDOWN_POLL_INTERVAL_MS)
    }
}

impl Config {
    /// Trim whitespace around layer and field names.
    pub fn normalize(&mut self) {
        self.engine.facility_layer = self.engine.facility_layer.trim().to_string();
        self.engine.detector_layer = self.engine.detector_layer.trim().to_string();
        for field in &mut self.engine.required_data {
            *field = field.trim().to_string();
        }
    }
}

/// Load a config from a YAML (`.yaml`, `.yml`) or TOML (`.toml`) file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        Some("toml") => Ok(toml::from_str(&content)?),
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load, normalize and validate a config file
///
/// Every validation problem is reported at once in `ConfigError::Invalid`.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let mut cfg = load_config(path)?;
    cfg.normalize();
    validate_config(&cfg).map_err(|errors| ConfigError::Invalid { errors })?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;
    use std::io::Write;
    use tempfile::Builder;

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
engine:
  facility_layer: simulated
  detector_layer: simulated
  required_data: [detector_data, timestamp]
general:
  source: "events=10"
  num_frames_in_event_to_process: 3
  verbose: true
shutdown:
  poll_interval_ms: 5
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.engine.required_data, vec!["detector_data", "timestamp"]);
        assert_eq!(cfg.general.num_frames_in_event_to_process, 3);
        assert!(cfg.general.verbose);
        assert_eq!(cfg.shutdown.get_poll_interval_ms(), 5);
    }

    #[test]
    fn test_defaults_apply() {
        let yaml = r#"
engine:
  facility_layer: simulated
  detector_layer: simulated
  required_data: [timestamp]
general:
  source: "events=1"
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            cfg.general.num_frames_in_event_to_process,
            DEFAULT_FRAMES_PER_EVENT
        );
        assert!(!cfg.general.verbose);
        assert_eq!(cfg.shutdown, ShutdownConfig::default());
        assert_eq!(
            cfg.shutdown.get_poll_interval_ms(),
            DEFAULT_SHUTDOWN_POLL_INTERVAL_MS
        );
    }

    #[test]
    fn test_load_yaml_and_toml_agree() {
        let yaml = write_config(
            ".yaml",
            r#"
engine:
  facility_layer: simulated
  detector_layer: simulated
  required_data: [detector_data, timestamp]
general:
  source: "events=4,frames=2"
  num_frames_in_event_to_process: 2
"#,
        );
        let toml = write_config(
            ".toml",
            r#"
[engine]
facility_layer = "simulated"
detector_layer = "simulated"
required_data = ["detector_data", "timestamp"]

[general]
source = "events=4,frames=2"
num_frames_in_event_to_process = 2
"#,
        );

        let from_yaml = load_and_validate_config(yaml.path()).unwrap();
        let from_toml = load_and_validate_config(toml.path()).unwrap();
        assert_eq!(from_yaml, from_toml);
    }

    #[test]
    fn test_load_and_validate_trims_field_names() {
        let file = write_config(
            ".yml",
            r#"
engine:
  facility_layer: " simulated "
  detector_layer: simulated
  required_data: ["  detector_data", "timestamp  "]
general:
  source: "events=1"
"#,
        );

        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg.engine.facility_layer, "simulated");
        assert_eq!(cfg.engine.required_data, vec!["detector_data", "timestamp"]);
    }

    #[test]
    fn test_load_and_validate_collects_every_error() {
        let file = write_config(
            ".yaml",
            r#"
engine:
  facility_layer: simulated
  detector_layer: simulated
  required_data: [timestamp, " ", timestamp]
general:
  source: ""
  num_frames_in_event_to_process: 0
shutdown:
  poll_interval_ms: 0
"#,
        );

        match load_and_validate_config(file.path()) {
            Err(ConfigError::Invalid { errors }) => {
                assert!(errors.contains(&ValidationError::BlankFieldName { index: 1 }));
                assert!(errors.contains(&ValidationError::DuplicateFieldName {
                    field: "timestamp".to_string()
                }));
                assert!(errors.contains(&ValidationError::ZeroFramesPerEvent));
                assert!(errors.contains(&ValidationError::EmptySource));
                assert!(errors.contains(&ValidationError::ZeroPollInterval));
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_config(".json", "{}");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");

        let error = load_config(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
        assert!(error.to_string().contains("absent.yaml"));
    }

    #[test]
    fn test_malformed_yaml_is_typed() {
        let file = write_config(".yaml", "engine: [not, a, table");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Yaml(_))));
    }
}
