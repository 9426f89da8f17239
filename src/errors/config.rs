// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Problems found while validating a loaded configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `engine.required_data` lists no fields at all
    #[error("engine.required_data must name at least one field")]
    EmptyRequiredData,

    /// A required field name is empty after trimming
    #[error("engine.required_data entry {index} is blank")]
    BlankFieldName { index: usize },

    /// The same field was requested twice
    #[error("engine.required_data lists '{field}' more than once")]
    DuplicateFieldName { field: String },

    /// `general.num_frames_in_event_to_process` is zero
    #[error("general.num_frames_in_event_to_process must be a positive integer")]
    ZeroFramesPerEvent,

    /// `general.source` is empty
    #[error("general.source must not be empty")]
    EmptySource,

    /// The layer cannot interpret `general.source`
    #[error("general.source is not understood by the facility layer: {reason}")]
    InvalidSource { reason: String },

    /// `shutdown.poll_interval_ms` is zero
    #[error("shutdown.poll_interval_ms must be a positive integer")]
    ZeroPollInterval,
}

/// Errors raised while loading configuration or selecting layers from it.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file extension is neither YAML nor TOML.
    #[error("Unsupported configuration format for '{}' (expected .yaml, .yml or .toml)", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// A facility or detector layer name has no implementation.
    #[error("Unknown {kind} layer '{name}'")]
    UnknownLayer { kind: &'static str, name: String },

    #[error("Configuration validation failed:\n{}", format_validation_errors(errors))]
    Invalid { errors: Vec<ValidationError> },
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
