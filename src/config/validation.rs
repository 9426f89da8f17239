// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation.
//!
//! Checks run independently and every violation is collected, so a user fixing a
//! configuration file sees all problems in one pass:
//!
//! 1. `required_data` is non-empty, has no blank entries and no duplicates
//! 2. `num_frames_in_event_to_process` is positive
//! 3. `source` is non-empty
//! 4. `shutdown.poll_interval_ms`, when given, is positive
//!
//! Validation expects names to be trimmed already (see [`Config::normalize`]).

use crate::config::Config;
use crate::errors::ValidationError;
use std::collections::HashSet;

/// Validate a loaded configuration, returning every problem found.
pub fn validate_config(cfg: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_required_data(&cfg.engine.required_data, &mut errors);

    if cfg.general.num_frames_in_event_to_process == 0 {
        errors.push(ValidationError::ZeroFramesPerEvent);
    }

    if cfg.general.source.trim().is_empty() {
        errors.push(ValidationError::EmptySource);
    }

    if cfg.shutdown.poll_interval_ms == Some(0) {
        errors.push(ValidationError::ZeroPollInterval);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_required_data(required: &[String], errors: &mut Vec<ValidationError>) {
    if required.is_empty() {
        errors.push(ValidationError::EmptyRequiredData);
        return;
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for (index, field) in required.iter().enumerate() {
        if field.is_empty() {
            errors.push(ValidationError::BlankFieldName { index });
            continue;
        }
        if !seen.insert(field.as_str()) && reported.insert(field.as_str()) {
            errors.push(ValidationError::DuplicateFieldName {
                field: field.clone(),
            });
        }
    }
}
