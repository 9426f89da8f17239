// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for binding required fields to extraction functions.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A required field was bound to a layer's function.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct ExtractionResolved<'a> {
    pub field: &'a str,
    pub layer: &'a str,
}

impl Display for ExtractionResolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Resolved extraction function for '{}' from layer '{}'",
            self.field, self.layer
        )
    }
}

impl StructuredLog for ExtractionResolved<'_> {
    fn log(&self) {
        tracing::debug!(field = self.field, layer = self.layer, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "extraction_resolved",
            span_name = name,
            field = self.field,
            layer = self.layer,
        )
    }
}

/// No layer defines a required field.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use frame_reducer::observability::messages::extraction::ExtractionUnresolved;
///
/// let msg = ExtractionUnresolved {
///     field: "beam_energy",
///     searched: &["detector", "facility"],
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Data extraction function not defined for 'beam_energy' (searched layers: detector, facility)"
/// );
/// ```
pub struct ExtractionUnresolved<'a> {
    pub field: &'a str,
    pub searched: &'a [&'a str],
}

impl Display for ExtractionUnresolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Data extraction function not defined for '{}' (searched layers: {})",
            self.field,
            self.searched.join(", ")
        )
    }
}

impl StructuredLog for ExtractionUnresolved<'_> {
    fn log(&self) {
        tracing::error!(
            field = self.field,
            searched = self.searched.join(", "),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "extraction_unresolved",
            span_name = name,
            field = self.field,
        )
    }
}
