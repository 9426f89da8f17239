// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Data extraction: turning one frame into a record of named values.
//!
//! Extraction functions are registered by field name in [`ExtractionLayer`]s (typically
//! a detector layer and a facility layer). At start-of-run every worker binds the
//! configured field names to concrete functions once, producing [`ResolvedExtractors`],
//! and reuses that binding for every frame:
//!
//! ```text
//! required_data ──► resolve(layers) ──► ResolvedExtractors ──► extract(frame) ──► ExtractedRecord
//! ```

mod layer;
mod record;
mod resolver;

pub use layer::{ExtractionFn, ExtractionLayer};
pub use record::ExtractedRecord;
pub use resolver::ResolvedExtractors;
