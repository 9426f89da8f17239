// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::panic::{catch_unwind, AssertUnwindSafe};

use anyhow::anyhow;

use super::layer::{ExtractionFn, ExtractionLayer};
use super::record::ExtractedRecord;
use crate::errors::{panic_message, ConfigError, EngineError, ValidationError};
use crate::observability::messages::extraction::{ExtractionResolved, ExtractionUnresolved};
use crate::observability::messages::StructuredLog;

/// Required field names bound to concrete extraction functions.
///
/// Built once per worker at start-of-run. Layers are searched in the order given,
/// so the first layer that defines a field wins (the engine passes the detector
/// layer before the facility layer).
pub struct ResolvedExtractors<D, V> {
    bindings: Vec<Binding<D, V>>,
}

struct Binding<D, V> {
    field: String,
    layer: String,
    function: ExtractionFn<D, V>,
}

impl<D, V> ResolvedExtractors<D, V> {
    /// Bind each name in `required` to the first layer that defines it.
    ///
    /// # Errors
    /// * `EngineError::Config` when `required` is empty.
    /// * `EngineError::MissingExtractionFunction` naming the first field no layer defines.
    pub fn resolve(
        required: &[String],
        layers: &[ExtractionLayer<D, V>],
    ) -> Result<Self, EngineError> {
        if required.is_empty() {
            return Err(ConfigError::Invalid {
                errors: vec![ValidationError::EmptyRequiredData],
            }
            .into());
        }

        let mut bindings = Vec::with_capacity(required.len());
        for field in required {
            let found = layers
                .iter()
                .find_map(|layer| layer.get(field).map(|function| (layer.name(), function)));

            match found {
                Some((layer, function)) => {
                    ExtractionResolved {
                        field,
                        layer,
                    }
                    .log();
                    bindings.push(Binding {
                        field: field.clone(),
                        layer: layer.to_string(),
                        function: function.clone(),
                    });
                }
                None => {
                    let searched: Vec<&str> = layers.iter().map(|l| l.name()).collect();
                    ExtractionUnresolved {
                        field,
                        searched: &searched,
                    }
                    .log();
                    return Err(EngineError::MissingExtractionFunction {
                        field: field.clone(),
                    });
                }
            }
        }

        Ok(Self { bindings })
    }

    /// Apply every bound function to `frame`, in configured order.
    ///
    /// The first failing function aborts extraction for this frame and the error
    /// names its field. A function that panics fails the same way.
    pub fn extract(&self, frame: &D) -> Result<ExtractedRecord<V>, EngineError> {
        let mut record = ExtractedRecord::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            let value = catch_unwind(AssertUnwindSafe(|| (binding.function)(frame)))
                .unwrap_or_else(|payload| {
                    Err(anyhow!("panicked: {}", panic_message(payload.as_ref())))
                })
                .map_err(|source| EngineError::DataExtraction {
                    field: binding.field.clone(),
                    source,
                })?;
            record.insert(binding.field.as_str(), value);
        }
        Ok(record)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Name of the layer that supplied `field`, if bound
    pub fn layer_of(&self, field: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.field == field)
            .map(|b| b.layer.as_str())
    }
}

impl<D, V> std::fmt::Debug for ResolvedExtractors<D, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for binding in &self.bindings {
            map.entry(&binding.field, &binding.layer);
        }
        map.finish()
    }
}
