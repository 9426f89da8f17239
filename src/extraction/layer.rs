// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Function extracting one named value from a frame.
pub type ExtractionFn<D, V> = Arc<dyn Fn(&D) -> anyhow::Result<V> + Send + Sync>;

/// Named table of extraction functions contributed by one layer.
pub struct ExtractionLayer<D, V> {
    name: String,
    functions: HashMap<String, ExtractionFn<D, V>>,
}

impl<D: 'static, V: 'static> ExtractionLayer<D, V> {
    /// Create an empty layer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: HashMap::new(),
        }
    }

    /// Register a function for `field`, builder style
    pub fn with<F>(mut self, field: impl Into<String>, function: F) -> Self
    where
        F: Fn(&D) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        self.register(field, function);
        self
    }

    /// Register a function for `field`, replacing any earlier one
    pub fn register<F>(&mut self, field: impl Into<String>, function: F)
    where
        F: Fn(&D) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        self.functions.insert(field.into(), Arc::new(function));
    }
}

impl<D, V> ExtractionLayer<D, V> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the function registered for `field`
    pub fn get(&self, field: &str) -> Option<&ExtractionFn<D, V>> {
        self.functions.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.functions.contains_key(field)
    }

    /// Field names this layer can extract, sorted
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.functions.keys().map(|k| k.as_str()).collect();
        fields.sort_unstable();
        fields
    }
}

impl<D, V> fmt::Debug for ExtractionLayer<D, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionLayer")
            .field("name", &self.name)
            .field("fields", &self.fields())
            .finish()
    }
}
