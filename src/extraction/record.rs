// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Values extracted from one frame, keyed by field name, in extraction order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord<V> {
    fields: Vec<(String, V)>,
}

impl<V> ExtractedRecord<V> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Insert a value, replacing an earlier value for the same field.
    pub fn insert(&mut self, field: impl Into<String>, value: V) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&V> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Remove a value and hand over ownership.
    pub fn take(&mut self, field: &str) -> Option<V> {
        let index = self.fields.iter().position(|(name, _)| name == field)?;
        Some(self.fields.remove(index).1)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<V> Default for ExtractedRecord<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> IntoIterator for ExtractedRecord<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
