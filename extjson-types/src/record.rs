//! Object kinds: field records and self-serializing values.

use crate::ExtValue;
use indexmap::IndexMap;
use std::fmt;

/// A plain object with a declared kind name and named fields.
///
/// This is the explicit form of "an object whose attributes can be listed":
/// the converter writes the fields out next to the kind name, and a record
/// only comes back as a `Record` when a decode rule for its kind name has
/// been registered.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: String,
    fields: IndexMap<String, ExtValue>,
}

impl Record {
    /// Creates a record with no fields.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: IndexMap::new(),
        }
    }

    /// Creates a record from an existing field map.
    #[must_use]
    pub fn with_fields(kind: impl Into<String>, fields: IndexMap<String, ExtValue>) -> Self {
        Self {
            kind: kind.into(),
            fields,
        }
    }

    /// Adds a field, builder style.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<ExtValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Sets a field, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ExtValue>) -> Option<ExtValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// The declared kind name.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ExtValue> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn fields(&self) -> &IndexMap<String, ExtValue> {
        &self.fields
    }

    #[must_use]
    pub fn into_fields(self) -> IndexMap<String, ExtValue> {
        self.fields
    }
}

/// A value that knows how to render itself as JSON.
///
/// The converter emits `to_json()` verbatim and untagged, so these values
/// are write-only unless the caller registers a matching decode rule.
pub trait SelfSerialize: fmt::Debug + Send + Sync {
    /// A name for the implementing type, used for equality and diagnostics.
    fn type_name(&self) -> &str;

    /// Renders the value. Must return the same JSON for equal values.
    fn to_json(&self) -> serde_json::Value;
}
