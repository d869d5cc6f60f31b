//! Encoding: extended value tree → JSON.

use crate::converter::Converter;
use crate::error::{ConvertError, Result};
use crate::format;
use crate::options::EncodeOptions;
use crate::registry::TypeRegistry;
use extjson_types::{ExtValue, JsonPath, PathSegment, SharedValue};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Traversal state for one encode call.
///
/// Codecs receive this so that nested values they emit are encoded through
/// the same depth limit, cycle check and path breadcrumb.
pub struct EncodeContext<'a> {
    registry: &'a TypeRegistry,
    max_depth: usize,
    path: JsonPath,
    /// Shared nodes on the current recursion path.
    in_progress: HashSet<usize>,
    /// Shared hops on the current path. They add no path segment but
    /// still count toward `max_depth`.
    shared_hops: usize,
}

impl<'a> EncodeContext<'a> {
    pub(crate) fn new(registry: &'a TypeRegistry, max_depth: usize) -> Self {
        Self {
            registry,
            max_depth,
            path: JsonPath::root(),
            in_progress: HashSet::new(),
            shared_hops: 0,
        }
    }

    /// The registry this encode runs against.
    #[must_use]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Location of the node being encoded.
    #[must_use]
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// Encodes a child of the current node, one level deeper.
    pub fn encode_child(
        &mut self,
        segment: impl Into<PathSegment>,
        value: &ExtValue,
    ) -> Result<Value> {
        self.path.push(segment);
        let result = self.encode(value);
        self.path.pop();
        result
    }

    /// Builds a [`ConvertError::InvalidTaggedValue`] at the current location.
    #[must_use]
    pub fn invalid_value(&self, kind: &str, message: impl Into<String>) -> ConvertError {
        ConvertError::InvalidTaggedValue {
            kind: kind.to_owned(),
            path: self.path.clone(),
            message: message.into(),
        }
    }

    pub(crate) fn encode(&mut self, value: &ExtValue) -> Result<Value> {
        if self.path.len() + self.shared_hops > self.max_depth {
            return Err(ConvertError::MaxDepthExceeded {
                limit: self.max_depth,
                path: self.path.clone(),
            });
        }

        if let ExtValue::Shared(shared) = value {
            return self.encode_shared(shared);
        }

        if let Some(codec) = self.registry.find_codec(value) {
            return codec.encode(value, self);
        }

        match value {
            ExtValue::Null => Ok(Value::Null),
            ExtValue::Bool(b) => Ok(Value::Bool(*b)),
            ExtValue::Number(n) => Ok(Value::Number(n.clone())),
            ExtValue::String(s) => Ok(Value::String(s.clone())),
            ExtValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    out.push(self.encode_child(index, item)?);
                }
                Ok(Value::Array(out))
            }
            ExtValue::Object(map) => {
                let mut out = Map::new();
                for (key, item) in map {
                    let encoded = self.encode_child(key.as_str(), item)?;
                    out.insert(key.clone(), encoded);
                }
                Ok(Value::Object(out))
            }
            other => Err(ConvertError::UnsupportedType {
                kind: other.kind_name().to_owned(),
                path: self.path.clone(),
            }),
        }
    }

    fn encode_shared(&mut self, shared: &SharedValue) -> Result<Value> {
        let id = shared.id();
        // Checked before locking: a node on the current path is still locked.
        if !self.in_progress.insert(id) {
            return Err(ConvertError::CyclicReference {
                path: self.path.clone(),
            });
        }
        self.shared_hops += 1;
        let result = shared.with(|inner| self.encode(inner));
        self.shared_hops -= 1;
        self.in_progress.remove(&id);
        result
    }
}

impl Converter<'_> {
    /// Encodes `value` to JSON text.
    ///
    /// Fails with `UnsupportedType`, `CyclicReference` or
    /// `MaxDepthExceeded`; no text is produced on failure.
    pub fn encode(&self, value: &ExtValue, options: &EncodeOptions) -> Result<String> {
        let json = self.to_json_value(value, options.max_depth)?;
        format::render(&json, options)
    }

    /// Encodes `value` to a JSON tree without rendering text.
    pub fn to_json_value(&self, value: &ExtValue, max_depth: usize) -> Result<Value> {
        EncodeContext::new(self.registry(), max_depth).encode(value)
    }
}
