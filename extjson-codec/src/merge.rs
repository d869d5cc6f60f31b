//! Deep merge of two value trees.
//!
//! Objects merge key by key with `update` winning on conflicts. Everything
//! else, arrays included, is replaced wholesale by the `update` side. Base
//! keys keep their position and new keys from `update` are appended.

use crate::decode::parse;
use crate::error::{ConvertError, Result};
use crate::options::DEFAULT_MAX_DEPTH;
use extjson_types::{ExtValue, JsonPath, PathSegment, Record, SharedValue, ValueSet};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use std::mem;

/// Merges `update` into a copy of `base`.
///
/// With `deep` unset only top-level keys are considered; with it set,
/// nested objects present on both sides merge recursively. Inputs are
/// never modified. Shared nodes are copied out, and a cyclic graph fails
/// with `InvalidMergeInput`.
pub fn merge(base: &ExtValue, update: &ExtValue, deep: bool) -> Result<ExtValue> {
    let base = Resolver::default().resolve(base)?;
    let update = Resolver::default().resolve(update)?;
    Ok(merge_owned(base, update, deep))
}

/// [`merge`] over plain JSON trees.
#[must_use]
pub fn merge_json(base: &Value, update: &Value, deep: bool) -> Value {
    merge_plain(base.clone(), update.clone(), deep)
}

/// Parses both sides as JSON, then merges them with [`merge_json`].
pub fn merge_str(base: &str, update: &str, deep: bool) -> Result<Value> {
    let base = parse(base, DEFAULT_MAX_DEPTH)?;
    let update = parse(update, DEFAULT_MAX_DEPTH)?;
    Ok(merge_plain(base, update, deep))
}

fn merge_owned(base: ExtValue, update: ExtValue, deep: bool) -> ExtValue {
    let (mut base, update) = match (base, update) {
        (ExtValue::Object(base), ExtValue::Object(update)) => (base, update),
        (_, update) => return update,
    };
    for (key, incoming) in update {
        let nested = deep
            && matches!(incoming, ExtValue::Object(_))
            && matches!(base.get(&key), Some(ExtValue::Object(_)));
        if nested {
            if let Some(slot) = base.get_mut(&key) {
                let current = mem::take(slot);
                *slot = merge_owned(current, incoming, true);
            }
        } else {
            base.insert(key, incoming);
        }
    }
    ExtValue::Object(base)
}

fn merge_plain(base: Value, update: Value, deep: bool) -> Value {
    let (mut base, update) = match (base, update) {
        (Value::Object(base), Value::Object(update)) => (base, update),
        (_, update) => return update,
    };
    for (key, incoming) in update {
        let nested = deep && incoming.is_object() && base.get(&key).is_some_and(Value::is_object);
        if nested {
            if let Some(slot) = base.get_mut(&key) {
                let current = mem::take(slot);
                *slot = merge_plain(current, incoming, true);
            }
        } else {
            base.insert(key, incoming);
        }
    }
    Value::Object(base)
}

/// Deep copy that follows shared nodes and rejects cycles.
#[derive(Default)]
struct Resolver {
    path: JsonPath,
    in_progress: HashSet<usize>,
}

impl Resolver {
    fn resolve(&mut self, value: &ExtValue) -> Result<ExtValue> {
        Ok(match value {
            ExtValue::Shared(shared) => return self.resolve_shared(shared),
            ExtValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    out.push(self.resolve_child(index, item)?);
                }
                ExtValue::Array(out)
            }
            ExtValue::Object(map) => ExtValue::Object(self.resolve_map(map)?),
            ExtValue::Set(set) => {
                let mut out = ValueSet::new();
                for (index, item) in set.iter().enumerate() {
                    out.insert(self.resolve_child(index, item)?);
                }
                ExtValue::Set(out)
            }
            ExtValue::Record(record) => {
                ExtValue::Record(Record::with_fields(record.kind(), self.resolve_map(record.fields())?))
            }
            other => other.clone(),
        })
    }

    fn resolve_map(&mut self, map: &IndexMap<String, ExtValue>) -> Result<IndexMap<String, ExtValue>> {
        let mut out = IndexMap::with_capacity(map.len());
        for (key, item) in map {
            let resolved = self.resolve_child(key.as_str(), item)?;
            out.insert(key.clone(), resolved);
        }
        Ok(out)
    }

    fn resolve_child(
        &mut self,
        segment: impl Into<PathSegment>,
        value: &ExtValue,
    ) -> Result<ExtValue> {
        self.path.push(segment);
        let result = self.resolve(value);
        self.path.pop();
        result
    }

    fn resolve_shared(&mut self, shared: &SharedValue) -> Result<ExtValue> {
        let id = shared.id();
        if !self.in_progress.insert(id) {
            return Err(ConvertError::InvalidMergeInput {
                path: self.path.clone(),
                reason: "cyclic reference".to_owned(),
            });
        }
        let result = shared.with(|inner| self.resolve(inner));
        self.in_progress.remove(&id);
        result
    }
}
