//! Decoding: JSON text → extended value tree.

use crate::converter::Converter;
use crate::error::{ConvertError, Result};
use crate::kinds;
use crate::options::{DecodeOptions, KindHint};
use crate::registry::{TYPE_KEY, TypeRegistry};
use extjson_types::{ExtValue, JsonPath, PathSegment};
use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use serde_json::{Map, Value};
use tracing::debug;

/// Traversal state for one decode call.
pub struct DecodeContext<'a> {
    registry: &'a TypeRegistry,
    strict: bool,
    max_depth: usize,
    path: JsonPath,
}

impl<'a> DecodeContext<'a> {
    pub(crate) fn new(registry: &'a TypeRegistry, strict: bool, max_depth: usize) -> Self {
        Self {
            registry,
            strict,
            max_depth,
            path: JsonPath::root(),
        }
    }

    /// Location of the node being decoded.
    #[must_use]
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Decodes a child of the current node, one level deeper.
    pub fn decode_child(&mut self, segment: impl Into<PathSegment>, json: &Value) -> Result<ExtValue> {
        self.path.push(segment);
        let result = self.decode(json);
        self.path.pop();
        result
    }

    /// Decodes every entry of `map` as a plain object, keeping all keys.
    pub fn decode_object(&mut self, map: &Map<String, Value>) -> Result<ExtValue> {
        let mut out = IndexMap::with_capacity(map.len());
        for (key, item) in map {
            let decoded = self.decode_child(key.as_str(), item)?;
            out.insert(key.clone(), decoded);
        }
        Ok(ExtValue::Object(out))
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

    pub(crate) fn decode(&mut self, json: &Value) -> Result<ExtValue> {
        if self.path.len() > self.max_depth {
            return Err(ConvertError::MaxDepthExceeded {
                limit: self.max_depth,
                path: self.path.clone(),
            });
        }

        match json {
            Value::Null => Ok(ExtValue::Null),
            Value::Bool(b) => Ok(ExtValue::Bool(*b)),
            Value::Number(n) => Ok(ExtValue::Number(n.clone())),
            Value::String(s) => Ok(ExtValue::String(s.clone())),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    out.push(self.decode_child(index, item)?);
                }
                Ok(ExtValue::Array(out))
            }
            Value::Object(map) => self.decode_map(map),
        }
    }

    /// Decodes an object, dispatching on its discriminator if it has one.
    pub(crate) fn decode_map(&mut self, map: &Map<String, Value>) -> Result<ExtValue> {
        let Some(tag) = map.get(TYPE_KEY) else {
            return self.decode_object(map);
        };

        let codec = match tag {
            Value::String(kind) => self.registry.lookup(kind),
            _ => None,
        };
        if let Some(codec) = codec {
            return codec.decode(map, self);
        }

        let kind = match tag {
            Value::String(kind) => kind.clone(),
            other => other.to_string(),
        };
        if self.strict {
            return Err(ConvertError::UnknownType {
                kind,
                path: self.path.clone(),
            });
        }
        debug!("Passing through unknown type tag {kind} at {}", self.path);
        self.decode_object(map)
    }
}

/// Parses JSON text, mapping syntax errors to `MalformedJson`.
///
/// The parser's own recursion limit is lifted; nesting is bounded by
/// `max_depth` instead, checked before parsing starts.
pub(crate) fn parse(text: &str, max_depth: usize) -> Result<Value> {
    check_nesting(text, max_depth)?;
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de).map_err(|e| ConvertError::malformed(&e))?;
    de.end().map_err(|e| ConvertError::malformed(&e))?;
    Ok(value)
}

/// Bracket scan over raw text. Fails once containers nest deeper than a
/// decode with `max_depth` could accept.
fn check_nesting(text: &str, max_depth: usize) -> Result<()> {
    // The outermost container's children sit at depth one.
    let limit = max_depth.saturating_add(1);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > limit {
                    return Err(ConvertError::MaxDepthExceeded {
                        limit: max_depth,
                        path: JsonPath::root(),
                    });
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

fn deserialize<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| match e.classify() {
        Category::Syntax | Category::Eof => ConvertError::malformed(&e),
        Category::Data => ConvertError::TypeCoercion {
            expected: std::any::type_name::<T>().to_owned(),
            found: "json".to_owned(),
            message: e.to_string(),
        },
        Category::Io => ConvertError::Serialization(e),
    })
}

impl Converter<'_> {
    /// Decodes JSON text, rebuilding every recognized tagged value.
    ///
    /// Fails with `MalformedJson`, `MaxDepthExceeded`, `UnknownType`
    /// (strict mode) or `TypeCoercion` (when `target_kind` is set and
    /// cannot be met).
    pub fn decode(&self, text: &str, options: &DecodeOptions) -> Result<ExtValue> {
        let json = parse(text, options.max_depth)?;
        self.from_json_value(&json, options)
    }

    /// Deserializes JSON text straight into a serde type.
    ///
    /// No type tags are interpreted. Syntax errors give `MalformedJson`;
    /// input that parses but does not fit `T` gives `TypeCoercion`.
    pub fn decode_into<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        deserialize(text)
    }

    /// Decodes an already parsed JSON tree.
    pub fn from_json_value(&self, json: &Value, options: &DecodeOptions) -> Result<ExtValue> {
        let mut cx = DecodeContext::new(self.registry(), options.strict, options.max_depth);
        match &options.target_kind {
            None => cx.decode(json),
            Some(KindHint::Kind(name)) => self.decode_as_kind(json, name, &mut cx),
            Some(hint) => {
                let value = cx.decode(json)?;
                check_shape(value, hint)
            }
        }
    }

    /// Decodes `json` and forces the top level into the registered kind
    /// `name`.
    ///
    /// Untagged input is fed to the kind's decode rule: an object as a
    /// tagged body, anything else as the envelope payload.
    fn decode_as_kind(&self, json: &Value, name: &str, cx: &mut DecodeContext<'_>) -> Result<ExtValue> {
        let coercion = |found: &str, message: String| ConvertError::TypeCoercion {
            expected: name.to_owned(),
            found: found.to_owned(),
            message,
        };

        let Some(codec) = self.registry().lookup(name) else {
            return Err(coercion(json_kind(json), "kind is not registered".to_owned()));
        };

        let already_tagged = json.as_object().is_some_and(|map| map.contains_key(TYPE_KEY));
        let value = if already_tagged {
            cx.decode(json)?
        } else {
            let tagged = match json {
                Value::Object(map) => {
                    let mut map = map.clone();
                    map.insert(TYPE_KEY.to_owned(), Value::String(name.to_owned()));
                    map
                }
                other => kinds::envelope_map(name, other.clone()),
            };
            codec.decode(&tagged, cx).map_err(|e| match e {
                ConvertError::InvalidTaggedValue { message, .. } => coercion(json_kind(json), message),
                other => other,
            })?
        };

        if codec.matches(&value) {
            Ok(value)
        } else {
            Err(coercion(
                value.kind_name(),
                format!("decoded value is not a `{name}`"),
            ))
        }
    }
}

fn check_shape(value: ExtValue, hint: &KindHint) -> Result<ExtValue> {
    let ok = match hint {
        KindHint::Null => value.is_null(),
        KindHint::Bool => matches!(value, ExtValue::Bool(_)),
        KindHint::Number => matches!(value, ExtValue::Number(_)),
        KindHint::String => matches!(value, ExtValue::String(_)),
        KindHint::Array => matches!(value, ExtValue::Array(_)),
        KindHint::Object => matches!(value, ExtValue::Object(_)),
        KindHint::Kind(_) => true,
    };
    if ok {
        Ok(value)
    } else {
        Err(ConvertError::TypeCoercion {
            expected: hint.to_string(),
            found: value.kind_name().to_owned(),
            message: "top-level value has the wrong shape".to_owned(),
        })
    }
}

fn json_kind(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
