//! Field validators.
//!
//! Each rule is a stateless check on a `serde_json::Value` that either
//! passes or returns a [`ValidationError`] naming the offending field.
//! Rules can be called one by one from [`rules`] or combined as a list of
//! [`Constraint`]s passed to [`validate`], where the first failure wins.
//!
//! Constraints deserialize from JSON, tagged by `"rule"`:
//!
//! ```text
//! [{"rule": "not_empty"}, {"rule": "length", "max": 64}, {"rule": "email"}]
//! ```

pub mod rules;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// A failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", render(.field.as_deref(), .message))]
pub struct ValidationError {
    pub message: String,
    pub field: Option<String>,
    /// Extra context. Always holds the name of the failing rule under `"rule"`.
    pub details: Map<String, Value>,
}

impl ValidationError {
    pub fn new(rule: &str, message: impl Into<String>, field: Option<&str>) -> Self {
        let mut details = Map::new();
        details.insert("rule".to_owned(), Value::String(rule.to_owned()));
        Self {
            message: message.into(),
            field: field.map(str::to_owned),
            details,
        }
    }

    /// Adds an entry to [`details`](Self::details).
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

fn render(field: Option<&str>, message: &str) -> String {
    match field {
        Some(field) => format!("Field '{field}': {message}"),
        None => message.to_owned(),
    }
}

/// JSON value shapes accepted by [`Constraint::Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonType {
    Null,
    Bool,
    /// Any number, integer or float.
    Number,
    /// A number with no fractional part stored as an integer.
    Integer,
    String,
    Array,
    Object,
}

impl JsonType {
    /// The shape of `value`. Integers report as [`JsonType::Integer`].
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Returns true if `value` has this shape.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Number => value.is_number(),
            other => Self::of(value) == other,
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        })
    }
}

fn yes() -> bool {
    true
}

/// One validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Constraint {
    /// Value has one of the listed shapes.
    Type { types: Vec<JsonType> },
    /// Number within inclusive bounds.
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    /// String, array or object size within inclusive bounds.
    Length {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
    },
    /// String matches the regex at its start.
    Pattern { pattern: String },
    Email,
    Url {
        #[serde(default)]
        require_https: bool,
    },
    Ip {
        #[serde(default = "yes")]
        allow_v4: bool,
        #[serde(default = "yes")]
        allow_v6: bool,
    },
    Uuid {
        #[serde(default)]
        version: Option<usize>,
    },
    /// String parses as JSON.
    Json,
    NotEmpty,
    OneOf { options: Vec<Value> },
}

impl Constraint {
    /// Checks `value` against this rule.
    pub fn check(&self, value: &Value, field: Option<&str>) -> Result<()> {
        match self {
            Self::Type { types } => rules::validate_type(value, types, field),
            Self::Range { min, max } => rules::validate_range(value, *min, *max, field),
            Self::Length { min, max } => rules::validate_length(value, *min, *max, field),
            Self::Pattern { pattern } => rules::validate_pattern(value, pattern, field),
            Self::Email => rules::validate_email(value, field),
            Self::Url { require_https } => rules::validate_url(value, *require_https, field),
            Self::Ip { allow_v4, allow_v6 } => rules::validate_ip(value, *allow_v4, *allow_v6, field),
            Self::Uuid { version } => rules::validate_uuid(value, *version, field),
            Self::Json => rules::validate_json(value, field),
            Self::NotEmpty => rules::validate_not_empty(value, field),
            Self::OneOf { options } => rules::validate_one_of(value, options, field),
        }
    }
}

/// Checks `value` against every constraint in order and returns the first
/// failure.
pub fn validate(value: &Value, constraints: &[Constraint], field: Option<&str>) -> Result<()> {
    constraints.iter().try_for_each(|c| c.check(value, field))
}
