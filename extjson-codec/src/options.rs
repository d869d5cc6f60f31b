//! Encode and decode options.
//!
//! Both structs deserialize with every field optional, so they can be read
//! straight from a JSON config document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default nesting limit for encode and decode.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// How [`crate::Converter::encode`] renders text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Indent with two spaces.
    pub pretty: bool,
    /// Escape every non-ASCII character as `\uXXXX`.
    pub ensure_ascii: bool,
    /// Sort object keys. Affects the text only.
    pub sort_keys: bool,
    /// Deepest path, counted in nesting levels, the encoder will walk.
    pub max_depth: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            ensure_ascii: true,
            sort_keys: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EncodeOptions {
    /// Defaults used for files: like [`Default`] but indented.
    #[must_use]
    pub fn for_file() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[must_use]
    pub fn with_ensure_ascii(mut self, ensure_ascii: bool) -> Self {
        self.ensure_ascii = ensure_ascii;
        self
    }

    #[must_use]
    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Shape the top-level decoded value must have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindHint {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
    /// A registered kind id, e.g. `"datetime"` or a record kind name.
    Kind(String),
}

impl KindHint {
    /// Shorthand for [`KindHint::Kind`].
    pub fn kind(name: impl Into<String>) -> Self {
        Self::Kind(name.into())
    }
}

impl fmt::Display for KindHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool => f.write_str("bool"),
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
            Self::Array => f.write_str("array"),
            Self::Object => f.write_str("object"),
            Self::Kind(name) => f.write_str(name),
        }
    }
}

/// How [`crate::Converter::decode`] rebuilds values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Required shape or registered kind of the top-level result.
    pub target_kind: Option<KindHint>,
    /// Fail on unknown discriminators instead of passing them through.
    pub strict: bool,
    /// Deepest path the decoder accepts. Also bounds parser nesting.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            target_kind: None,
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    /// Defaults with strict mode on.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn with_target_kind(mut self, hint: KindHint) -> Self {
        self.target_kind = Some(hint);
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
