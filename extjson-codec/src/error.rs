//! Error types for conversion, merge and file access.

use extjson_types::JsonPath;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for converter operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while encoding, decoding or merging.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No registered kind matches and the value is not plain JSON.
    #[error("unsupported type `{kind}` at {path}")]
    UnsupportedType { kind: String, path: JsonPath },

    /// A shared node was reached again while it was still being encoded.
    #[error("cyclic reference at {path}")]
    CyclicReference { path: JsonPath },

    /// Nesting went past the configured limit.
    #[error("maximum depth of {limit} exceeded at {path}")]
    MaxDepthExceeded { limit: usize, path: JsonPath },

    /// Input text is not valid JSON.
    #[error("malformed JSON at line {line}, column {column}: {message}")]
    MalformedJson {
        line: usize,
        column: usize,
        message: String,
    },

    /// Strict decode met a discriminator with no registered kind.
    #[error("unknown type tag `{kind}` at {path}")]
    UnknownType { kind: String, path: JsonPath },

    /// A kind codec rejected a value or a tagged payload.
    #[error("invalid `{kind}` value at {path}: {message}")]
    InvalidTaggedValue {
        kind: String,
        path: JsonPath,
        message: String,
    },

    /// The decoded value does not fit the requested target kind.
    #[error("cannot coerce {found} into {expected}: {message}")]
    TypeCoercion {
        expected: String,
        found: String,
        message: String,
    },

    /// A merge argument cannot be treated as a JSON tree.
    #[error("invalid merge input at {path}: {reason}")]
    InvalidMergeInput { path: JsonPath, reason: String },

    /// Reading or writing a file failed.
    #[error("cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `install_global_registry` was called after the registry was set.
    #[error("global type registry is already installed")]
    RegistryAlreadyInstalled,

    /// Rendering JSON text failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConvertError {
    /// Builds a `MalformedJson` error from a parser error.
    pub(crate) fn malformed(err: &serde_json::Error) -> Self {
        Self::MalformedJson {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }

    /// The location inside the value tree, when the error has one.
    #[must_use]
    pub fn path(&self) -> Option<&JsonPath> {
        match self {
            Self::UnsupportedType { path, .. }
            | Self::CyclicReference { path }
            | Self::MaxDepthExceeded { path, .. }
            | Self::UnknownType { path, .. }
            | Self::InvalidTaggedValue { path, .. }
            | Self::InvalidMergeInput { path, .. } => Some(path),
            _ => None,
        }
    }
}
