//! Extended JSON converter.
//!
//! Encodes [`ExtValue`] trees to JSON text and decodes them back, tagging
//! the kinds plain JSON cannot hold (date-times, UUIDs, decimals, sets,
//! records) as objects carrying the reserved [`TYPE_KEY`] discriminator:
//!
//! ```text
//! {"__type__": "uuid", "value": "6f1c..."}
//! {"__type__": "point", "x": 1, "y": 2}
//! ```
//!
//! Which kinds are tagged, and how, is decided by a [`TypeRegistry`]. The
//! free functions in this crate use the process-wide registry; build a
//! [`Converter`] over your own registry to use a different set of kinds.
//!
//! Also provided: a deep [`merge`] for value trees and JSON documents, and
//! file adapters.

mod converter;
mod decode;
mod encode;
mod error;
mod file;
mod format;
mod kinds;
mod merge;
mod options;
mod registry;

use std::path::Path;

pub use converter::Converter;
pub use decode::DecodeContext;
pub use encode::EncodeContext;
pub use error::{ConvertError, Result};
pub use extjson_types::ExtValue;
pub use kinds::{
    DateKind, DateTimeKind, DecimalKind, DurationKind, RecordKind, SelfSerializingKind, SetKind, TimeKind,
    UuidKind,
};
pub use merge::{merge, merge_json, merge_str};
pub use options::{DEFAULT_MAX_DEPTH, DecodeOptions, EncodeOptions, KindHint};
pub use registry::{KindCodec, TYPE_KEY, TypeRegistry, VALUE_KEY, global_registry, install_global_registry};

/// Encodes `value` with the global registry.
pub fn encode(value: &ExtValue, options: &EncodeOptions) -> Result<String> {
    Converter::global().encode(value, options)
}

/// Decodes `text` with the global registry.
pub fn decode(text: &str, options: &DecodeOptions) -> Result<ExtValue> {
    Converter::global().decode(text, options)
}

/// Deserializes `text` into `T` without interpreting type tags.
pub fn decode_into<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
    Converter::global().decode_into(text)
}

/// Encodes `value` with the global registry and writes it to `path`.
pub fn write_to_file(value: &ExtValue, path: impl AsRef<Path>, options: &EncodeOptions) -> Result<()> {
    Converter::global().write_to_file(value, path, options)
}

/// Reads `path` and decodes it with the global registry.
pub fn read_from_file(path: impl AsRef<Path>, options: &DecodeOptions) -> Result<ExtValue> {
    Converter::global().read_from_file(path, options)
}
