//! Core value model for extjson.
//!
//! This crate defines the in-memory side of the converter:
//! - [`ExtValue`], the value tree the encoder walks and the decoder rebuilds
//! - [`ValueSet`] and [`Record`], the collection and object kinds
//! - [`SharedValue`], the only node type that can alias or form cycles
//! - [`SelfSerialize`], the contract for values that render their own JSON
//! - [`JsonPath`], the breadcrumb attached to conversion errors
//!
//! Nothing here knows about type tags or the registry; that lives in
//! `extjson-codec`.

mod duration;
mod path;
mod record;
mod set;
mod shared;
mod value;

pub use duration::{format_duration, parse_duration};
pub use path::{JsonPath, PathSegment};
pub use record::{Record, SelfSerialize};
pub use set::ValueSet;
pub use shared::SharedValue;
pub use value::ExtValue;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
}
