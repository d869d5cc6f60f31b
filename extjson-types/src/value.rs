//! The extended value tree.

use crate::{Record, SelfSerialize, SharedValue, ValueSet};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use std::sync::Arc;
use uuid::Uuid;

/// An in-memory value that may hold kinds plain JSON cannot express.
///
/// The first six variants mirror `serde_json::Value`. The rest are the
/// extended kinds the converter knows how to tag, plus [`SharedValue`] for
/// aliased or cyclic graphs.
///
/// Equality is structural: objects and sets ignore order, custom values
/// compare by their rendered JSON, and shared nodes compare by content.
/// Comparing two distinct cyclic graphs does not terminate.
#[derive(Debug, Clone, Default)]
pub enum ExtValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<ExtValue>),
    Object(IndexMap<String, ExtValue>),
    /// Date-time with a UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// Date-time without offset information.
    NaiveDateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Duration(TimeDelta),
    Uuid(Uuid),
    Decimal(Decimal),
    Set(ValueSet),
    Record(Record),
    Custom(Arc<dyn SelfSerialize>),
    Shared(SharedValue),
}

impl ExtValue {
    /// Builds an object from key/value pairs, keeping their order.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ExtValue)>,
    {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds an array from any iterator of values.
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator<Item = ExtValue>,
    {
        Self::Array(items.into_iter().collect())
    }

    /// Wraps a self-serializing value.
    pub fn custom<T: SelfSerialize + 'static>(value: T) -> Self {
        Self::Custom(Arc::new(value))
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::DateTime(_) | Self::NaiveDateTime(_) => "datetime",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Duration(_) => "duration",
            Self::Uuid(_) => "uuid",
            Self::Decimal(_) => "decimal",
            Self::Set(_) => "set",
            Self::Record(_) => "record",
            Self::Custom(_) => "custom",
            Self::Shared(_) => "shared",
        }
    }

    /// Returns true for null, booleans, numbers and strings.
    #[must_use]
    pub fn is_json_primitive(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_)
        )
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<ExtValue>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&IndexMap<String, ExtValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_set(&self) -> Option<&ValueSet> {
        match self {
            Self::Set(set) => Some(set),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Looks up `key` when this value is an object.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ExtValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Converts a plain JSON tree without interpreting any type tags.
    #[must_use]
    pub fn from_json(json: &Value) -> Self {
        match json {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts back to plain JSON when the tree only holds JSON kinds.
    ///
    /// Returns `None` as soon as an extended kind is found. Shared nodes are
    /// followed, so this must not be called on a cyclic graph.
    #[must_use]
    pub fn to_plain_json(&self) -> Option<Value> {
        match self {
            Self::Null => Some(Value::Null),
            Self::Bool(b) => Some(Value::Bool(*b)),
            Self::Number(n) => Some(Value::Number(n.clone())),
            Self::String(s) => Some(Value::String(s.clone())),
            Self::Array(items) => items
                .iter()
                .map(Self::to_plain_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Self::Object(map) => map
                .iter()
                .map(|(k, v)| v.to_plain_json().map(|v| (k.clone(), v)))
                .collect::<Option<serde_json::Map<_, _>>>()
                .map(Value::Object),
            Self::Shared(shared) => shared.with(Self::to_plain_json),
            _ => None,
        }
    }
}

impl PartialEq for ExtValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Shared(a), Self::Shared(b)) if a.ptr_eq(b) => true,
            (Self::Shared(a), b) => a.get() == *b,
            (a, Self::Shared(b)) => *a == b.get(),
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b && a.offset() == b.offset(),
            (Self::NaiveDateTime(a), Self::NaiveDateTime(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => {
                Arc::ptr_eq(a, b) || (a.type_name() == b.type_name() && a.to_json() == b.to_json())
            }
            _ => false,
        }
    }
}

impl From<Value> for ExtValue {
    fn from(json: Value) -> Self {
        Self::from_json(&json)
    }
}

impl From<bool> for ExtValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ExtValue {
                fn from(n: $t) -> Self {
                    Self::Number(Number::from(n))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<f64> for ExtValue {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(f: f64) -> Self {
        Number::from_f64(f).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for ExtValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for ExtValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<ExtValue>> for ExtValue {
    fn from(items: Vec<ExtValue>) -> Self {
        Self::Array(items)
    }
}

impl From<IndexMap<String, ExtValue>> for ExtValue {
    fn from(map: IndexMap<String, ExtValue>) -> Self {
        Self::Object(map)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for ExtValue {
    fn from(dt: DateTime<Tz>) -> Self {
        Self::DateTime(dt.fixed_offset())
    }
}

impl From<NaiveDateTime> for ExtValue {
    fn from(dt: NaiveDateTime) -> Self {
        Self::NaiveDateTime(dt)
    }
}

impl From<NaiveDate> for ExtValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveTime> for ExtValue {
    fn from(t: NaiveTime) -> Self {
        Self::Time(t)
    }
}

impl From<TimeDelta> for ExtValue {
    fn from(d: TimeDelta) -> Self {
        Self::Duration(d)
    }
}

impl From<Uuid> for ExtValue {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl From<Decimal> for ExtValue {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<ValueSet> for ExtValue {
    fn from(set: ValueSet) -> Self {
        Self::Set(set)
    }
}

impl From<Record> for ExtValue {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<SharedValue> for ExtValue {
    fn from(shared: SharedValue) -> Self {
        Self::Shared(shared)
    }
}

impl FromIterator<ExtValue> for ExtValue {
    fn from_iter<I: IntoIterator<Item = ExtValue>>(iter: I) -> Self {
        Self::Array(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, ExtValue)> for ExtValue {
    fn from_iter<I: IntoIterator<Item = (K, ExtValue)>>(iter: I) -> Self {
        Self::object(iter)
    }
}
