//! Built-in kind codecs.

use crate::decode::DecodeContext;
use crate::encode::EncodeContext;
use crate::error::Result;
use crate::registry::{KindCodec, TYPE_KEY, VALUE_KEY};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use extjson_types::{ExtValue, Record, ValueSet, format_duration, parse_duration};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

/// Wraps `payload` as `{"__type__": kind, "value": payload}`.
pub(crate) fn envelope(kind: &str, payload: Value) -> Value {
    Value::Object(envelope_map(kind, payload))
}

pub(crate) fn envelope_map(kind: &str, payload: Value) -> Map<String, Value> {
    let mut map = Map::with_capacity(2);
    map.insert(TYPE_KEY.to_owned(), Value::String(kind.to_owned()));
    map.insert(VALUE_KEY.to_owned(), payload);
    map
}

/// The envelope payload of a tagged object.
pub(crate) fn payload<'m>(
    kind: &str,
    tagged: &'m Map<String, Value>,
    cx: &DecodeContext<'_>,
) -> Result<&'m Value> {
    tagged
        .get(VALUE_KEY)
        .ok_or_else(|| cx.invalid_value(kind, format!("missing `{VALUE_KEY}` field")))
}

fn payload_str<'m>(
    kind: &str,
    tagged: &'m Map<String, Value>,
    cx: &DecodeContext<'_>,
) -> Result<&'m str> {
    payload(kind, tagged, cx)?
        .as_str()
        .ok_or_else(|| cx.invalid_value(kind, "expected a string payload"))
}

/// `datetime`: offset-aware and naive date-times.
pub struct DateTimeKind;

impl KindCodec for DateTimeKind {
    fn kind(&self) -> &str {
        "datetime"
    }

    fn matches(&self, value: &ExtValue) -> bool {
        matches!(value, ExtValue::DateTime(_) | ExtValue::NaiveDateTime(_))
    }

    fn encode(&self, value: &ExtValue, cx: &mut EncodeContext<'_>) -> Result<Value> {
        let text = match value {
            ExtValue::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            ExtValue::NaiveDateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            other => return Err(cx.invalid_value(self.kind(), format!("not a datetime: {}", other.kind_name()))),
        };
        Ok(envelope(self.kind(), Value::String(text)))
    }

    fn decode(&self, tagged: &Map<String, Value>, cx: &mut DecodeContext<'_>) -> Result<ExtValue> {
        let text = payload_str(self.kind(), tagged, cx)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(ExtValue::DateTime(dt));
        }
        text.parse::<NaiveDateTime>()
            .map(ExtValue::NaiveDateTime)
            .map_err(|e| cx.invalid_value(self.kind(), e.to_string()))
    }
}

/// `date`: calendar dates as `YYYY-MM-DD`.
pub struct DateKind;

impl KindCodec for DateKind {
    fn kind(&self) -> &str {
        "date"
    }

    fn matches(&self, value: &ExtValue) -> bool {
        matches!(value, ExtValue::Date(_))
    }

    fn encode(&self, value: &ExtValue, cx: &mut EncodeContext<'_>) -> Result<Value> {
        match value {
            ExtValue::Date(date) => Ok(envelope(self.kind(), Value::String(date.to_string()))),
            other => Err(cx.invalid_value(self.kind(), format!("not a date: {}", other.kind_name()))),
        }
    }

    fn decode(&self, tagged: &Map<String, Value>, cx: &mut DecodeContext<'_>) -> Result<ExtValue> {
        payload_str(self.kind(), tagged, cx)?
            .parse::<NaiveDate>()
            .map(ExtValue::Date)
            .map_err(|e| cx.invalid_value(self.kind(), e.to_string()))
    }
}

/// `time`: wall-clock times as `HH:MM:SS[.fraction]`.
pub struct TimeKind;

impl KindCodec for TimeKind {
    fn kind(&self) -> &str {
        "time"
    }

    fn matches(&self, value: &ExtValue) -> bool {
        matches!(value, ExtValue::Time(_))
    }

    fn encode(&self, value: &ExtValue, cx: &mut EncodeContext<'_>) -> Result<Value> {
        match value {
            ExtValue::Time(time) => Ok(envelope(self.kind(), Value::String(time.to_string()))),
            other => Err(cx.invalid_value(self.kind(), format!("not a time: {}", other.kind_name()))),
        }
    }

    fn decode(&self, tagged: &Map<String, Value>, cx: &mut DecodeContext<'_>) -> Result<ExtValue> {
        payload_str(self.kind(), tagged, cx)?
            .parse::<NaiveTime>()
            .map(ExtValue::Time)
            .map_err(|e| cx.invalid_value(self.kind(), e.to_string()))
    }
}

/// `duration`: signed spans as `[-]PT<seconds>[.<fraction>]S`.
pub struct DurationKind;

impl KindCodec for DurationKind {
    fn kind(&self) -> &str {
        "duration"
    }

    fn matches(&self, value: &ExtValue) -> bool {
        matches!(value, ExtValue::Duration(_))
    }

    fn encode(&self, value: &ExtValue, cx: &mut EncodeContext<'_>) -> Result<Value> {
        match value {
            ExtValue::Duration(d) => Ok(envelope(self.kind(), Value::String(format_duration(d)))),
            other => Err(cx.invalid_value(self.kind(), format!("not a duration: {}", other.kind_name()))),
        }
    }

    fn decode(&self, tagged: &Map<String, Value>, cx: &mut DecodeContext<'_>) -> Result<ExtValue> {
        parse_duration(payload_str(self.kind(), tagged, cx)?)
            .map(ExtValue::Duration)
            .map_err(|e| cx.invalid_value(self.kind(), e.to_string()))
    }
}

/// `uuid`: lowercase hyphenated identifiers.
pub struct UuidKind;

impl KindCodec for UuidKind {
    fn kind(&self) -> &str {
        "uuid"
    }

    fn matches(&self, value: &ExtValue) -> bool {
        matches!(value, ExtValue::Uuid(_))
    }

    fn encode(&self, value: &ExtValue, cx: &mut EncodeContext<'_>) -> Result<Value> {
        match value {
            ExtValue::Uuid(id) => Ok(envelope(self.kind(), Value::String(id.to_string()))),
            other => Err(cx.invalid_value(self.kind(), format!("not a uuid: {}", other.kind_name()))),
        }
    }

    fn decode(&self, tagged: &Map<String, Value>, cx: &mut DecodeContext<'_>) -> Result<ExtValue> {
        Uuid::parse_str(payload_str(self.kind(), tagged, cx)?)
            .map(ExtValue::Uuid)
            .map_err(|e| cx.invalid_value(self.kind(), e.to_string()))
    }
}

/// `decimal`: written as a JSON float, so precision beyond `f64` is lost.
pub struct DecimalKind;

impl KindCodec for DecimalKind {
    fn kind(&self) -> &str {
        "decimal"
    }

    fn matches(&self, value: &ExtValue) -> bool {
        matches!(value, ExtValue::Decimal(_))
    }

    fn encode(&self, value: &ExtValue, cx: &mut EncodeContext<'_>) -> Result<Value> {
        let ExtValue::Decimal(d) = value else {
            return Err(cx.invalid_value(self.kind(), format!("not a decimal: {}", value.kind_name())));
        };
        let number = d
            .to_f64()
            .and_then(Number::from_f64)
            .ok_or_else(|| cx.invalid_value(self.kind(), format!("{d} has no finite float form")))?;
        Ok(envelope(self.kind(), Value::Number(number)))
    }

    fn decode(&self, tagged: &Map<String, Value>, cx: &mut DecodeContext<'_>) -> Result<ExtValue> {
        let float = payload(self.kind(), tagged, cx)?
            .as_f64()
            .ok_or_else(|| cx.invalid_value(self.kind(), "expected a number payload"))?;
        Decimal::from_f64(float)
            .map(ExtValue::Decimal)
            .ok_or_else(|| cx.invalid_value(self.kind(), format!("{float} is out of decimal range")))
    }
}

/// `set`: members become a JSON array in iteration order.
pub struct SetKind;

impl KindCodec for SetKind {
    fn kind(&self) -> &str {
        "set"
    }

    fn matches(&self, value: &ExtValue) -> bool {
        matches!(value, ExtValue::Set(_))
    }

    fn encode(&self, value: &ExtValue, cx: &mut EncodeContext<'_>) -> Result<Value> {
        let ExtValue::Set(set) = value else {
            return Err(cx.invalid_value(self.kind(), format!("not a set: {}", value.kind_name())));
        };
        let mut members = Vec::with_capacity(set.len());
        for (index, member) in set.iter().enumerate() {
            members.push(cx.encode_child(index, member)?);
        }
        Ok(envelope(self.kind(), Value::Array(members)))
    }

    fn decode(&self, tagged: &Map<String, Value>, cx: &mut DecodeContext<'_>) -> Result<ExtValue> {
        let Some(items) = payload(self.kind(), tagged, cx)?.as_array() else {
            return Err(cx.invalid_value(self.kind(), "expected an array payload"));
        };
        let mut set = ValueSet::new();
        for (index, item) in items.iter().enumerate() {
            set.insert(cx.decode_child(index, item)?);
        }
        Ok(ExtValue::Set(set))
    }
}

/// `self_serializing`: emits the value's own JSON, untagged. Write-only.
pub struct SelfSerializingKind;

impl KindCodec for SelfSerializingKind {
    fn kind(&self) -> &str {
        "self_serializing"
    }

    fn matches(&self, value: &ExtValue) -> bool {
        matches!(value, ExtValue::Custom(_))
    }

    fn encode(&self, value: &ExtValue, cx: &mut EncodeContext<'_>) -> Result<Value> {
        match value {
            ExtValue::Custom(custom) => Ok(custom.to_json()),
            other => Err(cx.invalid_value(self.kind(), format!("not self-serializing: {}", other.kind_name()))),
        }
    }
}

/// Kind id of the catch-all record codec.
const RECORD: &str = "record";

/// Records, encoded inline under their own kind name.
///
/// [`RecordKind::any`] encodes every record but decodes nothing, so
/// unregistered record names come back as plain mappings.
/// [`RecordKind::named`] also decodes objects tagged with its name back
/// into a [`Record`].
///
/// A record whose name is taken by a non-record kind (`date`, `uuid`, ...)
/// is rejected on encode, since its tag would decode as that kind.
pub struct RecordKind {
    name: Option<String>,
}

impl RecordKind {
    /// Encoder for every record, registered under `record`.
    #[must_use]
    pub fn any() -> Self {
        Self { name: None }
    }

    /// Encoder and decoder for records of kind `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

impl KindCodec for RecordKind {
    fn kind(&self) -> &str {
        self.name.as_deref().unwrap_or(RECORD)
    }

    fn matches(&self, value: &ExtValue) -> bool {
        match (value, &self.name) {
            (ExtValue::Record(_), None) => true,
            // Registered under the catch-all id it takes over every record.
            (ExtValue::Record(record), Some(name)) => name == RECORD || record.kind() == name,
            _ => false,
        }
    }

    fn encode(&self, value: &ExtValue, cx: &mut EncodeContext<'_>) -> Result<Value> {
        let ExtValue::Record(record) = value else {
            return Err(cx.invalid_value(self.kind(), format!("not a record: {}", value.kind_name())));
        };
        if let Some(owner) = cx.registry().lookup(record.kind())
            && !owner.matches(value)
        {
            return Err(cx.invalid_value(
                record.kind(),
                format!("record kind `{}` is registered as a different kind", record.kind()),
            ));
        }
        let mut map = Map::with_capacity(record.fields().len() + 1);
        map.insert(TYPE_KEY.to_owned(), Value::String(record.kind().to_owned()));
        for (field, item) in record.fields() {
            if field == TYPE_KEY {
                return Err(cx.invalid_value(record.kind(), format!("field name `{TYPE_KEY}` is reserved")));
            }
            let encoded = cx.encode_child(field.as_str(), item)?;
            map.insert(field.clone(), encoded);
        }
        Ok(Value::Object(map))
    }

    fn decode(&self, tagged: &Map<String, Value>, cx: &mut DecodeContext<'_>) -> Result<ExtValue> {
        if self.name.is_none() {
            return cx.decode_object(tagged);
        }
        let mut record = Record::new(self.kind());
        for (field, item) in tagged {
            if field == TYPE_KEY {
                continue;
            }
            let decoded = cx.decode_child(field.as_str(), item)?;
            record.insert(field.clone(), decoded);
        }
        Ok(ExtValue::Record(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_puts_discriminator_first() {
        let text = envelope("uuid", json!("x")).to_string();
        assert_eq!(text, r#"{"__type__":"uuid","value":"x"}"#);
    }

    #[test]
    fn record_kind_names() {
        assert_eq!(RecordKind::any().kind(), "record");
        assert_eq!(RecordKind::named("point").kind(), "point");
    }

    #[test]
    fn named_record_kind_only_matches_its_name() {
        let codec = RecordKind::named("point");
        assert!(codec.matches(&Record::new("point").into()));
        assert!(!codec.matches(&Record::new("line").into()));
        assert!(RecordKind::any().matches(&Record::new("line").into()));
    }

    #[test]
    fn named_catch_all_id_matches_every_record() {
        let codec = RecordKind::named("record");
        assert!(codec.matches(&Record::new("record").into()));
        assert!(codec.matches(&Record::new("line").into()));
    }
}
