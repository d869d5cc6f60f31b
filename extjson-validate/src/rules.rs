//! One function per validation rule.
//!
//! Every function takes the value, the rule's parameters and an optional
//! field name used in the error message.

use crate::{JsonType, Result, ValidationError};
use regex_lite::Regex;
use serde_json::Value;
use std::net::IpAddr;
use std::sync::OnceLock;
use uuid::Uuid;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
const URL_PATTERN: &str =
    r"^https?://[a-zA-Z0-9][-a-zA-Z0-9.]*\.[a-zA-Z]{2,}(/[-a-zA-Z0-9%_.~#+]*)*(\?[-a-zA-Z0-9%_.~+=&;]*)*$";

fn matches_builtin(cell: &'static OnceLock<Option<Regex>>, pattern: &str, text: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(text))
}

fn is_email(text: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    matches_builtin(&RE, EMAIL_PATTERN, text)
}

fn is_url(text: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    matches_builtin(&RE, URL_PATTERN, text)
}

fn type_name(value: &Value) -> JsonType {
    JsonType::of(value)
}

fn expect_str<'v>(rule: &str, value: &'v Value, field: Option<&str>) -> Result<&'v str> {
    value.as_str().ok_or_else(|| {
        ValidationError::new(rule, format!("Expected string, got {}", type_name(value)), field)
    })
}

/// Value has one of `types`.
pub fn validate_type(value: &Value, types: &[JsonType], field: Option<&str>) -> Result<()> {
    if types.iter().any(|t| t.accepts(value)) {
        return Ok(());
    }
    let expected: Vec<String> = types.iter().map(ToString::to_string).collect();
    Err(ValidationError::new(
        "type",
        format!("Expected {}, got {}", expected.join(" or "), type_name(value)),
        field,
    ))
}

/// Number within `[min, max]`. Either bound may be omitted.
pub fn validate_range(value: &Value, min: Option<f64>, max: Option<f64>, field: Option<&str>) -> Result<()> {
    let Some(number) = value.as_f64() else {
        return Err(ValidationError::new(
            "range",
            format!("Expected numeric value, got {}", type_name(value)),
            field,
        ));
    };
    if let Some(min) = min.filter(|min| number < *min) {
        return Err(ValidationError::new("range", format!("Value must be at least {min}"), field).with_detail("min", min));
    }
    if let Some(max) = max.filter(|max| number > *max) {
        return Err(ValidationError::new("range", format!("Value must be at most {max}"), field).with_detail("max", max));
    }
    Ok(())
}

/// Size within `[min, max]`: characters for strings, entries for arrays and
/// objects.
pub fn validate_length(value: &Value, min: Option<usize>, max: Option<usize>, field: Option<&str>) -> Result<()> {
    let length = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => {
            return Err(ValidationError::new(
                "length",
                format!("Expected a value with length, got {}", type_name(other)),
                field,
            ));
        }
    };
    if let Some(min) = min.filter(|min| length < *min) {
        return Err(ValidationError::new("length", format!("Length must be at least {min}"), field)
            .with_detail("length", length));
    }
    if let Some(max) = max.filter(|max| length > *max) {
        return Err(ValidationError::new("length", format!("Length must be at most {max}"), field)
            .with_detail("length", length));
    }
    Ok(())
}

/// String matches `pattern` starting at its first character. The pattern
/// need not cover the whole string unless it ends with `$`.
pub fn validate_pattern(value: &Value, pattern: &str, field: Option<&str>) -> Result<()> {
    let text = expect_str("pattern", value, field)?;
    let regex = Regex::new(pattern)
        .map_err(|e| ValidationError::new("pattern", format!("Invalid pattern: {e}"), field))?;
    match regex.find(text) {
        Some(found) if found.start() == 0 => Ok(()),
        _ => Err(ValidationError::new("pattern", "Value does not match pattern", field)
            .with_detail("pattern", pattern)),
    }
}

pub fn validate_email(value: &Value, field: Option<&str>) -> Result<()> {
    let text = expect_str("email", value, field)?;
    if is_email(text) {
        Ok(())
    } else {
        Err(ValidationError::new("email", "Invalid email address", field))
    }
}

/// `http` or `https` URL with a dotted host name.
pub fn validate_url(value: &Value, require_https: bool, field: Option<&str>) -> Result<()> {
    let text = expect_str("url", value, field)?;
    if !is_url(text) {
        return Err(ValidationError::new("url", "Invalid URL", field));
    }
    if require_https && !text.starts_with("https://") {
        return Err(ValidationError::new("url", "URL must use HTTPS protocol", field));
    }
    Ok(())
}

pub fn validate_ip(value: &Value, allow_v4: bool, allow_v6: bool, field: Option<&str>) -> Result<()> {
    let text = expect_str("ip", value, field)?;
    match text.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) if !allow_v4 => Err(ValidationError::new("ip", "IPv4 addresses are not allowed", field)),
        Ok(IpAddr::V6(_)) if !allow_v6 => Err(ValidationError::new("ip", "IPv6 addresses are not allowed", field)),
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("ip", "Invalid IP address", field)),
    }
}

/// Any textual UUID form; with `version` set, also the version number.
pub fn validate_uuid(value: &Value, version: Option<usize>, field: Option<&str>) -> Result<()> {
    let text = expect_str("uuid", value, field)?;
    let id = Uuid::parse_str(text).map_err(|_| ValidationError::new("uuid", "Invalid UUID", field))?;
    match version {
        Some(expected) if id.get_version_num() != expected => Err(ValidationError::new(
            "uuid",
            format!("Expected UUID version {expected}, got version {}", id.get_version_num()),
            field,
        )),
        _ => Ok(()),
    }
}

pub fn validate_json(value: &Value, field: Option<&str>) -> Result<()> {
    let text = expect_str("json", value, field)?;
    serde_json::from_str::<Value>(text)
        .map(drop)
        .map_err(|e| ValidationError::new("json", format!("Invalid JSON: {e}"), field))
}

/// Not null, not an empty string, array or object, not only whitespace.
pub fn validate_not_empty(value: &Value, field: Option<&str>) -> Result<()> {
    let message = match value {
        Value::Null => "Value cannot be null",
        Value::String(s) if s.is_empty() => "Value cannot be empty",
        Value::Array(items) if items.is_empty() => "Value cannot be empty",
        Value::Object(map) if map.is_empty() => "Value cannot be empty",
        Value::String(s) if s.trim().is_empty() => "Value cannot be empty or whitespace",
        _ => return Ok(()),
    };
    Err(ValidationError::new("not_empty", message, field))
}

/// Value equals one of `options`.
pub fn validate_one_of(value: &Value, options: &[Value], field: Option<&str>) -> Result<()> {
    if options.contains(value) {
        return Ok(());
    }
    let listed: Vec<String> = options
        .iter()
        .map(|option| match option {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    Err(ValidationError::new("one_of", format!("Value must be one of: {}", listed.join(", ")), field))
}
