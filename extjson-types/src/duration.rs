//! Text form for durations.
//!
//! Durations are written as an ISO-8601 time-only duration counted in
//! seconds: `PT90S`, `PT0.25S`, `-PT3600.5S`. Only this form is accepted
//! back; calendar units (days, months) are never produced.

use crate::{Error, Result};
use chrono::TimeDelta;

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Formats a duration as `[-]PT<seconds>[.<fraction>]S`.
///
/// The fraction carries up to nine digits with trailing zeros removed.
#[must_use]
pub fn format_duration(duration: &TimeDelta) -> String {
    let negative = *duration < TimeDelta::zero();
    let magnitude = duration.abs();
    let secs = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos();
    let sign = if negative { "-" } else { "" };

    if nanos == 0 {
        format!("{sign}PT{secs}S")
    } else {
        let fraction = format!("{nanos:09}");
        format!("{sign}PT{secs}.{}S", fraction.trim_end_matches('0'))
    }
}

/// Parses the output of [`format_duration`].
pub fn parse_duration(text: &str) -> Result<TimeDelta> {
    let invalid = || Error::InvalidDuration(text.to_owned());

    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let body = rest
        .strip_prefix("PT")
        .and_then(|r| r.strip_suffix('S'))
        .ok_or_else(invalid)?;

    let (whole, fraction) = match body.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (body, None),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let secs: i64 = whole.parse().map_err(|_| invalid())?;

    let nanos = match fraction {
        None => 0,
        Some(f) if f.is_empty() || f.len() > 9 || !f.bytes().all(|b| b.is_ascii_digit()) => {
            return Err(invalid());
        }
        Some(f) => {
            let digits: u32 = f.parse().map_err(|_| invalid())?;
            digits * 10u32.pow(9 - f.len() as u32)
        }
    };
    debug_assert!(nanos < NANOS_PER_SEC);

    let magnitude = TimeDelta::new(secs, nanos).ok_or_else(invalid)?;
    Ok(if negative { -magnitude } else { magnitude })
}
