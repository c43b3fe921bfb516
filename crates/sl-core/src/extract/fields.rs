use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

/// Record-level timestamp fields, most specific first.
pub const TIMESTAMP_KEYS: &[&str] = &["updated_at", "last_updated", "created_at", "started_at"];

/// Payload-level timestamp fields used when a record carries none.
pub const PAYLOAD_TIMESTAMP_KEYS: &[&str] = &[
    "updated_at",
    "last_updated",
    "timestamp",
    "generated_at",
    "as_of",
    "created_at",
];

pub const COUNT_KEYS: &[&str] = &["unprocessed_count", "count", "total", "row_count"];

/// Non-table keys that may sit beside counts in a bare keyed payload.
pub const META_KEYS: &[&str] = &[
    "success",
    "user_id",
    "total",
    "total_tables",
    "timestamp",
    "generated_at",
    "updated_at",
    "last_updated",
    "created_at",
    "as_of",
];

/// Epoch values above this are taken as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Strips a `{"data": ...}` envelope when present.
pub fn unwrap_envelope(value: &Value) -> &Value {
    match value.get("data") {
        Some(inner @ (Value::Object(_) | Value::Array(_))) => inner,
        _ => value,
    }
}

/// First non-blank string among `keys`.
pub fn first_str<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// First identifier-like value among `keys`, numbers included.
pub fn first_key(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(|value| match value {
            Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
}

/// Reads a count through `keys` in order; the first usable value wins and
/// the chain bottoms out at zero.
pub fn first_count(record: &Value, keys: &[&str]) -> u64 {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(as_count)
        .unwrap_or(0)
}

/// Non-negative integer view of a loosely typed count.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_i64().map(|signed| u64::try_from(signed).unwrap_or(0)))
            .or_else(|| number.as_f64().map(|float| float.max(0.0) as u64)),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    }
}

pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_timestamp_str(text.trim()),
        Value::Number(number) => {
            let raw = number.as_i64()?;
            if raw.abs() >= EPOCH_MILLIS_THRESHOLD {
                Utc.timestamp_millis_opt(raw).single()
            } else {
                Utc.timestamp_opt(raw, 0).single()
            }
        }
        _ => None,
    }
}

fn parse_timestamp_str(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

/// First parseable timestamp among `keys`.
pub fn first_timestamp(record: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(parse_timestamp)
}

/// Record timestamp, then the payload's own timestamp, then `now`.
pub fn resolve_timestamp(
    record: &Value,
    payload_fallback: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    first_timestamp(record, TIMESTAMP_KEYS)
        .or(payload_fallback)
        .unwrap_or(now)
}

pub fn payload_timestamp(payload: &Value) -> Option<DateTime<Utc>> {
    first_timestamp(payload, PAYLOAD_TIMESTAMP_KEYS)
}

/// Array of records found under the first matching key.
pub fn array_at<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a [Value]> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(|inner| inner.as_array().map(Vec::as_slice))
}

/// Object found under the first matching key.
pub fn object_at<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Map<String, Value>> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(Value::as_object)
}

pub fn plural(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
