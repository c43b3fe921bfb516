use crate::extract::fields::{
    array_at, as_count, first_count, first_str, object_at, payload_timestamp, plural,
    resolve_timestamp, unwrap_envelope, COUNT_KEYS, META_KEYS,
};
use crate::extract::integration::infer_source;
use crate::types::{EventStatus, EventType, TimelineEvent};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

const TABLE_CONTAINER_KEYS: &[&str] = &["tables", "staging_tables", "counts"];
const TABLE_NAME_KEYS: &[&str] = &["table_name", "table", "name"];
const ERROR_KEYS: &[&str] = &["last_error", "error"];

#[derive(Debug)]
enum StagingShape<'a> {
    /// `[{"table_name": ..., "count": ...}]`, bare or under `tables`.
    Rows(&'a [Value]),
    /// `{"tables": {"name": 12}}`, `{"tables": {"name": {"count": 12}}}` or
    /// the same map without the container.
    Keyed(&'a Map<String, Value>),
}

fn detect(body: &Value) -> Option<StagingShape<'_>> {
    if let Some(rows) = body.as_array() {
        return Some(StagingShape::Rows(rows));
    }
    if let Some(rows) = array_at(body, TABLE_CONTAINER_KEYS) {
        return Some(StagingShape::Rows(rows));
    }
    if let Some(tables) = object_at(body, TABLE_CONTAINER_KEYS) {
        return Some(StagingShape::Keyed(tables));
    }
    body.as_object().map(StagingShape::Keyed)
}

/// One pending event per staging table holding unprocessed rows. Tables with
/// a zero count are dropped.
pub fn extract(payload: Option<&Value>, now: DateTime<Utc>) -> Vec<TimelineEvent> {
    let Some(payload) = payload else {
        return Vec::new();
    };
    let body = unwrap_envelope(payload);
    let fallback = payload_timestamp(body);

    match detect(body) {
        Some(StagingShape::Rows(rows)) => rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let count = first_count(row, COUNT_KEYS);
                let name = first_str(row, TABLE_NAME_KEYS);
                let id = name.map_or_else(|| index.to_string(), str::to_string);
                let timestamp = resolve_timestamp(row, fallback, now);
                staging_event(&id, name, count, timestamp, first_str(row, ERROR_KEYS))
            })
            .collect(),
        Some(StagingShape::Keyed(tables)) => tables
            .iter()
            .filter(|(name, _)| !META_KEYS.contains(&name.as_str()))
            .filter_map(|(name, value)| {
                let (count, timestamp, error) = if value.is_object() {
                    (
                        first_count(value, COUNT_KEYS),
                        resolve_timestamp(value, fallback, now),
                        first_str(value, ERROR_KEYS),
                    )
                } else {
                    (as_count(value).unwrap_or(0), fallback.unwrap_or(now), None)
                };
                staging_event(name, Some(name.as_str()), count, timestamp, error)
            })
            .collect(),
        None => Vec::new(),
    }
}

fn staging_event(
    id: &str,
    name: Option<&str>,
    count: u64,
    timestamp: DateTime<Utc>,
    error: Option<&str>,
) -> Option<TimelineEvent> {
    if count == 0 {
        return None;
    }
    let table = name.unwrap_or("unnamed table");
    Some(TimelineEvent {
        id: format!("staging-{id}"),
        timestamp,
        kind: EventType::Staging,
        source: infer_source(name),
        title: format!("{} awaiting processing in {table}", plural(count, "record", "records")),
        details: error.map(str::to_string),
        status: EventStatus::Pending,
    })
}
