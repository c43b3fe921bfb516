use crate::extract::fields::{
    array_at, as_count, first_count, object_at, payload_timestamp, plural, unwrap_envelope,
    COUNT_KEYS, META_KEYS,
};
use crate::types::event::SYSTEM_SOURCE;
use crate::types::{EventStatus, EventType, TimelineEvent};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

const TABLE_CONTAINER_KEYS: &[&str] = &["tables", "counts", "table_counts"];
/// Non-zero entries listed in the keyed summary.
const SUMMARY_ENTRIES: usize = 10;
const EVENT_ID: &str = "table-counts";

#[derive(Debug)]
enum TableCountsShape<'a> {
    Rows(&'a [Value]),
    Keyed(&'a Map<String, Value>),
}

fn detect(body: &Value) -> Option<TableCountsShape<'_>> {
    if let Some(rows) = body.as_array() {
        return Some(TableCountsShape::Rows(rows));
    }
    if let Some(rows) = array_at(body, TABLE_CONTAINER_KEYS) {
        return Some(TableCountsShape::Rows(rows));
    }
    if let Some(tables) = object_at(body, TABLE_CONTAINER_KEYS) {
        return Some(TableCountsShape::Keyed(tables));
    }
    body.as_object().map(TableCountsShape::Keyed)
}

/// Summarises global table counts as a single system event, whatever the
/// number of tables.
pub fn extract(payload: Option<&Value>, now: DateTime<Utc>) -> Vec<TimelineEvent> {
    let Some(payload) = payload else {
        return Vec::new();
    };
    let body = unwrap_envelope(payload);
    let timestamp = payload_timestamp(body).unwrap_or(now);

    let (title, details) = match detect(body) {
        Some(TableCountsShape::Rows(rows)) => {
            let records: u64 = rows
                .iter()
                .map(|row| first_count(row, COUNT_KEYS))
                .fold(0, u64::saturating_add);
            let details =
                (records > 0).then(|| format!("{} in total", plural(records, "record", "records")));
            (summary_title(rows.len()), details)
        }
        Some(TableCountsShape::Keyed(tables)) => {
            let entries = keyed_entries(tables);
            (summary_title(entries.len()), Some(list_nonzero(&entries)))
        }
        None => return Vec::new(),
    };

    vec![TimelineEvent {
        id: EVENT_ID.to_string(),
        timestamp,
        kind: EventType::System,
        source: SYSTEM_SOURCE.to_string(),
        title,
        details,
        status: EventStatus::Success,
    }]
}

fn summary_title(tables: usize) -> String {
    let tables = u64::try_from(tables).unwrap_or(u64::MAX);
    format!("Table counts: {}", plural(tables, "table", "tables"))
}

fn keyed_entries(tables: &Map<String, Value>) -> Vec<(&str, u64)> {
    tables
        .iter()
        .filter(|(name, _)| !META_KEYS.contains(&name.as_str()))
        .filter_map(|(name, value)| {
            let count = match value {
                Value::Object(_) if COUNT_KEYS.iter().any(|key| value.get(*key).is_some()) => {
                    Some(first_count(value, COUNT_KEYS))
                }
                Value::Object(_) => None,
                other => as_count(other),
            };
            count.map(|count| (name.as_str(), count))
        })
        .collect()
}

fn list_nonzero(entries: &[(&str, u64)]) -> String {
    let nonzero: Vec<&(&str, u64)> = entries.iter().filter(|(_, count)| *count > 0).collect();
    if nonzero.is_empty() {
        return "all tables empty".to_string();
    }
    let mut listed = nonzero
        .iter()
        .take(SUMMARY_ENTRIES)
        .map(|(name, count)| format!("{name}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    if nonzero.len() > SUMMARY_ENTRIES {
        listed.push_str(&format!(", +{} more", nonzero.len() - SUMMARY_ENTRIES));
    }
    listed
}
