use crate::extract::fields::{
    array_at, first_count, first_key, first_str, payload_timestamp, resolve_timestamp,
    unwrap_envelope,
};
use crate::extract::integration::infer_source;
use crate::types::{EventStatus, EventType, TimelineEvent};
use chrono::{DateTime, Utc};
use serde_json::Value;

const JOB_LIST_KEYS: &[&str] = &["jobs", "onboarding_jobs"];
const JOB_KEYS: &[&str] = &["job", "onboarding_job", "latest_job"];
const STATUS_KEYS: &[&str] = &["status", "state", "onboarding_status"];
const COMPLETE_FLAG_KEYS: &[&str] = &["is_complete", "completed", "onboarding_complete"];
const ID_KEYS: &[&str] = &["id", "job_id", "uuid"];
const HINT_KEYS: &[&str] = &["job_type", "type", "integration", "name", "source"];
const DETAIL_KEYS: &[&str] = &[
    "message",
    "error_message",
    "error",
    "current_step",
    "step",
    "details",
    "description",
];
const PROCESSED_KEYS: &[&str] = &["processed_count", "processed", "records_processed"];
const TOTAL_KEYS: &[&str] = &["total_count", "total", "records_total"];

#[derive(Debug)]
enum OnboardingShape<'a> {
    /// `{"jobs": [...]}` or a bare array of job objects.
    Jobs(&'a [Value]),
    /// A single job nested under `job` / `onboarding_job` / `latest_job`.
    Job(&'a Value),
    /// Status fields directly on the payload.
    Flat(&'a Value),
}

fn detect(body: &Value) -> Option<OnboardingShape<'_>> {
    if let Some(jobs) = body.as_array() {
        return Some(OnboardingShape::Jobs(jobs));
    }
    if !body.is_object() {
        return None;
    }
    if let Some(jobs) = array_at(body, JOB_LIST_KEYS) {
        return Some(OnboardingShape::Jobs(jobs));
    }
    if let Some(job) = JOB_KEYS
        .iter()
        .find_map(|key| body.get(*key).filter(|value| value.is_object()))
    {
        return Some(OnboardingShape::Job(job));
    }
    let has_status = STATUS_KEYS
        .iter()
        .chain(COMPLETE_FLAG_KEYS)
        .any(|key| body.get(*key).is_some_and(|value| !value.is_null()));
    has_status.then_some(OnboardingShape::Flat(body))
}

pub fn extract(payload: Option<&Value>, now: DateTime<Utc>) -> Vec<TimelineEvent> {
    let Some(payload) = payload else {
        return Vec::new();
    };
    let body = unwrap_envelope(payload);
    let fallback = payload_timestamp(body);

    match detect(body) {
        Some(OnboardingShape::Jobs(jobs)) => jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| job.is_object())
            .map(|(index, job)| {
                let id = first_key(job, ID_KEYS).unwrap_or_else(|| index.to_string());
                job_event(job, format!("onboarding-{id}"), "job", fallback, now)
            })
            .collect(),
        Some(OnboardingShape::Job(job)) => {
            let id = first_key(job, ID_KEYS).map_or_else(
                || "onboarding-job".to_string(),
                |key| format!("onboarding-{key}"),
            );
            vec![job_event(job, id, "job", fallback, now)]
        }
        Some(OnboardingShape::Flat(record)) => {
            vec![job_event(record, "onboarding-status".to_string(), "", fallback, now)]
        }
        None => Vec::new(),
    }
}

fn job_event(
    record: &Value,
    id: String,
    noun: &str,
    fallback: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> TimelineEvent {
    let hint = first_str(record, HINT_KEYS);
    let kind = if hint.is_some_and(|value| value.to_ascii_lowercase().contains("sync")) {
        EventType::Sync
    } else {
        EventType::Onboarding
    };
    let raw_status = first_str(record, STATUS_KEYS);
    let status = record_status(record, raw_status);

    let subject = match (kind, noun.is_empty()) {
        (EventType::Sync, _) => "Sync job".to_string(),
        (_, true) => "Onboarding".to_string(),
        (_, false) => format!("Onboarding {noun}"),
    };
    let phrase = raw_status.map_or_else(
        || status_phrase(status).to_string(),
        |word| word.to_ascii_lowercase().replace('_', " "),
    );

    TimelineEvent {
        id,
        timestamp: resolve_timestamp(record, fallback, now),
        kind,
        source: infer_source(hint),
        title: format!("{subject} {phrase}"),
        details: details(record),
        status,
    }
}

fn record_status(record: &Value, raw_status: Option<&str>) -> EventStatus {
    if raw_status.is_some() {
        return EventStatus::from_upstream(raw_status);
    }
    let flag = COMPLETE_FLAG_KEYS
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_bool));
    match flag {
        Some(true) => EventStatus::Success,
        _ if first_str(record, &["error", "error_message"]).is_some() => EventStatus::Error,
        _ => EventStatus::Pending,
    }
}

fn status_phrase(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Success => "completed",
        EventStatus::Error => "failed",
        EventStatus::Processing => "in progress",
        EventStatus::Pending => "pending",
    }
}

fn details(record: &Value) -> Option<String> {
    if let Some(text) = first_str(record, DETAIL_KEYS) {
        return Some(text.to_string());
    }
    let total = first_count(record, TOTAL_KEYS);
    if total == 0 {
        return None;
    }
    let processed = first_count(record, PROCESSED_KEYS);
    Some(format!("{processed} of {total} records processed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn nested_job_shape() {
        let payload = json!({
            "job": {
                "id": 42,
                "job_type": "rezen_onboarding",
                "status": "completed",
                "created_at": "2024-05-01T10:00:00Z",
                "updated_at": "2024-05-01T10:05:00Z",
                "processed_count": 80,
                "total_count": 80
            }
        });

        let events = extract(Some(&payload), now());
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.id, "onboarding-42");
        assert_eq!(event.kind, EventType::Onboarding);
        assert_eq!(event.source, "rezen");
        assert_eq!(event.status, EventStatus::Success);
        assert_eq!(event.title, "Onboarding job completed");
        assert_eq!(event.details.as_deref(), Some("80 of 80 records processed"));
        assert_eq!(
            event.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 5, 0).unwrap()
        );
    }

    #[test]
    fn flat_status_shape() {
        let payload = json!({
            "user_id": 7,
            "status": "in_progress",
            "current_step": "Importing listings",
            "created_at": "2024-05-02 08:00:00"
        });

        let events = extract(Some(&payload), now());
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.id, "onboarding-status");
        assert_eq!(event.source, "system");
        assert_eq!(event.status, EventStatus::Processing);
        assert_eq!(event.title, "Onboarding in progress");
        assert_eq!(event.details.as_deref(), Some("Importing listings"));
        assert_eq!(
            event.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn job_list_shape_with_sync_jobs() {
        let payload = json!({
            "data": {
                "jobs": [
                    {"id": "a1", "type": "fub_contact_sync", "status": "failed", "error": "401 from FUB"},
                    {"type": "skyslope", "status": "queued"},
                    "not-a-job"
                ]
            }
        });

        let events = extract(Some(&payload), now());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "onboarding-a1");
        assert_eq!(events[0].kind, EventType::Sync);
        assert_eq!(events[0].source, "fub");
        assert_eq!(events[0].status, EventStatus::Error);
        assert_eq!(events[0].title, "Sync job failed");
        assert_eq!(events[0].details.as_deref(), Some("401 from FUB"));

        assert_eq!(events[1].id, "onboarding-1");
        assert_eq!(events[1].status, EventStatus::Pending);
        assert_eq!(events[1].timestamp, now());
    }

    #[test]
    fn completion_flag_without_status_word() {
        let payload = json!({"onboarding_complete": true});
        let events = extract(Some(&payload), now());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, EventStatus::Success);
        assert_eq!(events[0].title, "Onboarding completed");
    }

    #[test]
    fn absent_or_unknown_payload_yields_nothing() {
        assert!(extract(None, now()).is_empty());
        assert!(extract(Some(&json!({"message": "no onboarding"})), now()).is_empty());
        assert!(extract(Some(&json!("ok")), now()).is_empty());
    }
}
