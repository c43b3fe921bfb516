use crate::assemble::{assemble, EventQuery};
use crate::config::TimelineConfig;
use crate::extract;
use crate::types::event::SYSTEM_SOURCE;
use crate::types::{EventStatus, EventType, Fetched, TimelineEvent, TimelinePage, UpstreamSource};
use crate::validation::Pagination;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRequest {
    pub user_id: u64,
    pub query: EventQuery,
}

impl TimelineRequest {
    /// Builds a request from raw query values. Blank filters count as unset.
    pub fn new(
        user_id: u64,
        limit: Option<&str>,
        offset: Option<&str>,
        kind: Option<&str>,
        source: Option<&str>,
        config: &TimelineConfig,
    ) -> Self {
        Self {
            user_id,
            query: EventQuery {
                kind: non_blank(kind),
                source: non_blank(source),
                page: Pagination::from_raw(limit, offset, config),
            },
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Stand-in for a source whose fetch failed.
pub fn synthetic_error(source: UpstreamSource, reason: &str, now: DateTime<Utc>) -> TimelineEvent {
    TimelineEvent {
        id: format!("error-{}", source.path()),
        timestamp: now,
        kind: EventType::Error,
        source: SYSTEM_SOURCE.to_string(),
        title: format!("Failed to fetch {}", source.label()),
        details: Some(reason.to_string()),
        status: EventStatus::Error,
    }
}

/// Turns settled fetch outcomes into one page of the user's timeline.
///
/// Failed sources contribute exactly one synthetic error event and their
/// extractor is skipped; absent sources contribute nothing.
pub fn build_timeline(
    request: &TimelineRequest,
    outcomes: Vec<(UpstreamSource, Fetched)>,
    now: DateTime<Utc>,
) -> TimelinePage {
    let mut events = Vec::new();
    for (source, outcome) in outcomes {
        match outcome {
            Fetched::Payload(payload) => events.extend(extract::extract(source, Some(&payload), now)),
            Fetched::Absent => {}
            Fetched::Failed { reason } => events.push(synthetic_error(source, &reason, now)),
        }
    }

    let assembled = assemble(events, &request.query);
    TimelinePage {
        user_id: request.user_id,
        events: assembled.events,
        total: assembled.total,
        has_more: assembled.has_more,
    }
}
