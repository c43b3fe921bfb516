use crate::middleware::correlation::CorrelationId;
use crate::routes::error::{map_error, ErrorEnvelope};
use crate::AppState;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Utc;
use sl_core::types::{EventType, TimelinePage};
use sl_core::validation::parse_user_id;
use sl_core::{build_timeline, TimelineError, TimelineRequest};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Query values arrive as raw strings so malformed numbers fall back to
/// defaults instead of rejecting the request. Built from the raw pairs; a
/// repeated key keeps its first value.
#[derive(Debug, Default, PartialEq, Eq, serde::Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimelineQuery {
    /// Page size, clamped to [1, 200]; defaults to 50.
    limit: Option<String>,
    /// Events to skip; negative values read as 0.
    offset: Option<String>,
    /// Exact event type filter.
    #[serde(rename = "type")]
    #[param(value_type = Option<EventType>)]
    #[schema(value_type = Option<EventType>)]
    kind: Option<String>,
    /// Exact source filter, e.g. `rezen` or `system`.
    source: Option<String>,
}

impl TimelineQuery {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "limit" => &mut query.limit,
                "offset" => &mut query.offset,
                "type" => &mut query.kind,
                "source" => &mut query.source,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/users/{id}/timeline", get(user_timeline))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/users/{id}/timeline",
    params(("id" = String, Path, description = "Positive integer user id"), TimelineQuery),
    responses(
        (status = 200, body = TimelinePage),
        (status = 400, body = ErrorEnvelope),
        (status = 500, body = ErrorEnvelope)
    )
)]
pub(crate) async fn user_timeline(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    path: Result<Path<String>, PathRejection>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let id = match path {
        Ok(Path(id)) => id,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "rejected timeline request");
            let err = TimelineError::InvalidUserId {
                raw: rejection.body_text(),
            };
            return map_error(&err, Some(correlation.0)).into_response();
        }
    };
    let query = match pairs {
        Ok(Query(pairs)) => TimelineQuery::from_pairs(pairs),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "ignoring unreadable query string");
            TimelineQuery::default()
        }
    };
    let user_id = match parse_user_id(&id) {
        Ok(user_id) => user_id,
        Err(err) => {
            tracing::warn!(raw_id = %id, "rejected timeline request");
            return map_error(&err, Some(correlation.0)).into_response();
        }
    };

    let request = TimelineRequest::new(
        user_id,
        query.limit.as_deref(),
        query.offset.as_deref(),
        query.kind.as_deref(),
        query.source.as_deref(),
        &state.config,
    );
    let now = Utc::now();
    let outcomes =
        sl_upstream::fan_out(Arc::clone(&state.source), user_id, state.config.upstream_timeout)
            .await;
    let page = build_timeline(&request, outcomes, now);

    tracing::info!(
        user_id,
        total = page.total,
        returned = page.events.len(),
        errors = page
            .events
            .iter()
            .filter(|event| event.kind == EventType::Error)
            .count(),
        "timeline assembled"
    );
    Json(page).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn repeated_keys_keep_first_value() {
        let query = TimelineQuery::from_pairs(pairs(&[
            ("limit", "5"),
            ("limit", "10"),
            ("type", "staging"),
            ("unknown", "x"),
            ("type", "error"),
        ]));
        assert_eq!(query.limit.as_deref(), Some("5"));
        assert_eq!(query.kind.as_deref(), Some("staging"));
        assert_eq!(query.offset, None);
        assert_eq!(query.source, None);
    }
}
