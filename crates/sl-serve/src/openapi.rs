use utoipa::OpenApi;

use crate::routes::error::ErrorEnvelope;
use crate::routes::health::Health;
use crate::routes::timeline::TimelineQuery;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use sl_core::types::{EventStatus, EventType, TimelineEvent, TimelinePage};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::timeline::user_timeline,
        crate::routes::health::health
    ),
    components(schemas(
        TimelinePage,
        TimelineEvent,
        TimelineQuery,
        EventType,
        EventStatus,
        ErrorEnvelope,
        Health
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn router() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_documents_timeline_route() {
        let spec: serde_json::Value = serde_json::from_str(&generate_spec()).unwrap();
        assert!(spec["paths"]["/users/{id}/timeline"]["get"].is_object());
        assert!(spec["components"]["schemas"]["TimelineEvent"].is_object());
    }
}
