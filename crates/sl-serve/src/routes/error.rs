use crate::middleware::correlation;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use sl_core::TimelineError;
use std::any::Any;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    #[schema(value_type = String)]
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &TimelineError,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code) = match err {
        TimelineError::InvalidUserId { .. } => (StatusCode::BAD_REQUEST, "invalid_input"),
        TimelineError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };

    (
        status,
        Json(ErrorEnvelope {
            success: false,
            error: err.to_string(),
            code,
            correlation_id,
        }),
    )
}

/// Last-resort handler: a panic while building a response becomes a 500
/// envelope carrying the panic message and the request's correlation id.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unexpected panic".to_string());
    tracing::error!(%message, "request handler panicked");

    map_error(&TimelineError::Internal { message }, correlation::current()).into_response()
}
