pub mod error;
pub mod health;
pub mod timeline;

use crate::middleware::correlation::correlation_middleware;
use crate::{openapi, AppState};
use axum::body::Body;
use axum::http::Request;
use axum::middleware;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .merge(timeline::router(state))
        .merge(health::router())
        .merge(openapi::router());
    with_layers(routes)
}

fn with_layers(routes: Router) -> Router {
    routes
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .route_layer(middleware::from_fn(correlation_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                correlation_id = tracing::field::Empty,
            )
        }))
}
