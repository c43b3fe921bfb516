pub mod middleware;
pub mod openapi;
pub mod routes;

use axum::Router;
use sl_core::TimelineConfig;
use sl_upstream::{HttpStatusSource, UpstreamError};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<HttpStatusSource>,
    pub config: TimelineConfig,
}

impl AppState {
    pub fn new(system_base_url: &str, config: TimelineConfig) -> Result<Self, UpstreamError> {
        let source = HttpStatusSource::new(system_base_url, config.upstream_timeout)?;
        Ok(Self {
            source: Arc::new(source),
            config,
        })
    }
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, upstream = state.source.base_url(), "listening");
    axum::serve(listener, app(state)).await
}
