use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{endpoint} timed out after {}ms", .after.as_millis())]
    Timeout { endpoint: &'static str, after: Duration },
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned invalid JSON: {message}")]
    Decode { endpoint: &'static str, message: String },
    #[error("{endpoint} task aborted: {message}")]
    TaskFailed { endpoint: &'static str, message: String },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}
