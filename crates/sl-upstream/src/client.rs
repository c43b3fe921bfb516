use crate::error::UpstreamError;
use serde_json::Value;
use sl_core::types::UpstreamSource;
use std::future::Future;
use std::time::Duration;

/// A backend that can be asked for one status payload.
///
/// `Ok(None)` means the endpoint answered without usable data.
pub trait StatusSource: Send + Sync + 'static {
    fn fetch(
        &self,
        source: UpstreamSource,
        user_id: u64,
    ) -> impl Future<Output = Result<Option<Value>, UpstreamError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpStatusSource {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpStatusSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(UpstreamError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, source: UpstreamSource, user_id: u64) -> String {
        if source.is_user_scoped() {
            format!("{}/{}?user_id={user_id}", self.base_url, source.path())
        } else {
            format!("{}/{}", self.base_url, source.path())
        }
    }

    fn transport_error(&self, endpoint: &'static str, source: reqwest::Error) -> UpstreamError {
        if source.is_timeout() {
            return UpstreamError::Timeout {
                endpoint,
                after: self.timeout,
            };
        }
        UpstreamError::Transport { endpoint, source }
    }
}

impl StatusSource for HttpStatusSource {
    async fn fetch(
        &self,
        source: UpstreamSource,
        user_id: u64,
    ) -> Result<Option<Value>, UpstreamError> {
        let endpoint = source.path();
        let response = self
            .client
            .get(self.url(source, user_id))
            .send()
            .await
            .map_err(|err| self.transport_error(endpoint, err))?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(endpoint, %status, "upstream returned non-success status");
            return Ok(None);
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(endpoint, err))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            tracing::debug!(endpoint, "upstream returned empty body");
            return Ok(None);
        }

        let value: Value = serde_json::from_slice(&body).map_err(|err| UpstreamError::Decode {
            endpoint,
            message: err.to_string(),
        })?;
        Ok((!value.is_null()).then_some(value))
    }
}
