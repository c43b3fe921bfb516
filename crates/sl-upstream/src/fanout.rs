use crate::client::StatusSource;
use crate::error::UpstreamError;
use futures::future::join_all;
use serde_json::Value;
use sl_core::types::{Fetched, UpstreamSource};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;

/// Queries every upstream concurrently and waits for all of them to settle.
///
/// Each call runs in its own task under its own `timeout`; a timeout, error
/// or panic in one task is reported as that source's [`Fetched::Failed`] and
/// never cancels the others. Results come back in [`UpstreamSource::ALL`]
/// order. Nothing is retried.
pub async fn fan_out<S: StatusSource>(
    source: Arc<S>,
    user_id: u64,
    timeout: Duration,
) -> Vec<(UpstreamSource, Fetched)> {
    let handles = UpstreamSource::ALL.map(|upstream| {
        let source = Arc::clone(&source);
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, source.fetch(upstream, user_id)).await {
                Ok(result) => result,
                Err(_) => Err(UpstreamError::Timeout {
                    endpoint: upstream.path(),
                    after: timeout,
                }),
            }
        })
    });

    let settled = join_all(handles).await;
    UpstreamSource::ALL
        .into_iter()
        .zip(settled)
        .map(|(upstream, joined)| {
            let result = joined.unwrap_or_else(|err| Err(task_failed(upstream, err)));
            (upstream, settle(upstream, user_id, result))
        })
        .collect()
}

fn settle(
    upstream: UpstreamSource,
    user_id: u64,
    result: Result<Option<Value>, UpstreamError>,
) -> Fetched {
    let endpoint = upstream.path();
    match result {
        Ok(Some(payload)) => {
            tracing::debug!(endpoint, user_id, "upstream payload received");
            Fetched::Payload(payload)
        }
        Ok(None) => {
            tracing::debug!(endpoint, user_id, "upstream returned no data");
            Fetched::Absent
        }
        Err(err) => {
            tracing::warn!(endpoint, user_id, error = %err, "upstream call failed");
            Fetched::Failed {
                reason: err.to_string(),
            }
        }
    }
}

fn task_failed(upstream: UpstreamSource, err: JoinError) -> UpstreamError {
    let message = if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        err.to_string()
    };
    UpstreamError::TaskFailed {
        endpoint: upstream.path(),
        message,
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panicked".to_string())
}
