//! Payload extractors.
//!
//! Each upstream has changed its response shape more than once, so every
//! extractor first classifies the payload into one of its known shapes and
//! then reads fields through ordered fallback lists. Extraction never fails:
//! an unrecognised shape yields no events and a missing field degrades to a
//! default.

pub mod fields;
pub mod integration;
pub mod onboarding;
pub mod staging;
pub mod table_counts;

use crate::types::{TimelineEvent, UpstreamSource};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Dispatches a payload to the extractor owning `source`.
pub fn extract(
    source: UpstreamSource,
    payload: Option<&Value>,
    now: DateTime<Utc>,
) -> Vec<TimelineEvent> {
    match source {
        UpstreamSource::OnboardingStatus => onboarding::extract(payload, now),
        UpstreamSource::StagingStatus => staging::extract(payload, now),
        UpstreamSource::TableCounts => table_counts::extract(payload, now),
    }
}
