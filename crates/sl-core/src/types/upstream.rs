use serde_json::Value;

/// The fixed set of status endpoints a timeline is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamSource {
    OnboardingStatus,
    StagingStatus,
    TableCounts,
}

impl UpstreamSource {
    pub const ALL: [UpstreamSource; 3] = [
        UpstreamSource::OnboardingStatus,
        UpstreamSource::StagingStatus,
        UpstreamSource::TableCounts,
    ];

    /// Path relative to the system base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::OnboardingStatus => "onboarding-status",
            Self::StagingStatus => "staging-status",
            Self::TableCounts => "table-counts",
        }
    }

    /// Table counts are global; the other two are scoped with `?user_id=`.
    pub fn is_user_scoped(self) -> bool {
        !matches!(self, Self::TableCounts)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OnboardingStatus => "onboarding status",
            Self::StagingStatus => "staging status",
            Self::TableCounts => "table counts",
        }
    }
}

/// Settled outcome of one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Payload(Value),
    /// Non-success status or empty body.
    Absent,
    Failed { reason: String },
}
