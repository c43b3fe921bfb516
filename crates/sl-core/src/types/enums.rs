use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Sync,
    Onboarding,
    Staging,
    Error,
    System,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Onboarding => "onboarding",
            Self::Staging => "staging",
            Self::Error => "error",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Success,
    Error,
    Pending,
    Processing,
}

impl EventStatus {
    /// Maps a free-form upstream status word onto the event status set.
    /// Unknown or missing words are treated as pending.
    pub fn from_upstream(word: Option<&str>) -> Self {
        let Some(word) = word else {
            return Self::Pending;
        };
        match word.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "completed" | "complete" | "success" | "succeeded" | "done" | "finished" => {
                Self::Success
            }
            "failed" | "failure" | "error" | "errored" | "cancelled" | "canceled" => Self::Error,
            "running" | "in_progress" | "processing" | "active" | "syncing" | "started" => {
                Self::Processing
            }
            _ => Self::Pending,
        }
    }
}
