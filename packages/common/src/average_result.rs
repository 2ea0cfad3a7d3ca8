use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::AverageStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AverageOutcome {
    Success,
    Failed,
}

impl From<AverageOutcome> for AverageStatus {
    fn from(outcome: AverageOutcome) -> Self {
        match outcome {
            AverageOutcome::Success => AverageStatus::Success,
            AverageOutcome::Failed => AverageStatus::Failed,
        }
    }
}

/// Result published by the average worker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageResult {
    pub user_id: Uuid,
    /// Fingerprint of the analysis set the average was computed from.
    pub analysis_sha: String,
    pub status: AverageOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub average: Value,
}
