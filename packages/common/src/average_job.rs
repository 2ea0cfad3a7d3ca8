use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Request for the average worker to aggregate a user's successful analyses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageRequest {
    /// Owner whose average is being recomputed.
    pub user_id: Uuid,
    /// Hex SHA-256 of the canonical JSON of `analysis`.
    pub analysis_sha: String,
    /// Result payloads of every successful analysis, ordered by analysis id.
    pub analysis: Vec<Value>,
}
