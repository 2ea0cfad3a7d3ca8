use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::AnalysisStatus;
use crate::payload::number_at;

/// Location of the trip distance inside an analysis payload, used when the
/// worker does not report `distance` explicitly.
pub const DISTANCE_PATH: &[&str] = &["overall", "distance_km"];

/// Final state reported by the analysis worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum AnalysisOutcome {
    Success,
    Failed,
}

impl From<AnalysisOutcome> for AnalysisStatus {
    fn from(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Success => AnalysisStatus::Success,
            AnalysisOutcome::Failed => AnalysisStatus::Failed,
        }
    }
}

/// Result published by the analysis worker for one analysis request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub analysis_id: Uuid,
    pub status: AnalysisOutcome,
    #[serde(default)]
    pub message: String,
    /// Open-ended analysis document produced by the worker.
    #[serde(default)]
    pub analysis: Value,
    /// Whether a particulate filter regeneration was seen in the log.
    #[serde(default)]
    pub fap_regen: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl AnalysisResult {
    /// Log timestamp, or `None` when absent or unparseable.
    pub fn parsed_log_date(&self) -> Option<DateTime<Utc>> {
        self.log_date.as_deref().and_then(parse_log_date)
    }

    /// Explicit distance, falling back to the distance inside the payload.
    pub fn resolved_distance(&self) -> Option<f64> {
        self.distance
            .filter(|d| d.is_finite())
            .or_else(|| number_at(&self.analysis, DISTANCE_PATH))
    }
}

/// Parse a worker-supplied timestamp.
///
/// Accepts RFC 3339 and zone-less ISO 8601 date-times (read as UTC).
pub fn parse_log_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
