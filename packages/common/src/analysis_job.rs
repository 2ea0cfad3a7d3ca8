use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request for the analysis worker to process one stored log.
///
/// Deliberately minimal: the worker fetches the uploaded bytes from blob
/// storage using the analysis id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub id: Uuid,
}

impl AnalysisRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}
