//! Record stores for analyses and per-user averages.
//!
//! Each store has a sea-orm implementation for production and an in-memory
//! one used by tests and local tooling. Both enforce the same uniqueness
//! rules and report violations as [`AppError::Conflict`].

mod analysis;
mod average;
mod memory;

pub use analysis::SeaOrmAnalysisStore;
pub use average::SeaOrmAverageStore;
pub use memory::{MemoryAnalysisStore, MemoryAverageStore};

use async_trait::async_trait;
use uuid::Uuid;

use crate::entity::{fap_analysis, fap_average};
use crate::error::AppError;
use crate::models::analysis::{AnalysisPage, AnalysisPatch, AnalysisQuery, NewAnalysis};
use crate::models::average::AveragePatch;

/// Message returned whenever an analysis is missing or not visible to the caller.
pub const ANALYSIS_NOT_FOUND: &str = "Analysis for given ID not found.";

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Insert a new `Processing` record.
    ///
    /// Fails with `Conflict` if the owner already has a record for the same
    /// content hash. Anonymous records are never in conflict.
    async fn create(&self, new: NewAnalysis) -> Result<fap_analysis::Model, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<fap_analysis::Model>, AppError>;

    async fn find_by_owner_and_hash(
        &self,
        owner: Option<Uuid>,
        sha256: &str,
    ) -> Result<Option<fap_analysis::Model>, AppError>;

    /// Every record of `owner`, in ascending id order.
    async fn find_all_by_owner(&self, owner: Uuid) -> Result<Vec<fap_analysis::Model>, AppError>;

    async fn find_page_by_owner(
        &self,
        owner: Uuid,
        query: &AnalysisQuery,
    ) -> Result<AnalysisPage, AppError>;

    /// Every record including anonymous ones, in ascending id order.
    async fn find_all(&self) -> Result<Vec<fap_analysis::Model>, AppError>;

    /// Apply a partial update. `NotFound` if no record has this id.
    async fn update(&self, id: Uuid, patch: AnalysisPatch)
    -> Result<fap_analysis::Model, AppError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Fetch a record only if it belongs to `owner`.
    async fn get_for_owner(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<fap_analysis::Model, AppError> {
        match self.find_by_id(id).await? {
            Some(record) if record.user_id == Some(owner) => Ok(record),
            _ => Err(AppError::NotFound(ANALYSIS_NOT_FOUND.into())),
        }
    }

    /// Delete a record only if it belongs to `owner`.
    async fn delete_for_owner(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<fap_analysis::Model, AppError> {
        let record = self.get_for_owner(id, owner).await?;
        if !self.delete(id).await? {
            return Err(AppError::NotFound(ANALYSIS_NOT_FOUND.into()));
        }
        Ok(record)
    }
}

#[async_trait]
pub trait AverageStore: Send + Sync {
    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<fap_average::Model>, AppError>;

    /// Create the empty average of a new owner. `Conflict` if one exists.
    async fn create_for_owner(&self, owner: Uuid) -> Result<fap_average::Model, AppError>;

    /// Apply a partial update. `NotFound` if the owner has no average.
    async fn update(&self, owner: Uuid, patch: AveragePatch)
    -> Result<fap_average::Model, AppError>;
}

pub(crate) fn average_not_found(owner: Uuid) -> AppError {
    AppError::NotFound(format!("Average for user {owner} not found"))
}
