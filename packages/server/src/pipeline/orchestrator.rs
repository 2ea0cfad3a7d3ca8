use std::sync::Arc;

use common::AnalysisStatus;
use common::analysis_job::AnalysisRequest;
use common::storage::{BlobStore, ContentHash};
use mq::{MessageBus, MessageBusExt};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::entity::fap_analysis;
use crate::error::AppError;
use crate::models::analysis::{AnalysisPatch, NewAnalysis};
use crate::store::AnalysisStore;
use crate::utils::archive::expand_archive;
use crate::utils::filename::is_archive;

/// Turns uploads into analysis records and analysis requests.
pub struct AnalysisOrchestrator {
    analyses: Arc<dyn AnalysisStore>,
    blobs: Arc<dyn BlobStore>,
    bus: Arc<dyn MessageBus>,
    request_queue: String,
    leaf_extension: String,
    analyser_version: String,
}

impl AnalysisOrchestrator {
    pub fn new(
        analyses: Arc<dyn AnalysisStore>,
        blobs: Arc<dyn BlobStore>,
        bus: Arc<dyn MessageBus>,
        request_queue: impl Into<String>,
        leaf_extension: impl Into<String>,
        analyser_version: impl Into<String>,
    ) -> Self {
        Self {
            analyses,
            blobs,
            bus,
            request_queue: request_queue.into(),
            leaf_extension: leaf_extension.into(),
            analyser_version: analyser_version.into(),
        }
    }

    /// Accept an upload and return one analysis id per leaf file, in order.
    ///
    /// Archives are expanded first and rejected as a whole if any entry is
    /// not a leaf file. Content the owner already uploaded reuses the
    /// existing id. Dispatch failures are logged and do not fail the call.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn ingest(
        &self,
        data: &[u8],
        file_name: &str,
        owner: Option<Uuid>,
    ) -> Result<Vec<Uuid>, AppError> {
        if !is_archive(file_name) {
            return Ok(vec![self.ingest_leaf(file_name, data, owner).await?]);
        }

        let entries = expand_archive(data, &self.leaf_extension)?;
        info!(entries = entries.len(), "Expanded archive");

        let mut ids = Vec::with_capacity(entries.len());
        for entry in &entries {
            ids.push(self.ingest_leaf(&entry.name, &entry.data, owner).await?);
        }
        Ok(ids)
    }

    async fn ingest_leaf(
        &self,
        file_name: &str,
        data: &[u8],
        owner: Option<Uuid>,
    ) -> Result<Uuid, AppError> {
        let sha256 = ContentHash::compute(data).to_hex();

        if let Some(existing) = self.analyses.find_by_owner_and_hash(owner, &sha256).await? {
            return Ok(self.reuse(existing).await);
        }

        let new = NewAnalysis {
            file_name: file_name.to_string(),
            sha256: sha256.clone(),
            owner,
        };
        let record = match self.analyses.create(new).await {
            Ok(record) => record,
            Err(AppError::Conflict(_)) => {
                // A concurrent ingest committed the same content first.
                let existing = self
                    .analyses
                    .find_by_owner_and_hash(owner, &sha256)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal(format!(
                            "analysis with sha256 {sha256} conflicted but could not be found"
                        ))
                    })?;
                return Ok(self.reuse(existing).await);
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = self.blobs.put(&record.id.to_string(), data).await {
            warn!(analysis_id = %record.id, error = %e, "Failed to store upload, removing record");
            if let Err(cleanup) = self.analyses.delete(record.id).await {
                warn!(analysis_id = %record.id, error = %cleanup, "Failed to remove record");
            }
            return Err(e.into());
        }

        info!(analysis_id = %record.id, file_name, "Created analysis");
        self.dispatch(record.id).await;
        Ok(record.id)
    }

    async fn reuse(&self, existing: fap_analysis::Model) -> Uuid {
        if existing.status == AnalysisStatus::Success {
            info!(analysis_id = %existing.id, "Content already analysed, reusing result");
        } else {
            info!(
                analysis_id = %existing.id,
                status = %existing.status,
                "Content already uploaded, dispatching again"
            );
            self.dispatch(existing.id).await;
        }
        existing.id
    }

    /// Publish an analysis request. Failures are logged and swallowed; the
    /// record stays `Processing` until resubmission or the next version scan.
    pub async fn dispatch(&self, id: Uuid) -> bool {
        match self
            .bus
            .publish_message(&self.request_queue, &AnalysisRequest::new(id))
            .await
        {
            Ok(()) => {
                info!(analysis_id = %id, "Dispatched analysis request");
                true
            }
            Err(e) => {
                warn!(analysis_id = %id, error = %e, "Failed to dispatch analysis request");
                false
            }
        }
    }

    /// Reset and re-dispatch every analysis not produced by the configured
    /// analyser version. Returns how many were requeued.
    pub async fn requeue_outdated(&self) -> Result<usize, AppError> {
        info!(version = %self.analyser_version, "Checking analyses are up to date");

        let mut requeued = 0;
        for analysis in self.analyses.find_all().await? {
            if analysis.version.as_deref() == Some(self.analyser_version.as_str()) {
                continue;
            }
            info!(
                analysis_id = %analysis.id,
                current = analysis.version.as_deref().unwrap_or("none"),
                required = %self.analyser_version,
                "Analysis is out of date"
            );
            self.analyses
                .update(analysis.id, AnalysisPatch::pending())
                .await?;
            self.dispatch(analysis.id).await;
            requeued += 1;
        }

        info!(requeued, "Finished version check");
        Ok(requeued)
    }

    /// Delete an owner's analysis together with its stored upload.
    pub async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), AppError> {
        self.analyses.delete_for_owner(id, owner).await?;
        if let Err(e) = self.blobs.delete(&id.to_string()).await {
            warn!(analysis_id = %id, error = %e, "Failed to delete stored upload");
        }
        info!(analysis_id = %id, owner = %owner, "Deleted analysis");
        Ok(())
    }
}
