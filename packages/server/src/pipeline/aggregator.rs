use std::sync::Arc;

use common::AnalysisStatus;
use common::average_job::AverageRequest;
use common::payload::fingerprint_list;
use mq::{MessageBus, MessageBusExt};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entity::fap_average;
use crate::error::AppError;
use crate::models::average::AveragePatch;
use crate::store::{AnalysisStore, AverageStore};

/// What a call to [`AverageAggregator::reconcile`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// At least one analysis is still `Processing`.
    AnalysesPending,
    /// No successful analysis to aggregate.
    NothingToAggregate,
    /// The stored average already covers the current analysis set.
    UpToDate,
    /// An average request was published for this fingerprint.
    Requested { fingerprint: String },
    /// Publishing failed; the next reconcile retries.
    PublishFailed,
}

/// Keeps each owner's average in line with their successful analyses.
pub struct AverageAggregator {
    analyses: Arc<dyn AnalysisStore>,
    averages: Arc<dyn AverageStore>,
    bus: Arc<dyn MessageBus>,
    request_queue: String,
}

impl AverageAggregator {
    pub fn new(
        analyses: Arc<dyn AnalysisStore>,
        averages: Arc<dyn AverageStore>,
        bus: Arc<dyn MessageBus>,
        request_queue: impl Into<String>,
    ) -> Self {
        Self {
            analyses,
            averages,
            bus,
            request_queue: request_queue.into(),
        }
    }

    /// Request a new average for `owner` if their successful analyses
    /// changed since the stored one was computed.
    ///
    /// Derived only from store contents, so it is safe to call redundantly
    /// and in any order.
    pub async fn reconcile(&self, owner: Uuid) -> Result<ReconcileOutcome, AppError> {
        let analyses = self.analyses.find_all_by_owner(owner).await?;

        if analyses
            .iter()
            .any(|a| a.status == AnalysisStatus::Processing)
        {
            debug!(owner = %owner, "Analyses still processing, skipping average");
            return Ok(ReconcileOutcome::AnalysesPending);
        }

        let payloads: Vec<Value> = analyses
            .into_iter()
            .filter(|a| a.status == AnalysisStatus::Success)
            .filter_map(|a| a.analysis)
            .collect();
        if payloads.is_empty() {
            debug!(owner = %owner, "No successful analyses to average");
            return Ok(ReconcileOutcome::NothingToAggregate);
        }

        let candidate = fingerprint_list(&payloads).to_hex();

        let current = self.average_for(owner).await?;
        if current.sha256.as_deref() == Some(candidate.as_str()) {
            debug!(owner = %owner, fingerprint = %candidate, "Average is up to date");
            return Ok(ReconcileOutcome::UpToDate);
        }

        let request = AverageRequest {
            user_id: owner,
            analysis_sha: candidate.clone(),
            analysis: payloads,
        };
        if let Err(e) = self
            .bus
            .publish_message(&self.request_queue, &request)
            .await
        {
            warn!(owner = %owner, error = %e, "Failed to publish average request");
            return Ok(ReconcileOutcome::PublishFailed);
        }

        self.averages
            .update(owner, AveragePatch::calculating())
            .await?;
        info!(owner = %owner, fingerprint = %candidate, "Requested average calculation");

        Ok(ReconcileOutcome::Requested {
            fingerprint: candidate,
        })
    }

    /// The owner's average, created empty on first use.
    async fn average_for(&self, owner: Uuid) -> Result<fap_average::Model, AppError> {
        if let Some(average) = self.averages.find_by_owner(owner).await? {
            return Ok(average);
        }
        match self.averages.create_for_owner(owner).await {
            Ok(average) => Ok(average),
            Err(AppError::Conflict(_)) => self
                .averages
                .find_by_owner(owner)
                .await?
                .ok_or_else(|| AppError::Internal(format!("average for {owner} vanished"))),
            Err(e) => Err(e),
        }
    }
}
