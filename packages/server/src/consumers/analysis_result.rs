use std::sync::Arc;

use common::AnalysisStatus;
use common::analysis_result::{AnalysisOutcome, AnalysisResult};
use mq::{MessageBus, MqError, handler};
use serde_json::Value;
use tracing::{debug, error, info};

use super::ResultReconciler;
use crate::error::AppError;
use crate::models::analysis::AnalysisPatch;

pub const MISSING_PAYLOAD_MESSAGE: &str = "Analysis result payload missing";
const DEFAULT_SUCCESS_MESSAGE: &str = "Analysis completed";
const DEFAULT_FAILURE_MESSAGE: &str = "Analysis failed";

impl ResultReconciler {
    /// Apply an analysis result, then reconcile the owner's average.
    ///
    /// Results for unknown ids are logged and acknowledged.
    pub async fn handle_analysis_result(&self, result: AnalysisResult) -> Result<(), AppError> {
        let analysis_id = result.analysis_id;
        let patch = result_patch(result, &self.analyser_version);

        let updated = match self.analyses.update(analysis_id, patch).await {
            Ok(updated) => updated,
            Err(AppError::NotFound(_)) => {
                error!(analysis_id = %analysis_id, "Result for unknown analysis, dropping");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        info!(
            analysis_id = %analysis_id,
            status = %updated.status,
            version = %self.analyser_version,
            "Applied analysis result"
        );

        if let Some(owner) = updated.user_id {
            let outcome = self.aggregator.reconcile(owner).await?;
            debug!(owner = %owner, ?outcome, "Reconciled average");
        }
        Ok(())
    }
}

/// Translate a worker result into a record update.
///
/// A `Success` without payload is stored as `Failed`, and an empty message
/// is replaced so finished analyses always carry one.
fn result_patch(result: AnalysisResult, analyser_version: &str) -> AnalysisPatch {
    let log_date = result.parsed_log_date();
    let distance = result.resolved_distance();

    let (status, message, analysis) = match result.status {
        AnalysisOutcome::Success if result.analysis.is_null() => (
            AnalysisStatus::Failed,
            MISSING_PAYLOAD_MESSAGE.to_string(),
            None,
        ),
        outcome => {
            let message = if result.message.trim().is_empty() {
                match outcome {
                    AnalysisOutcome::Success => DEFAULT_SUCCESS_MESSAGE,
                    AnalysisOutcome::Failed => DEFAULT_FAILURE_MESSAGE,
                }
                .to_string()
            } else {
                result.message
            };
            let analysis = match result.analysis {
                Value::Null => None,
                payload => Some(payload),
            };
            (outcome.into(), message, analysis)
        }
    };

    AnalysisPatch {
        status: Some(status),
        message: Some(message),
        analysis: Some(analysis),
        log_date: Some(log_date),
        fap_regen: Some(result.fap_regen),
        distance: Some(distance),
        version: Some(Some(analyser_version.to_string())),
    }
}

/// Feed analysis results from `queue_name` into the reconciler.
///
/// Undecodable payloads are logged and acknowledged. Other failures are
/// handed back to the bus for redelivery.
pub async fn consume_analysis_results(
    reconciler: Arc<ResultReconciler>,
    bus: Arc<dyn MessageBus>,
    queue_name: String,
) -> Result<(), MqError> {
    info!(queue = %queue_name, "Starting analysis result consumer");

    let on_message = handler(move |payload: Value| {
        let reconciler = Arc::clone(&reconciler);
        async move {
            let result: AnalysisResult = match serde_json::from_value(payload) {
                Ok(result) => result,
                Err(e) => {
                    error!(error = %e, "Dropping undecodable analysis result");
                    return Ok(());
                }
            };
            let analysis_id = result.analysis_id;

            reconciler
                .handle_analysis_result(result)
                .await
                .map_err(|e| {
                    error!(
                        analysis_id = %analysis_id,
                        error = %e,
                        "Failed to process analysis result"
                    );
                    MqError::Handler(e.to_string())
                })
        }
    });

    bus.subscribe(&queue_name, on_message).await
}
