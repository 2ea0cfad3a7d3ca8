use std::sync::Arc;

use common::average_result::AverageResult;
use mq::{MessageBus, MqError, handler};
use serde_json::Value;
use tracing::{error, info};

use super::ResultReconciler;
use crate::error::AppError;
use crate::models::average::AveragePatch;

impl ResultReconciler {
    /// Store an average computed by the worker. No further side effects.
    pub async fn handle_average_result(&self, result: AverageResult) -> Result<(), AppError> {
        let owner = result.user_id;
        let patch = AveragePatch {
            status: Some(result.status.into()),
            message: Some(result.message),
            average: Some(match result.average {
                Value::Null => None,
                average => Some(average),
            }),
            sha256: Some(Some(result.analysis_sha)),
        };

        match self.averages.update(owner, patch).await {
            Ok(updated) => {
                info!(owner = %owner, status = %updated.status, "Applied average result");
                Ok(())
            }
            Err(AppError::NotFound(_)) => {
                error!(owner = %owner, "Average result for unknown user, dropping");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Feed average results from `queue_name` into the reconciler.
pub async fn consume_average_results(
    reconciler: Arc<ResultReconciler>,
    bus: Arc<dyn MessageBus>,
    queue_name: String,
) -> Result<(), MqError> {
    info!(queue = %queue_name, "Starting average result consumer");

    let on_message = handler(move |payload: Value| {
        let reconciler = Arc::clone(&reconciler);
        async move {
            let result: AverageResult = match serde_json::from_value(payload) {
                Ok(result) => result,
                Err(e) => {
                    error!(error = %e, "Dropping undecodable average result");
                    return Ok(());
                }
            };
            let owner = result.user_id;

            reconciler.handle_average_result(result).await.map_err(|e| {
                error!(owner = %owner, error = %e, "Failed to process average result");
                MqError::Handler(e.to_string())
            })
        }
    });

    bus.subscribe(&queue_name, on_message).await
}
