use std::sync::Arc;

use crate::pipeline::AverageAggregator;
use crate::store::{AnalysisStore, AverageStore};

/// Applies worker results to the stores.
///
/// Every handler is idempotent: re-applying a result writes the same
/// fields, and the follow-up reconcile is a no-op once the average is
/// current.
pub struct ResultReconciler {
    pub(super) analyses: Arc<dyn AnalysisStore>,
    pub(super) averages: Arc<dyn AverageStore>,
    pub(super) aggregator: Arc<AverageAggregator>,
    /// Stamped on every analysis result applied.
    pub(super) analyser_version: String,
}

impl ResultReconciler {
    pub fn new(
        analyses: Arc<dyn AnalysisStore>,
        averages: Arc<dyn AverageStore>,
        aggregator: Arc<AverageAggregator>,
        analyser_version: impl Into<String>,
    ) -> Self {
        Self {
            analyses,
            averages,
            aggregator,
            analyser_version: analyser_version.into(),
        }
    }
}
