use std::sync::Arc;

use common::storage::BlobStore;
use mq::MessageBus;

use crate::config::AppConfig;
use crate::consumers::ResultReconciler;
use crate::pipeline::{AnalysisOrchestrator, AverageAggregator};
use crate::store::{AnalysisStore, AverageStore};

/// Fully wired pipeline shared by the consumers and any caller that ingests.
#[derive(Clone)]
pub struct AppState {
    pub analyses: Arc<dyn AnalysisStore>,
    pub averages: Arc<dyn AverageStore>,
    pub bus: Arc<dyn MessageBus>,
    pub orchestrator: Arc<AnalysisOrchestrator>,
    pub aggregator: Arc<AverageAggregator>,
    pub reconciler: Arc<ResultReconciler>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        analyses: Arc<dyn AnalysisStore>,
        averages: Arc<dyn AverageStore>,
        blobs: Arc<dyn BlobStore>,
        bus: Arc<dyn MessageBus>,
    ) -> Self {
        let orchestrator = Arc::new(AnalysisOrchestrator::new(
            Arc::clone(&analyses),
            blobs,
            Arc::clone(&bus),
            config.mq.analysis_request_queue.clone(),
            config.storage.file_extension.clone(),
            config.analyser.version.clone(),
        ));
        let aggregator = Arc::new(AverageAggregator::new(
            Arc::clone(&analyses),
            Arc::clone(&averages),
            Arc::clone(&bus),
            config.mq.average_request_queue.clone(),
        ));
        let reconciler = Arc::new(ResultReconciler::new(
            Arc::clone(&analyses),
            Arc::clone(&averages),
            Arc::clone(&aggregator),
            config.analyser.version.clone(),
        ));

        Self {
            analyses,
            averages,
            bus,
            orchestrator,
            aggregator,
            reconciler,
            config,
        }
    }
}
