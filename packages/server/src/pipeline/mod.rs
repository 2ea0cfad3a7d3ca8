//! Ingestion and average reconciliation.

mod aggregator;
mod orchestrator;

pub use aggregator::{AverageAggregator, ReconcileOutcome};
pub use orchestrator::AnalysisOrchestrator;
