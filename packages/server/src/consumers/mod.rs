pub mod analysis_result;
pub mod average_result;
mod reconciler;

pub use analysis_result::consume_analysis_results;
pub use average_result::consume_average_results;
pub use reconciler::ResultReconciler;
