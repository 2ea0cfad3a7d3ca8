pub mod analysis_job;
pub mod analysis_result;
pub mod analysis_status;
pub mod average_job;
pub mod average_result;
pub mod config;
pub mod payload;
pub mod storage;

pub use analysis_status::{AnalysisStatus, AverageStatus};
