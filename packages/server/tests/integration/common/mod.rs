use std::io::{Cursor, Write};
use std::sync::Arc;

use common::storage::filesystem::FilesystemBlobStore;
use mq::{MemoryBus, MessageBus};
use serde_json::{Value, json};
use tempfile::TempDir;
use uuid::Uuid;

use fap_server::config::{AnalyserConfig, AppConfig, DatabaseConfig, MqAppConfig, StorageConfig};
use fap_server::consumers::{consume_analysis_results, consume_average_results};
use fap_server::entity::fap_analysis;
use fap_server::error::AppError;
use fap_server::state::AppState;
use fap_server::store::{AnalysisStore, MemoryAnalysisStore, MemoryAverageStore};

pub const ANALYSER_VERSION: &str = "1.0";

/// Largest upload the test blob store accepts.
pub const MAX_FILE_SIZE: u64 = 64 * 1024;

/// Whole pipeline over in-memory stores and an in-memory bus.
///
/// Both result consumers are subscribed, so `deliver_*` runs the same code
/// path a broker delivery would.
pub struct TestApp {
    pub state: AppState,
    pub bus: Arc<MemoryBus>,
    _upload_dir: TempDir,
}

pub fn test_config(upload_dir: &TempDir, version: &str) -> AppConfig {
    AppConfig {
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
        },
        mq: MqAppConfig::default(),
        analyser: AnalyserConfig {
            version: version.into(),
        },
        storage: StorageConfig {
            upload_dir: upload_dir.path().join("uploads").display().to_string(),
            max_file_size: MAX_FILE_SIZE,
            file_extension: "csv".into(),
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(ANALYSER_VERSION, Arc::new(MemoryAnalysisStore::new())).await
    }

    /// Spawn over a given analysis store, e.g. one seeded by an earlier run.
    pub async fn spawn_with(version: &str, analyses: Arc<dyn AnalysisStore>) -> Self {
        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
        let config = test_config(&upload_dir, version);

        let blobs = Arc::new(
            FilesystemBlobStore::new(
                upload_dir.path().join("uploads"),
                config.storage.file_extension.clone(),
                config.storage.max_file_size,
            )
            .await
            .expect("Failed to create blob store"),
        );
        let bus = Arc::new(MemoryBus::new());
        let dyn_bus: Arc<dyn MessageBus> = bus.clone();

        let state = AppState::new(
            config.clone(),
            analyses,
            Arc::new(MemoryAverageStore::new()),
            blobs,
            Arc::clone(&dyn_bus),
        );

        consume_analysis_results(
            Arc::clone(&state.reconciler),
            Arc::clone(&dyn_bus),
            config.mq.analysis_result_queue.clone(),
        )
        .await
        .expect("Failed to subscribe analysis results");
        consume_average_results(
            Arc::clone(&state.reconciler),
            dyn_bus,
            config.mq.average_result_queue.clone(),
        )
        .await
        .expect("Failed to subscribe average results");

        Self {
            state,
            bus,
            _upload_dir: upload_dir,
        }
    }

    pub async fn ingest(
        &self,
        data: &[u8],
        file_name: &str,
        owner: Option<Uuid>,
    ) -> Result<Vec<Uuid>, AppError> {
        self.state.orchestrator.ingest(data, file_name, owner).await
    }

    pub async fn analysis(&self, id: Uuid) -> fap_analysis::Model {
        self.state
            .analyses
            .find_by_id(id)
            .await
            .expect("Store lookup failed")
            .expect("Analysis not found")
    }

    /// Ids carried by every analysis request published so far.
    pub fn analysis_requests(&self) -> Vec<Uuid> {
        self.bus
            .published(&self.state.config.mq.analysis_request_queue)
            .into_iter()
            .map(|payload| {
                payload["id"]
                    .as_str()
                    .and_then(|id| id.parse().ok())
                    .expect("Analysis request without id")
            })
            .collect()
    }

    pub fn average_requests(&self) -> Vec<Value> {
        self.bus
            .published(&self.state.config.mq.average_request_queue)
    }

    pub async fn deliver_analysis_result(&self, payload: Value) {
        self.bus
            .deliver(&self.state.config.mq.analysis_result_queue, payload)
            .await
            .expect("Analysis result handler failed");
    }

    pub async fn deliver_average_result(&self, payload: Value) {
        self.bus
            .deliver(&self.state.config.mq.average_result_queue, payload)
            .await
            .expect("Average result handler failed");
    }

    /// Report a successful analysis for `id` with the given payload.
    pub async fn complete(&self, id: Uuid, analysis: Value) {
        self.deliver_analysis_result(json!({
            "analysisId": id,
            "status": "Success",
            "message": "ok",
            "analysis": analysis,
            "fapRegen": false,
        }))
        .await;
    }

    pub async fn fail(&self, id: Uuid) {
        self.deliver_analysis_result(json!({
            "analysisId": id,
            "status": "Failed",
            "message": "unreadable log",
            "analysis": null,
            "fapRegen": false,
        }))
        .await;
    }
}

/// Build a deflated ZIP archive in memory.
pub fn zip_of(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in files {
        writer
            .start_file(*name, options)
            .expect("Failed to start zip entry");
        writer.write_all(content).expect("Failed to write zip entry");
    }
    writer
        .finish()
        .expect("Failed to finish zip")
        .into_inner()
}

pub fn csv(rows: &str) -> Vec<u8> {
    format!("time,rpm,speed\n{rows}\n").into_bytes()
}
