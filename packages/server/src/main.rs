use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::storage::filesystem::FilesystemBlobStore;
use fap_server::config::AppConfig;
use fap_server::consumers::{consume_analysis_results, consume_average_results};
use fap_server::database::init_db;
use fap_server::state::AppState;
use fap_server::store::{SeaOrmAnalysisStore, SeaOrmAverageStore};
use mq::{BroccoliBus, MessageBus, MqConfig, init_mq};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;
    info!(analyser_version = %config.analyser.version, "FAP server starting");

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    info!("Database ready");

    let queue = Arc::new(
        init_mq(MqConfig {
            url: config.mq.url.clone(),
            pool_size: config.mq.pool_size,
        })
        .await
        .context("Failed to initialize MQ")?,
    );
    info!(
        analysis_request_queue = %config.mq.analysis_request_queue,
        analysis_result_queue = %config.mq.analysis_result_queue,
        average_request_queue = %config.mq.average_request_queue,
        average_result_queue = %config.mq.average_result_queue,
        "MQ connected"
    );
    let bus: Arc<dyn MessageBus> = Arc::new(BroccoliBus::new(
        queue,
        Duration::from_millis(config.mq.publish_timeout_ms),
    ));

    let blobs = Arc::new(
        FilesystemBlobStore::new(
            PathBuf::from(&config.storage.upload_dir),
            config.storage.file_extension.clone(),
            config.storage.max_file_size,
        )
        .await
        .context("Failed to initialize upload storage")?,
    );

    let state = AppState::new(
        config.clone(),
        Arc::new(SeaOrmAnalysisStore::new(db.clone())),
        Arc::new(SeaOrmAverageStore::new(db)),
        blobs,
        Arc::clone(&bus),
    );

    let requeued = state
        .orchestrator
        .requeue_outdated()
        .await
        .context("Failed to check analysis versions")?;
    info!(requeued, "Startup version check complete");

    let analysis_consumer = tokio::spawn(consume_analysis_results(
        Arc::clone(&state.reconciler),
        Arc::clone(&bus),
        config.mq.analysis_result_queue.clone(),
    ));
    let average_consumer = tokio::spawn(consume_average_results(
        Arc::clone(&state.reconciler),
        Arc::clone(&bus),
        config.mq.average_result_queue.clone(),
    ));

    tokio::select! {
        result = analysis_consumer => match result {
            Ok(Ok(())) => info!("Analysis result consumer stopped"),
            Ok(Err(e)) => error!(error = %e, "Analysis result consumer stopped unexpectedly"),
            Err(e) => error!(error = %e, "Analysis result consumer panicked"),
        },
        result = average_consumer => match result {
            Ok(Ok(())) => info!("Average result consumer stopped"),
            Ok(Err(e)) => error!(error = %e, "Average result consumer stopped unexpectedly"),
            Err(e) => error!(error = %e, "Average result consumer panicked"),
        },
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    Ok(())
}
