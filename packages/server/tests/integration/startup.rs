use std::sync::Arc;

use common::AnalysisStatus;
use serde_json::json;
use uuid::Uuid;

use fap_server::models::analysis::{AnalysisPatch, NewAnalysis, PENDING_MESSAGE};
use fap_server::store::{AnalysisStore, MemoryAnalysisStore};

use crate::common::TestApp;

async fn finished(store: &MemoryAnalysisStore, sha: &str, version: Option<&str>) -> Uuid {
    let record = store
        .create(NewAnalysis {
            file_name: format!("{sha}.csv"),
            sha256: sha.into(),
            owner: Some(Uuid::new_v4()),
        })
        .await
        .unwrap();
    store
        .update(
            record.id,
            AnalysisPatch {
                status: Some(AnalysisStatus::Success),
                message: Some("ok".into()),
                analysis: Some(Some(json!({ "overall": {} }))),
                version: Some(version.map(str::to_string)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    record.id
}

mod version_scan {
    use super::*;

    #[tokio::test]
    async fn outdated_analyses_are_reset_and_requeued_once() {
        let store = Arc::new(MemoryAnalysisStore::new());
        let outdated = finished(&store, "aa", Some("1.0")).await;
        let current = finished(&store, "bb", Some("2.0")).await;
        let app = TestApp::spawn_with("2.0", store).await;

        let requeued = app.state.orchestrator.requeue_outdated().await.unwrap();

        assert_eq!(requeued, 1);
        assert_eq!(app.analysis_requests(), vec![outdated]);
        let reset = app.analysis(outdated).await;
        assert_eq!(reset.status, AnalysisStatus::Processing);
        assert_eq!(reset.message, PENDING_MESSAGE);
        assert_eq!(app.analysis(current).await.status, AnalysisStatus::Success);
    }

    #[tokio::test]
    async fn requeued_result_is_stamped_with_the_new_version() {
        let store = Arc::new(MemoryAnalysisStore::new());
        let outdated = finished(&store, "aa", Some("1.0")).await;
        let app = TestApp::spawn_with("2.0", store).await;

        app.state.orchestrator.requeue_outdated().await.unwrap();
        app.complete(outdated, json!({ "overall": { "distance_km": 1 } }))
            .await;
        app.bus.clear();

        assert_eq!(app.analysis(outdated).await.version.as_deref(), Some("2.0"));
        assert_eq!(app.state.orchestrator.requeue_outdated().await.unwrap(), 0);
        assert!(app.analysis_requests().is_empty());
    }

    #[tokio::test]
    async fn never_analysed_records_are_requeued() {
        let store = Arc::new(MemoryAnalysisStore::new());
        let pending = store
            .create(NewAnalysis {
                file_name: "lost.csv".into(),
                sha256: "cc".into(),
                owner: None,
            })
            .await
            .unwrap();
        let app = TestApp::spawn_with("2.0", store).await;

        assert_eq!(app.state.orchestrator.requeue_outdated().await.unwrap(), 1);
        assert_eq!(app.analysis_requests(), vec![pending.id]);
    }

    #[tokio::test]
    async fn scan_survives_an_unavailable_bus() {
        let store = Arc::new(MemoryAnalysisStore::new());
        let outdated = finished(&store, "aa", Some("1.0")).await;
        let app = TestApp::spawn_with("2.0", store).await;
        app.bus.set_unavailable(true);

        assert_eq!(app.state.orchestrator.requeue_outdated().await.unwrap(), 1);
        assert_eq!(
            app.analysis(outdated).await.status,
            AnalysisStatus::Processing
        );
    }
}
