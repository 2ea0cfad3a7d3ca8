use common::{AnalysisStatus, AverageStatus};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::json;
use uuid::Uuid;

use fap_server::database::sync_schema;
use fap_server::error::AppError;
use fap_server::models::analysis::{AnalysisPatch, AnalysisQuery, NewAnalysis, SortField, SortOrder};
use fap_server::models::average::AveragePatch;
use fap_server::store::{AnalysisStore, AverageStore, SeaOrmAnalysisStore, SeaOrmAverageStore};

/// Fresh in-memory SQLite database with the schema applied.
async fn sqlite() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    // Every pooled connection would otherwise get its own empty database.
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt)
        .await
        .expect("Failed to open SQLite database");
    sync_schema(&db).await.expect("Failed to sync schema");
    db
}

fn upload(name: &str, sha: &str, owner: Option<Uuid>) -> NewAnalysis {
    NewAnalysis {
        file_name: name.into(),
        sha256: sha.into(),
        owner,
    }
}

mod analyses {
    use super::*;

    #[tokio::test]
    async fn create_and_find_by_owner_and_hash() {
        let store = SeaOrmAnalysisStore::new(sqlite().await);
        let owner = Some(Uuid::new_v4());

        let created = store.create(upload("a.csv", "aa", owner)).await.unwrap();

        let found = store.find_by_owner_and_hash(owner, "aa").await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(created.id));
        assert!(store
            .find_by_owner_and_hash(Some(Uuid::new_v4()), "aa")
            .await
            .unwrap()
            .is_none());
        assert!(store.find_by_owner_and_hash(None, "aa").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_owner_and_hash_is_a_conflict() {
        let store = SeaOrmAnalysisStore::new(sqlite().await);
        let owner = Some(Uuid::new_v4());
        store.create(upload("a.csv", "aa", owner)).await.unwrap();

        let err = store.create(upload("b.csv", "aa", owner)).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn anonymous_duplicates_are_allowed() {
        let store = SeaOrmAnalysisStore::new(sqlite().await);
        store.create(upload("a.csv", "aa", None)).await.unwrap();
        store.create(upload("a.csv", "aa", None)).await.unwrap();
        assert_eq!(store.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_round_trips_every_field() {
        let store = SeaOrmAnalysisStore::new(sqlite().await);
        let created = store.create(upload("a.csv", "aa", None)).await.unwrap();

        let updated = store
            .update(
                created.id,
                AnalysisPatch {
                    status: Some(AnalysisStatus::Success),
                    message: Some("ok".into()),
                    analysis: Some(Some(json!({ "overall": { "distance_km": 12 } }))),
                    fap_regen: Some(true),
                    distance: Some(Some(12.0)),
                    version: Some(Some("1.0".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reloaded = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, AnalysisStatus::Success);
        assert_eq!(reloaded.analysis, updated.analysis);
        assert_eq!(reloaded.distance, Some(12.0));
        assert!(reloaded.fap_regen);
        assert_eq!(reloaded.version.as_deref(), Some("1.0"));
        assert_eq!(reloaded.file_name, "a.csv");
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let store = SeaOrmAnalysisStore::new(sqlite().await);
        let err = store
            .update(Uuid::new_v4(), AnalysisPatch::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn pages_are_owner_scoped_and_sorted() {
        let store = SeaOrmAnalysisStore::new(sqlite().await);
        let owner = Uuid::new_v4();
        for (name, sha) in [("c.csv", "1"), ("a.csv", "2"), ("b.csv", "3")] {
            store.create(upload(name, sha, Some(owner))).await.unwrap();
        }
        store
            .create(upload("z.csv", "4", Some(Uuid::new_v4())))
            .await
            .unwrap();

        let page = store
            .find_page_by_owner(
                owner,
                &AnalysisQuery {
                    page: 1,
                    limit: 2,
                    sort_by: SortField::FileName,
                    order: SortOrder::Desc,
                },
            )
            .await
            .unwrap();

        let names: Vec<_> = page.data.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, ["c.csv", "b.csv"]);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn owner_listing_follows_creation_order() {
        let store = SeaOrmAnalysisStore::new(sqlite().await);
        let owner = Uuid::new_v4();
        let mut expected = Vec::new();
        for sha in ["x", "y", "z"] {
            expected.push(store.create(upload("f.csv", sha, Some(owner))).await.unwrap().id);
        }

        let ids: Vec<_> = store
            .find_all_by_owner(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn delete_for_owner_checks_ownership() {
        let store = SeaOrmAnalysisStore::new(sqlite().await);
        let owner = Uuid::new_v4();
        let created = store.create(upload("a.csv", "aa", Some(owner))).await.unwrap();

        assert!(matches!(
            store.delete_for_owner(created.id, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        store.delete_for_owner(created.id, owner).await.unwrap();
        assert!(store.find_by_id(created.id).await.unwrap().is_none());
    }
}

mod averages {
    use super::*;

    #[tokio::test]
    async fn one_average_per_owner() {
        let store = SeaOrmAverageStore::new(sqlite().await);
        let owner = Uuid::new_v4();

        let created = store.create_for_owner(owner).await.unwrap();
        assert_eq!(created.status, AverageStatus::Calculating);
        assert!(matches!(
            store.create_for_owner(owner).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn update_applies_result() {
        let store = SeaOrmAverageStore::new(sqlite().await);
        let owner = Uuid::new_v4();
        store.create_for_owner(owner).await.unwrap();

        store
            .update(
                owner,
                AveragePatch {
                    status: Some(AverageStatus::Success),
                    average: Some(Some(json!({ "distance_km": 10 }))),
                    message: Some(None),
                    sha256: Some(Some("ab".into())),
                },
            )
            .await
            .unwrap();

        let average = store.find_by_owner(owner).await.unwrap().unwrap();
        assert_eq!(average.status, AverageStatus::Success);
        assert_eq!(average.average, Some(json!({ "distance_km": 10 })));
        assert_eq!(average.sha256.as_deref(), Some("ab"));
    }

    #[tokio::test]
    async fn update_without_average_is_not_found() {
        let store = SeaOrmAverageStore::new(sqlite().await);
        assert!(matches!(
            store.update(Uuid::new_v4(), AveragePatch::calculating()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
