use std::time::Duration;

use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder, SqliteQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr};
use tracing::{info, warn};

use crate::entity::fap_analysis;

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    sync_schema(&db).await?;

    Ok(db)
}

/// Create or migrate the entity tables, then the secondary indexes.
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_registry("fap_server::entity::*")
        .sync(db)
        .await?;
    ensure_indexes(db).await;
    Ok(())
}

/// Create composite indexes that entity attributes cannot express.
///
/// Failures are logged; the indexes only affect query speed.
pub async fn ensure_indexes(db: &DatabaseConnection) {
    // Owner history listing:
    // SELECT ... FROM fap_analysis WHERE user_id = ? ORDER BY created_at
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_fap_analysis_user_created")
        .table(fap_analysis::Entity)
        .col(fap_analysis::Column::UserId)
        .col(fap_analysis::Column::CreatedAt)
        .to_owned();

    match execute_index(db, &stmt).await {
        Ok(()) => info!("Ensured index idx_fap_analysis_user_created exists"),
        Err(e) => warn!("Failed to create index idx_fap_analysis_user_created: {}", e),
    }
}

async fn execute_index(db: &DatabaseConnection, stmt: &IndexCreateStatement) -> Result<(), DbErr> {
    let sql = match db.get_database_backend() {
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        _ => stmt.to_string(PostgresQueryBuilder),
    };
    db.execute_unprepared(&sql).await?;
    Ok(())
}
