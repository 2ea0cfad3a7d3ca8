use common::AnalysisStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One uploaded diagnostic log and the state of its analysis.
///
/// `(user_id, sha256)` is unique. NULL owners never collide, so anonymous
/// uploads of the same content stay separate records.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fap_analysis")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub file_name: String,

    /// Hex SHA-256 of the uploaded bytes.
    #[sea_orm(unique_key = "owner_sha256")]
    pub sha256: String,

    pub status: AnalysisStatus,
    pub message: String,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub analysis: Option<Json>,

    pub log_date: Option<DateTimeUtc>,
    pub fap_regen: bool,
    pub distance: Option<f64>,

    /// Analyser version that produced the stored result.
    pub version: Option<String>,

    /// NULL for anonymous uploads.
    #[sea_orm(unique_key = "owner_sha256")]
    pub user_id: Option<Uuid>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
