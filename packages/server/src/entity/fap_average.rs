use common::AverageStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rolling average over a user's successful analyses (one per user).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fap_average")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub user_id: Uuid,

    pub status: AverageStatus,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub average: Option<Json>,

    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,

    /// Fingerprint of the analysis set `average` was computed from.
    pub sha256: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
