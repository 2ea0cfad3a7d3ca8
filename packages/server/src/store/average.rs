use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use super::{AverageStore, average_not_found};
use crate::entity::fap_average;
use crate::error::AppError;
use crate::models::average::{AveragePatch, empty_average};

/// Per-user averages in the `fap_average` table.
#[derive(Clone)]
pub struct SeaOrmAverageStore {
    db: DatabaseConnection,
}

impl SeaOrmAverageStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AverageStore for SeaOrmAverageStore {
    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<fap_average::Model>, AppError> {
        Ok(fap_average::Entity::find()
            .filter(fap_average::Column::UserId.eq(owner))
            .one(&self.db)
            .await?)
    }

    async fn create_for_owner(&self, owner: Uuid) -> Result<fap_average::Model, AppError> {
        let model = empty_average(owner, Utc::now());
        Ok(model.into_active_model().insert(&self.db).await?)
    }

    async fn update(
        &self,
        owner: Uuid,
        patch: AveragePatch,
    ) -> Result<fap_average::Model, AppError> {
        let current = self
            .find_by_owner(owner)
            .await?
            .ok_or_else(|| average_not_found(owner))?;

        patch
            .into_active_model(current.id, Utc::now())
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => average_not_found(owner),
                other => other.into(),
            })
    }
}
