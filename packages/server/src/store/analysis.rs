use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use super::{ANALYSIS_NOT_FOUND, AnalysisStore};
use crate::entity::fap_analysis;
use crate::error::AppError;
use crate::models::analysis::{
    AnalysisPage, AnalysisPatch, AnalysisQuery, NewAnalysis, SortField, SortOrder,
};
use crate::models::shared::Pagination;

/// Analysis records in the `fap_analysis` table.
#[derive(Clone)]
pub struct SeaOrmAnalysisStore {
    db: DatabaseConnection,
}

impl SeaOrmAnalysisStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn owned_by(owner: Option<Uuid>) -> Select<fap_analysis::Entity> {
    let select = fap_analysis::Entity::find();
    match owner {
        Some(owner) => select.filter(fap_analysis::Column::UserId.eq(owner)),
        None => select.filter(fap_analysis::Column::UserId.is_null()),
    }
}

#[async_trait]
impl AnalysisStore for SeaOrmAnalysisStore {
    async fn create(&self, new: NewAnalysis) -> Result<fap_analysis::Model, AppError> {
        let model = new.into_model(Utc::now());
        Ok(model.into_active_model().insert(&self.db).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<fap_analysis::Model>, AppError> {
        Ok(fap_analysis::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_owner_and_hash(
        &self,
        owner: Option<Uuid>,
        sha256: &str,
    ) -> Result<Option<fap_analysis::Model>, AppError> {
        Ok(owned_by(owner)
            .filter(fap_analysis::Column::Sha256.eq(sha256))
            .order_by_asc(fap_analysis::Column::Id)
            .one(&self.db)
            .await?)
    }

    async fn find_all_by_owner(&self, owner: Uuid) -> Result<Vec<fap_analysis::Model>, AppError> {
        Ok(owned_by(Some(owner))
            .order_by_asc(fap_analysis::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_page_by_owner(
        &self,
        owner: Uuid,
        query: &AnalysisQuery,
    ) -> Result<AnalysisPage, AppError> {
        query.validate()?;

        let base_select = owned_by(Some(owner));
        let total = base_select.clone().count(&self.db).await?;

        let sort_order = match query.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        let sort_column = match query.sort_by {
            SortField::FileName => fap_analysis::Column::FileName,
            SortField::CreatedAt => fap_analysis::Column::CreatedAt,
        };

        let data = base_select
            .order_by(sort_column, sort_order.clone())
            .order_by(fap_analysis::Column::Id, sort_order)
            .offset(Some(query.offset()))
            .limit(Some(query.limit))
            .all(&self.db)
            .await?;

        Ok(AnalysisPage {
            data,
            pagination: Pagination::new(query.page, query.limit, total),
        })
    }

    async fn find_all(&self) -> Result<Vec<fap_analysis::Model>, AppError> {
        Ok(fap_analysis::Entity::find()
            .order_by_asc(fap_analysis::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: AnalysisPatch,
    ) -> Result<fap_analysis::Model, AppError> {
        patch
            .into_active_model(id, Utc::now())
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => {
                    AppError::NotFound(ANALYSIS_NOT_FOUND.into())
                }
                other => other.into(),
            })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = fap_analysis::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
