use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ANALYSIS_NOT_FOUND, AnalysisStore, AverageStore, average_not_found};
use crate::entity::{fap_analysis, fap_average};
use crate::error::AppError;
use crate::models::analysis::{
    AnalysisPage, AnalysisPatch, AnalysisQuery, NewAnalysis, SortField, SortOrder,
};
use crate::models::average::{AveragePatch, empty_average};
use crate::models::shared::Pagination;

/// In-memory analysis store keyed by id.
///
/// Ids are UUIDv7, so map order is creation order.
#[derive(Default)]
pub struct MemoryAnalysisStore {
    records: RwLock<BTreeMap<Uuid, fap_analysis::Model>>,
}

impl MemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn compare(a: &fap_analysis::Model, b: &fap_analysis::Model, query: &AnalysisQuery) -> Ordering {
    let primary = match query.sort_by {
        SortField::FileName => a.file_name.cmp(&b.file_name),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    let ordering = primary.then_with(|| a.id.cmp(&b.id));
    match query.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn create(&self, new: NewAnalysis) -> Result<fap_analysis::Model, AppError> {
        let mut records = self.records.write().await;
        if new.owner.is_some()
            && records
                .values()
                .any(|r| r.user_id == new.owner && r.sha256 == new.sha256)
        {
            return Err(AppError::Conflict(format!(
                "analysis with sha256 {} already exists for this user",
                new.sha256
            )));
        }
        let model = new.into_model(Utc::now());
        records.insert(model.id, model.clone());
        Ok(model)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<fap_analysis::Model>, AppError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_by_owner_and_hash(
        &self,
        owner: Option<Uuid>,
        sha256: &str,
    ) -> Result<Option<fap_analysis::Model>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|r| r.user_id == owner && r.sha256 == sha256)
            .cloned())
    }

    async fn find_all_by_owner(&self, owner: Uuid) -> Result<Vec<fap_analysis::Model>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.user_id == Some(owner))
            .cloned()
            .collect())
    }

    async fn find_page_by_owner(
        &self,
        owner: Uuid,
        query: &AnalysisQuery,
    ) -> Result<AnalysisPage, AppError> {
        query.validate()?;

        let mut owned = self.find_all_by_owner(owner).await?;
        owned.sort_by(|a, b| compare(a, b, query));
        let total = owned.len() as u64;

        let data = owned
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();

        Ok(AnalysisPage {
            data,
            pagination: Pagination::new(query.page, query.limit, total),
        })
    }

    async fn find_all(&self) -> Result<Vec<fap_analysis::Model>, AppError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: AnalysisPatch,
    ) -> Result<fap_analysis::Model, AppError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(ANALYSIS_NOT_FOUND.into()))?;
        patch.apply(record, Utc::now());
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.records.write().await.remove(&id).is_some())
    }
}

/// In-memory average store keyed by owner.
#[derive(Default)]
pub struct MemoryAverageStore {
    averages: RwLock<BTreeMap<Uuid, fap_average::Model>>,
}

impl MemoryAverageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AverageStore for MemoryAverageStore {
    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<fap_average::Model>, AppError> {
        Ok(self.averages.read().await.get(&owner).cloned())
    }

    async fn create_for_owner(&self, owner: Uuid) -> Result<fap_average::Model, AppError> {
        let mut averages = self.averages.write().await;
        if averages.contains_key(&owner) {
            return Err(AppError::Conflict(format!(
                "average already exists for user {owner}"
            )));
        }
        let model = empty_average(owner, Utc::now());
        averages.insert(owner, model.clone());
        Ok(model)
    }

    async fn update(
        &self,
        owner: Uuid,
        patch: AveragePatch,
    ) -> Result<fap_average::Model, AppError> {
        let mut averages = self.averages.write().await;
        let average = averages
            .get_mut(&owner)
            .ok_or_else(|| average_not_found(owner))?;
        patch.apply(average, Utc::now());
        Ok(average.clone())
    }
}
