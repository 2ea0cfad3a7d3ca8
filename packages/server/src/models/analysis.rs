use chrono::{DateTime, Utc};
use common::AnalysisStatus;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveValue, Value as DbValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::entity::fap_analysis;
use crate::error::AppError;
use crate::models::shared::Pagination;

/// Message stored while an analysis waits for the worker.
pub const PENDING_MESSAGE: &str = "Analysis pending";

/// Largest page size accepted by paginated listings.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Fields supplied when a new upload is accepted.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub file_name: String,
    pub sha256: String,
    pub owner: Option<Uuid>,
}

impl NewAnalysis {
    /// Build the initial `Processing` record with a fresh time-ordered id.
    pub fn into_model(self, now: DateTime<Utc>) -> fap_analysis::Model {
        fap_analysis::Model {
            id: Uuid::now_v7(),
            file_name: self.file_name,
            sha256: self.sha256,
            status: AnalysisStatus::Processing,
            message: PENDING_MESSAGE.to_string(),
            analysis: None,
            log_date: None,
            fap_regen: false,
            distance: None,
            version: None,
            user_id: self.owner,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of an analysis.
///
/// `None` leaves a field untouched; `Some(None)` on a nullable field clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisPatch {
    pub status: Option<AnalysisStatus>,
    pub message: Option<String>,
    pub analysis: Option<Option<Value>>,
    pub log_date: Option<Option<DateTime<Utc>>>,
    pub fap_regen: Option<bool>,
    pub distance: Option<Option<f64>>,
    pub version: Option<Option<String>>,
}

impl AnalysisPatch {
    /// Reset to `Processing` with the pending message.
    pub fn pending() -> Self {
        Self {
            status: Some(AnalysisStatus::Processing),
            message: Some(PENDING_MESSAGE.to_string()),
            ..Default::default()
        }
    }

    pub fn apply(self, model: &mut fap_analysis::Model, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            model.status = status;
        }
        if let Some(message) = self.message {
            model.message = message;
        }
        if let Some(analysis) = self.analysis {
            model.analysis = analysis;
        }
        if let Some(log_date) = self.log_date {
            model.log_date = log_date;
        }
        if let Some(fap_regen) = self.fap_regen {
            model.fap_regen = fap_regen;
        }
        if let Some(distance) = self.distance {
            model.distance = distance;
        }
        if let Some(version) = self.version {
            model.version = version;
        }
        model.updated_at = now;
    }

    pub fn into_active_model(self, id: Uuid, now: DateTime<Utc>) -> fap_analysis::ActiveModel {
        fap_analysis::ActiveModel {
            id: Set(id),
            status: set_some(self.status),
            message: set_some(self.message),
            analysis: set_some(self.analysis),
            log_date: set_some(self.log_date),
            fap_regen: set_some(self.fap_regen),
            distance: set_some(self.distance),
            version: set_some(self.version),
            updated_at: Set(now),
            ..Default::default()
        }
    }
}

pub(crate) fn set_some<V: Into<DbValue>>(value: Option<V>) -> ActiveValue<V> {
    match value {
        Some(v) => Set(v),
        None => NotSet,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    FileName,
    #[default]
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Paging and ordering of an owner's analysis history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisQuery {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub order: SortOrder,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    10
}

impl Default for AnalysisQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            sort_by: SortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl AnalysisQuery {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.page == 0 {
            return Err(AppError::Validation("page must be >= 1".into()));
        }
        if self.limit == 0 || self.limit > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        // OFFSET is a signed 64-bit value on Postgres.
        let offset_fits = (self.page - 1)
            .checked_mul(self.limit)
            .is_some_and(|offset| offset <= i64::MAX as u64);
        if !offset_fits {
            return Err(AppError::Validation("page is out of range".into()));
        }
        Ok(())
    }

    /// Row offset of the first record on this page. Call after `validate`.

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// One page of an owner's analyses.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisPage {
    pub data: Vec<fap_analysis::Model>,
    pub pagination: Pagination,
}
