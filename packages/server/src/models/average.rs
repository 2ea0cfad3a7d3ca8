use chrono::{DateTime, Utc};
use common::AverageStatus;
use sea_orm::ActiveValue::Set;
use serde_json::Value;
use uuid::Uuid;

use crate::entity::fap_average;
use crate::models::analysis::set_some;

/// Message stored while an average request is in flight.
pub const CALCULATING_MESSAGE: &str = "Average calculation pending";

/// Fresh `Calculating` average with no result and no fingerprint.
pub fn empty_average(owner: Uuid, now: DateTime<Utc>) -> fap_average::Model {
    fap_average::Model {
        id: Uuid::now_v7(),
        user_id: owner,
        status: AverageStatus::Calculating,
        average: None,
        message: None,
        sha256: None,
        created_at: now,
        updated_at: now,
    }
}

/// Partial update of a user's average. Same conventions as
/// [`AnalysisPatch`](crate::models::analysis::AnalysisPatch).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AveragePatch {
    pub status: Option<AverageStatus>,
    pub average: Option<Option<Value>>,
    pub message: Option<Option<String>>,
    pub sha256: Option<Option<String>>,
}

impl AveragePatch {
    /// Mark a request as in flight. The stored result and its fingerprint
    /// stay until the worker answers.
    pub fn calculating() -> Self {
        Self {
            status: Some(AverageStatus::Calculating),
            message: Some(Some(CALCULATING_MESSAGE.to_string())),
            ..Default::default()
        }
    }

    pub fn apply(self, model: &mut fap_average::Model, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            model.status = status;
        }
        if let Some(average) = self.average {
            model.average = average;
        }
        if let Some(message) = self.message {
            model.message = message;
        }
        if let Some(sha256) = self.sha256 {
            model.sha256 = sha256;
        }
        model.updated_at = now;
    }

    pub fn into_active_model(self, id: Uuid, now: DateTime<Utc>) -> fap_average::ActiveModel {
        fap_average::ActiveModel {
            id: Set(id),
            status: set_some(self.status),
            average: set_some(self.average),
            message: set_some(self.message),
            sha256: set_some(self.sha256),
            updated_at: Set(now),
            ..Default::default()
        }
    }
}
