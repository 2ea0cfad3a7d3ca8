use common::storage::StorageError;
use mq::MqError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Pipeline-level error type.
///
/// `Validation` always reaches the caller. `Conflict` is raised by stores on
/// `(owner, fingerprint)` collisions and recovered inside ingestion.
/// `Transport` on publish is logged and swallowed by the publishing
/// component.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    /// Missing, or present but owned by someone else.
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Message bus error: {0}")]
    Transport(#[from] MqError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Transport(_) => "TRANSPORT_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return AppError::Conflict(detail);
        }
        match err {
            DbErr::RecordNotFound(detail) => AppError::NotFound(detail),
            DbErr::RecordNotUpdated => AppError::NotFound("Record not found".into()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::SizeLimitExceeded { .. } => AppError::Validation(err.to_string()),
            StorageError::NotFound(_) => AppError::NotFound(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}
