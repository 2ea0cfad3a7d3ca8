use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MqError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Publish timed out after {0:?}")]
    Timeout(Duration),

    #[error("Broker unavailable: {0}")]
    Unavailable(String),

    /// A subscriber handler rejected the message; the broker may redeliver it.
    #[error("Handler error: {0}")]
    Handler(String),

    #[error("{0}")]
    Internal(String),
}

impl From<broccoli_queue::error::BroccoliError> for MqError {
    fn from(e: broccoli_queue::error::BroccoliError) -> Self {
        MqError::Internal(e.to_string())
    }
}
