use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::bus::{MessageBus, MessageHandler};
use crate::error::MqError;

/// In-process [`MessageBus`] that records publishes and lets the caller
/// deliver messages to subscribers by hand.
#[derive(Default)]
pub struct MemoryBus {
    published: Mutex<Vec<(String, Value)>>,
    handlers: Mutex<HashMap<String, MessageHandler>>,
    unavailable: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent publish fail as if the broker were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Payloads published to `topic`, oldest first.
    pub fn published(&self, topic: &str) -> Vec<Value> {
        lock(&self.published)
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Forget everything published so far.
    pub fn clear(&self) {
        lock(&self.published).clear();
    }

    /// Hand `payload` to the handler subscribed to `topic`.
    pub async fn deliver(&self, topic: &str, payload: Value) -> Result<(), MqError> {
        let handler = lock(&self.handlers)
            .get(topic)
            .cloned()
            .ok_or_else(|| MqError::Internal(format!("no subscriber for topic '{topic}'")))?;
        handler(payload).await
    }
}

#[async_trait]
impl MessageBus for MemoryBus {
    async fn publish(&self, topic: &str, payload: Value) -> Result<(), MqError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MqError::Unavailable("memory bus marked unavailable".into()));
        }
        lock(&self.published).push((topic.to_string(), payload));
        Ok(())
    }

    /// Registers the handler and returns immediately.
    async fn subscribe(&self, topic: &str, handler: MessageHandler) -> Result<(), MqError> {
        lock(&self.handlers).insert(topic.to_string(), handler);
        Ok(())
    }
}
