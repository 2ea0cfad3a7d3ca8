use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::bus::{MessageBus, MessageHandler};
use crate::error::MqError;
use crate::models::{BroccoliError, BrokerMessage, MqQueue};

/// [`MessageBus`] over a Redis-backed broccoli queue.
pub struct BroccoliBus {
    queue: Arc<MqQueue>,
    publish_timeout: Duration,
}

impl BroccoliBus {
    pub fn new(queue: Arc<MqQueue>, publish_timeout: Duration) -> Self {
        Self {
            queue,
            publish_timeout,
        }
    }
}

#[async_trait]
impl MessageBus for BroccoliBus {
    async fn publish(&self, topic: &str, payload: Value) -> Result<(), MqError> {
        let publish = self.queue.publish(topic, None, &payload, None);
        match tokio::time::timeout(self.publish_timeout, publish).await {
            Ok(Ok(_)) => {
                debug!(topic, "Published message");
                Ok(())
            }
            Ok(Err(e)) => Err(MqError::Unavailable(e.to_string())),
            Err(_) => Err(MqError::Timeout(self.publish_timeout)),
        }
    }

    async fn subscribe(&self, topic: &str, handler: MessageHandler) -> Result<(), MqError> {
        self.queue
            .process_messages(
                topic,
                None, // single-threaded for sequential DB writes
                None,
                move |message: BrokerMessage<Value>| {
                    let handler = Arc::clone(&handler);
                    async move {
                        handler(message.payload)
                            .await
                            .map_err(|e| BroccoliError::Job(e.to_string()))
                    }
                },
            )
            .await
            .map_err(MqError::from)
    }
}
