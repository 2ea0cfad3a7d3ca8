use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use crate::error::MqError;

/// Callback invoked once per delivered message.
///
/// Returning an error hands the message back to the broker's redelivery
/// policy; returning `Ok` acknowledges it.
pub type MessageHandler =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<(), MqError>> + Send + Sync>;

/// Wrap an async closure as a [`MessageHandler`].
pub fn handler<F, Fut>(f: F) -> MessageHandler
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), MqError>> + Send + 'static,
{
    Arc::new(move |payload| Box::pin(f(payload)))
}

/// At-least-once publish/subscribe transport.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish a JSON payload to a topic.
    async fn publish(&self, topic: &str, payload: Value) -> Result<(), MqError>;

    /// Attach a handler to a topic.
    ///
    /// Broker-backed implementations keep consuming until the connection
    /// stops, so callers usually run this on its own task.
    async fn subscribe(&self, topic: &str, handler: MessageHandler) -> Result<(), MqError>;
}

/// Extension trait for typed publishes.
/// Automatically implemented for any T that implements MessageBus.
#[async_trait]
pub trait MessageBusExt: MessageBus {
    async fn publish_message<M>(&self, topic: &str, message: &M) -> Result<(), MqError>
    where
        M: Serialize + Send + Sync,
    {
        let payload = serde_json::to_value(message)?;
        self.publish(topic, payload).await
    }
}

// Blanket implementation
impl<T: ?Sized + MessageBus> MessageBusExt for T {}
