//! Cache invalidation contract.
//!
//! Each mutation declares which query collection it invalidates. Whoever holds
//! a cache of query results subscribes to these declarations; the repositories
//! never inspect or own such a cache themselves.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

pub const INVALIDATION_CHANNEL: &str = "cms:invalidate";

/// A class of queries that a mutation makes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Collection {
    Contents,
    Media,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Contents => "Contents",
            Collection::Media => "Media",
        }
    }
}

/// Receives invalidation declarations after a mutation has committed.
/// Implementations must not fail the caller: the mutation is already durable.
#[async_trait]
pub trait InvalidationSink: Send + Sync {
    async fn invalidate(&self, collection: Collection);
}

/// Publishes the collection name on a Redis pub/sub channel.
pub struct RedisInvalidationPublisher {
    client: redis::Client,
    channel: String,
    conn: OnceCell<redis::aio::MultiplexedConnection>,
}

impl RedisInvalidationPublisher {
    pub fn new(client: redis::Client) -> Self {
        Self {
            client,
            channel: INVALIDATION_CHANNEL.to_string(),
            conn: OnceCell::new(),
        }
    }

    async fn publish(&self, collection: Collection) -> redis::RedisResult<()> {
        let conn = self
            .conn
            .get_or_try_init(|| self.client.get_multiplexed_async_connection())
            .await?;
        let mut conn = conn.clone();
        conn.publish::<_, _, ()>(&self.channel, collection.as_str())
            .await
    }
}

#[async_trait]
impl InvalidationSink for RedisInvalidationPublisher {
    async fn invalidate(&self, collection: Collection) {
        match self.publish(collection).await {
            Ok(()) => debug!(collection = collection.as_str(), "published invalidation"),
            Err(e) => warn!(
                collection = collection.as_str(),
                error = %e,
                "failed to publish cache invalidation"
            ),
        }
    }
}
