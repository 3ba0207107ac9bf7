use redis::{Client, RedisError, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use crate::models::chat_rooms::RoomSummary;

#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Get a JSON value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> redis::RedisResult<Option<T>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await?;

        match value {
            Some(v) => {
                let deserialized = serde_json::from_str(&v).map_err(|e| {
                    RedisError::from((
                        redis::ErrorKind::TypeError,
                        "Deserialization error",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    /// Set a JSON value with a TTL in seconds
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> redis::RedisResult<()> {
        let serialized = serde_json::to_string(value).map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "Serialization error",
                e.to_string(),
            ))
        })?;

        redis::cmd("SET")
            .arg(key)
            .arg(serialized)
            .arg("EX")
            .arg(ttl_seconds.max(1))
            .query_async(&mut self.connection.clone())
            .await
    }

    /// Delete keys from cache
    pub async fn delete(&self, keys: &[String]) -> redis::RedisResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        redis::cmd("DEL")
            .arg(keys)
            .query_async(&mut self.connection.clone())
            .await
    }
}

/// Cache key generators
pub mod keys {
    use uuid::Uuid;

    /// Room list for one user
    pub fn room_list(user_id: Uuid) -> String {
        format!("chat:rooms:{user_id}")
    }
}

/// Short-lived per-user room list cache. Redis errors are logged and treated
/// as a miss so chat keeps working without Redis.
#[derive(Clone)]
pub struct RoomListCache {
    redis: Arc<RedisCache>,
    ttl: Duration,
}

impl RoomListCache {
    pub fn new(redis: Arc<RedisCache>, ttl: Duration) -> Self {
        Self { redis, ttl }
    }

    pub async fn get(&self, user_id: Uuid) -> Option<Vec<RoomSummary>> {
        match self.redis.get(&keys::room_list(user_id)).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(%user_id, error = %e, "room list cache read failed");
                None
            }
        }
    }

    pub async fn put(&self, user_id: Uuid, rooms: &[RoomSummary]) {
        if let Err(e) = self
            .redis
            .set(&keys::room_list(user_id), &rooms, self.ttl.as_secs())
            .await
        {
            warn!(%user_id, error = %e, "room list cache write failed");
        }
    }

    pub async fn invalidate(&self, user_ids: &[Uuid]) {
        let keys: Vec<String> = user_ids.iter().copied().map(keys::room_list).collect();
        if let Err(e) = self.redis.delete(&keys).await {
            warn!(error = %e, "room list cache invalidation failed");
        }
    }
}
