//! Read-through cache for the hall catalog and per-event seat listings.
//!
//! Entries are JSON blobs with a TTL. Seat listings are deleted after every
//! seat mutation; callers treat every cache error as a miss.

use crate::config::CacheConfig;
use crate::redis_client::RedisClient;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

pub mod holes;
pub mod seats;

#[derive(Clone)]
pub struct CacheService {
    redis: RedisClient,
    config: CacheConfig,
}

impl CacheService {
    pub fn new(redis: RedisClient, config: CacheConfig) -> Self {
        Self { redis, config }
    }

    // Прогрев кеша при старте
    pub async fn warmup_cache(&self, store: &dyn crate::store::BanquetStore) {
        info!("Starting cache warmup...");

        match store.holes().await {
            Ok(holes) => {
                info!("Loaded {} holes", holes.len());
                if let Err(e) = self.save_holes(&holes).await {
                    tracing::warn!("Failed to warm hole cache: {:?}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to load holes for warmup: {:?}", e),
        }

        info!("Cache warmup done");
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        let data: Option<String> = conn.get(key).await?;
        match data {
            Some(data) => serde_json::from_str(&data).map(Some).map_err(|_| {
                redis::RedisError::from((redis::ErrorKind::TypeError, "Parse error"))
            }),
            None => Ok(None),
        }
    }

    async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> Result<(), redis::RedisError> {
        let data = serde_json::to_string(value).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Serialize error"))
        })?;
        let mut conn = self.redis.conn.clone();
        conn.set_ex(key, data, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        conn.del(key).await
    }
}
