//! Redis response cache for the leaderboard read path.
//!
//! The member list is the hottest endpoint (the public board polls it), so
//! the serialized response is cached for a short TTL and dropped after every
//! reconciliation. Cache failures are never fatal; we just fall through to
//! Postgres.

use redis::{AsyncCommands, Client as RedisClient};

use crate::config;

pub const LEADERBOARD_KEY: &str = "leaderboard:active";

pub async fn get_leaderboard(redis: &RedisClient) -> Option<String> {
    let mut conn = redis.get_multiplexed_async_connection().await.ok()?;
    conn.get::<_, String>(LEADERBOARD_KEY).await.ok()
}

pub async fn store_leaderboard(redis: &RedisClient, body: &str) {
    let ttl = config::settings().leaderboard_ttl;
    if let Ok(mut conn) = redis.get_multiplexed_async_connection().await {
        let res: redis::RedisResult<()> = conn.set_ex(LEADERBOARD_KEY, body, ttl).await;
        if let Err(e) = res {
            log::warn!("leaderboard cache store failed: {e}");
        }
    }
}

/// Called after every reconciliation so stale standings never outlive a write.
pub async fn invalidate_leaderboard(redis: &RedisClient) {
    if let Ok(mut conn) = redis.get_multiplexed_async_connection().await {
        let res: redis::RedisResult<()> = conn.del(LEADERBOARD_KEY).await;
        if let Err(e) = res {
            log::warn!("leaderboard cache invalidation failed: {e}");
        }
    }
}
