use anyhow::Result;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Redis service for API rate limiting
///
/// Redis is optional at runtime: callers treat any error as "limiter
/// unavailable" and let the request through.
#[derive(Clone)]
pub struct RedisService {
    conn: ConnectionManager,
}

impl RedisService {
    /// Create a new Redis service with connection pooling
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    /// Increment a fixed-window counter, setting the window expiry on the
    /// first hit. Returns the count within the current window.
    pub async fn incr_window(&self, key: &str, window_secs: u64) -> Result<i64> {
        let mut conn = self.conn.clone();
        let count: i64 = conn.incr(key, 1).await?;
        if count == 1 {
            let _: () = conn.expire(key, window_secs as i64).await?;
        }
        Ok(count)
    }

    /// Ping Redis to check connection
    pub async fn ping(&self) -> Result<bool> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}
