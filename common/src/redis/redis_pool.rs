use crate::RedisPool;
use anyhow::{Result, anyhow};
use deadpool_redis::{Config, Runtime};
use once_cell::sync::OnceCell;

static REDIS_POOL: OnceCell<RedisPool> = OnceCell::new();

/// 初始化 Redis 连接池（程序启动时调用一次）
pub fn init_redis_pool(redis_url: &str) -> Result<()> {
    let pool = Config::from_url(redis_url).create_pool(Some(Runtime::Tokio1))?;
    REDIS_POOL.set(pool).map_err(|_| anyhow!("Redis pool already initialized"))
}

/// 从连接池获取一个异步连接
pub async fn get_redis_conn() -> Result<deadpool_redis::Connection> {
    let pool = REDIS_POOL.get().ok_or_else(|| anyhow!("Redis pool is not initialized"))?;
    let conn = pool.get().await?;
    Ok(conn)
}
