pub mod config;
pub mod db;
pub mod errors;
pub mod redis;
pub mod repository;
pub mod util;

pub use repository::*;
use serde::{Deserialize, Serialize};
pub type UserId = String;
pub type RedisPool = deadpool_redis::Pool;

/// 登录令牌负载，序列化后写入 Redis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientTokenDto {
    pub uid: String,
    pub device_flag: u8,
}
