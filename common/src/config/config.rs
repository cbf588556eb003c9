use config::Config;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub database: Option<DatabaseConfig>,
    pub redis: Option<RedisConfig>,
    pub server: Option<ServerConfig>,
    pub sys: Option<SysConfig>,
    pub kafka: Option<KafkaConfig>,
    pub business: Option<BusinessConfig>,
    pub avatar: Option<AvatarConfig>,
    pub file: Option<FileConfig>,
}

impl AppConfig {
    pub fn new(file: &String) -> Self {
        let config = Config::builder()
            .add_source(config::File::with_name(file).required(true))
            .add_source(config::Environment::with_prefix("APP").separator("_"))
            .build()
            .expect("Failed to build configuration");
        let cfg = config.try_deserialize::<AppConfig>().expect("Failed to deserialize configuration");
        return cfg;
    }
    pub fn init(file: &String) {
        let instance = Self::new(&file);
        INSTANCE.set(Arc::new(instance)).expect("INSTANCE already initialized");
    }

    pub fn get_database(&self) -> DatabaseConfig {
        self.database.clone().unwrap_or_default()
    }
    pub fn get_redis(&self) -> RedisConfig {
        self.redis.clone().unwrap_or_default()
    }
    pub fn get_server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }
    pub fn get_sys(&self) -> SysConfig {
        self.sys.clone().unwrap_or_default()
    }
    pub fn get_kafka(&self) -> KafkaConfig {
        self.kafka.clone().unwrap_or_default()
    }
    pub fn get_business(&self) -> BusinessConfig {
        self.business.clone().unwrap_or_default()
    }
    pub fn get_avatar(&self) -> AvatarConfig {
        self.avatar.clone().unwrap_or_default()
    }
    pub fn get_file(&self) -> FileConfig {
        self.file.clone().unwrap_or_default()
    }
    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("INSTANCE is not initialized").clone()
    }
}
static INSTANCE: OnceCell<Arc<AppConfig>> = OnceCell::new();

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    pub url: String,
    pub db_name: String,
}
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    pub url: String,
}
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SysConfig {
    //全局日志级别
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct KafkaConfig {
    pub brokers: String,
    //命令事件 topic（欢迎消息/好友通知）
    pub topic_cmd: String,
}

/// 业务系统接入配置
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BusinessConfig {
    //业务系统共享密钥白名单
    pub tokens: Vec<String>,
    //新用户欢迎语
    pub welcome_message: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AvatarConfig {
    //头像存储分区数
    pub partition: u32,
}

/// 文件服务配置
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FileConfig {
    pub base_url: String,
}
