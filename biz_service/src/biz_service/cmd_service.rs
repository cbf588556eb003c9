use anyhow::anyhow;
use async_trait::async_trait;
use common::config::KafkaConfig;
use once_cell::sync::OnceCell;
use rdkafka::ClientConfig;
use rdkafka::producer::future_producer::Delivery;
use rdkafka::producer::{FutureProducer, FutureRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// 命令事件：每种事件固定 schema 的带标签联合体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum CmdEvent {
    /// 头像更新，通知好友刷新
    AvatarUpdate { uid: String },
    /// 新用户欢迎消息，login_ip 供审计/归属地使用
    Welcome { uid: String, content: String, login_ip: String },
}

impl CmdEvent {
    /// 事件归属的用户，作为消息 key 保证同用户事件落同分区
    pub fn owner_uid(&self) -> &str {
        match self {
            CmdEvent::AvatarUpdate { uid } => uid,
            CmdEvent::Welcome { uid, .. } => uid,
        }
    }
}

#[derive(Serialize)]
struct CmdPayload<'a> {
    subscribers: &'a [String],
    #[serde(flatten)]
    event: &'a CmdEvent,
}

/// 通知通道契约：向订阅者集合投递一条事件，尽力而为
#[async_trait]
pub trait CmdSendService: Send + Sync {
    async fn send_cmd(&self, event: &CmdEvent, subscribers: &[String]) -> anyhow::Result<()>;
}

/// Kafka 实现
pub struct KafkaCmdService {
    producer: FutureProducer,
    config: KafkaConfig,
}

impl fmt::Debug for KafkaCmdService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KafkaCmdService").field("config", &self.config).finish()
    }
}

impl KafkaCmdService {
    pub fn new(cfg: KafkaConfig) -> Self {
        let producer = ClientConfig::new().set("bootstrap.servers", &cfg.brokers).create().expect("Kafka producer init failed");

        KafkaCmdService { producer, config: cfg }
    }
}

#[async_trait]
impl CmdSendService for KafkaCmdService {
    async fn send_cmd(&self, event: &CmdEvent, subscribers: &[String]) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&CmdPayload { subscribers, event })?;
        let key = event.owner_uid();
        let record = FutureRecord::to(&self.config.topic_cmd).payload(&payload).key(key);

        // 短超时以利用批处理机制
        let timeout = Duration::from_millis(50);

        match self.producer.send(record, timeout).await {
            Ok(Delivery { partition, offset, .. }) => {
                log::debug!("Kafka OK => topic={}, partition={}, offset={}", self.config.topic_cmd, partition, offset);
                Ok(())
            }
            Err((err, _)) => Err(anyhow!("Kafka send failed: {}", err)),
        }
    }
}

/// 通知通道单例（默认 Kafka，可注入其它实现）
pub struct CmdService;

impl CmdService {
    pub fn init_kafka(cfg: &KafkaConfig) {
        let instance = KafkaCmdService::new(cfg.clone());
        Self::set(Arc::new(instance));
    }

    pub fn set(sender: Arc<dyn CmdSendService>) {
        INSTANCE.set(sender).unwrap_or_else(|_| panic!("CmdService already initialized"));
    }

    /// 获取单例
    pub fn get() -> Arc<dyn CmdSendService> {
        INSTANCE.get().expect("CmdService is not initialized").clone()
    }
}

static INSTANCE: OnceCell<Arc<dyn CmdSendService>> = OnceCell::new();

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cmd_event_tagged_shape() {
        let event = CmdEvent::AvatarUpdate { uid: "u1".into() };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({ "cmd": "avatar_update", "uid": "u1" }));

        let event = CmdEvent::Welcome { uid: "u2".into(), content: "欢迎".into(), login_ip: "203.0.113.7".into() };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({ "cmd": "welcome", "uid": "u2", "content": "欢迎", "login_ip": "203.0.113.7" }));
    }

    #[test]
    fn test_cmd_payload_envelope() {
        let event = CmdEvent::AvatarUpdate { uid: "u1".into() };
        let subscribers = vec!["f1".to_string(), "f2".to_string()];
        let value = serde_json::to_value(&CmdPayload { subscribers: &subscribers, event: &event }).unwrap();
        assert_eq!(value, json!({ "subscribers": ["f1", "f2"], "cmd": "avatar_update", "uid": "u1" }));
    }

    #[test]
    fn test_owner_uid() {
        let event = CmdEvent::Welcome { uid: "u9".into(), content: "hi".into(), login_ip: "".into() };
        assert_eq!(event.owner_uid(), "u9");
    }
}
