use crate::biz_service::cmd_service::{CmdEvent, CmdService};
use crate::entitys::friend_entity::FriendEntity;
use anyhow::Result;
use common::UserId;
use common::repository_util::{BaseRepository, Repository};
use mongodb::{Database, bson::doc};
use once_cell::sync::OnceCell;
use std::sync::Arc;

pub const COLLECTION_USER_FRIEND: &str = "user_friend";

/// 好友关系读取（边由好友申请子系统维护，此处只读）
pub struct UserFriendService {
    pub dao: BaseRepository<FriendEntity>,
}

impl UserFriendService {
    pub fn new(db: Database) -> Self {
        let collection = db.collection(COLLECTION_USER_FRIEND);
        Self { dao: BaseRepository::new(db, collection.clone()) }
    }

    /// 获取好友边列表
    pub async fn query_friends(&self, uid: &UserId) -> Result<Vec<FriendEntity>> {
        let list = self.dao.query(doc! { "uid": uid }).await?;
        Ok(list)
    }

    /// 向属主的全部好友扇出一条命令事件；无好友时为 no-op
    /// 尽力而为投递，失败不重试
    pub async fn notify_friends(&self, uid: &UserId, event: &CmdEvent) -> Result<()> {
        let friends = self.query_friends(uid).await?;
        if friends.is_empty() {
            return Ok(());
        }
        let subscribers: Vec<String> = friends.into_iter().map(|f| f.to_uid).collect();
        CmdService::get().send_cmd(event, &subscribers).await?;
        Ok(())
    }

    pub fn init(db: Database) {
        let instance = Self::new(db);
        INSTANCE.set(Arc::new(instance)).unwrap_or_else(|_| panic!("UserFriendService already initialized"));
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("UserFriendService is not initialized").clone()
    }
}

static INSTANCE: OnceCell<Arc<UserFriendService>> = OnceCell::new();
