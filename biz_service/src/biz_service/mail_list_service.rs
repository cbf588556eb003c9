use crate::entitys::mail_list_entity::MailListEntity;
use anyhow::Result;
use common::repository_util::{BaseRepository, Repository};
use mongodb::{ClientSession, Database, bson::doc};
use once_cell::sync::OnceCell;
use std::sync::Arc;

pub const COLLECTION_MAIL_LIST: &str = "mail_list";

/// 通讯录存储，(uid, zone, phone) 成对唯一
pub struct MailListService {
    pub dao: BaseRepository<MailListEntity>,
}

impl MailListService {
    pub fn new(db: Database) -> Self {
        let collection = db.collection(COLLECTION_MAIL_LIST);
        Self { dao: BaseRepository::new(db, collection.clone()) }
    }

    /// 拉取属主全部通讯录记录
    pub async fn query_by_uid(&self, uid: &str) -> Result<Vec<MailListEntity>> {
        let list = self.dao.query(doc! { "uid": uid }).await?;
        Ok(list)
    }

    pub async fn find_by_owner_pair(&self, uid: &str, zone: &str, phone: &str) -> Result<Option<MailListEntity>> {
        let result = self.dao.find_one(doc! { "uid": uid, "zone": zone, "phone": phone }).await?;
        Ok(result)
    }

    pub async fn insert_tx(&self, entity: &MailListEntity, session: &mut ClientSession) -> mongodb::error::Result<()> {
        self.dao.insert_with_session(entity, session).await
    }

    /// 仅更新联系人名称，zone/phone/vercode 永不经此路径变更
    pub async fn update_name(&self, uid: &str, zone: &str, phone: &str, name: &str) -> Result<u64> {
        let count = self
            .dao
            .update(doc! { "uid": uid, "zone": zone, "phone": phone }, doc! { "$set": { "name": name } })
            .await?;
        Ok(count)
    }

    pub fn init(db: Database) {
        let instance = Self::new(db);
        INSTANCE.set(Arc::new(instance)).unwrap_or_else(|_| panic!("MailListService already initialized"));
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("MailListService is not initialized").clone()
    }
}

static INSTANCE: OnceCell<Arc<MailListService>> = OnceCell::new();
