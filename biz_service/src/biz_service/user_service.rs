use crate::entitys::user_entity::UserEntity;
use anyhow::Result;
use common::repository_util::{BaseRepository, Repository};
use common::util::date_util::now;
use mongodb::{Database, bson::doc};
use once_cell::sync::OnceCell;
use std::sync::Arc;

pub const COLLECTION_USER: &str = "user_info";

/// 用户目录：uid 为根标识，username 与 zone+phone 提供二级查找
pub struct UserService {
    pub dao: BaseRepository<UserEntity>,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        let collection = db.collection(COLLECTION_USER);
        Self { dao: BaseRepository::new(db, collection.clone()) }
    }

    pub async fn find_by_uid(&self, uid: &str) -> Result<Option<UserEntity>> {
        let result = self.dao.find_one(doc! { "uid": uid }).await?;
        Ok(result)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserEntity>> {
        let result = self.dao.find_one(doc! { "username": username }).await?;
        Ok(result)
    }

    pub async fn find_by_zone_phone(&self, zone: &str, phone: &str) -> Result<Option<UserEntity>> {
        let result = self.dao.find_one(doc! { "zone": zone, "phone": phone }).await?;
        Ok(result)
    }

    /// 批量按 (zone, phone) 对解析注册用户，一次 $or 查询
    pub async fn query_by_zone_phones(&self, pairs: &[(String, String)]) -> Result<Vec<UserEntity>> {
        if pairs.is_empty() {
            return Ok(vec![]);
        }
        let conditions: Vec<_> = pairs.iter().map(|(zone, phone)| doc! { "zone": zone, "phone": phone }).collect();
        let list = self.dao.query(doc! { "$or": conditions }).await?;
        Ok(list)
    }

    /// 记录最近登录设备（尽力而为，不在事务内）
    pub async fn record_device(&self, uid: &str, device_flag: u8, device_id: Option<&str>) -> Result<()> {
        let mut set_doc = doc! { "device_flag": device_flag as i32, "update_time": now() as i64 };
        if let Some(device_id) = device_id {
            set_doc.insert("device_id", device_id);
        }
        self.dao.update(doc! { "uid": uid }, doc! { "$set": set_doc }).await?;
        Ok(())
    }

    /// 头像入库完成后置位
    pub async fn set_avatar_uploaded(&self, uid: &str) -> Result<()> {
        self.dao
            .update(doc! { "uid": uid }, doc! { "$set": { "is_upload_avatar": true, "update_time": now() as i64 } })
            .await?;
        Ok(())
    }

    pub fn init(db: Database) {
        let instance = Self::new(db);
        INSTANCE.set(Arc::new(instance)).unwrap_or_else(|_| panic!("UserService already initialized"));
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("UserService is not initialized").clone()
    }
}

static INSTANCE: OnceCell<Arc<UserService>> = OnceCell::new();
