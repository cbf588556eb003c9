pub mod avatar_service;
pub mod cmd_service;
pub mod file_service;
pub mod friend_service;
pub mod mail_list_service;
pub mod user_service;

use crate::entitys::friend_entity::FriendEntity;
use crate::entitys::mail_list_entity::MailListEntity;
use crate::entitys::user_entity::UserEntity;
use crate::util::db_index_util::index_create;
use common::config::AppConfig;
use common::index_trait::MongoIndexModelProvider;
use mongodb::Database;
use mongodb::bson::Document;
use std::sync::Arc;

pub async fn init_service(db: Database, cfg: &AppConfig) {
    user_service::UserService::init(db.clone());
    mail_list_service::MailListService::init(db.clone());
    friend_service::UserFriendService::init(db.clone());
    cmd_service::CmdService::init_kafka(&cfg.get_kafka());
    let file_service = Arc::new(file_service::HttpFileService::new(&cfg.get_file()));
    avatar_service::AvatarService::init(file_service, &cfg.get_avatar());
    ensure_indexes(&db).await;
}

/// 启动时声明唯一索引（zone+phone 唯一约束在存储层兜底）
async fn ensure_indexes(db: &Database) {
    index_create(db.collection::<Document>(user_service::COLLECTION_USER), UserEntity::index_models()).await;
    index_create(db.collection::<Document>(mail_list_service::COLLECTION_MAIL_LIST), MailListEntity::index_models()).await;
    index_create(db.collection::<Document>(friend_service::COLLECTION_USER_FRIEND), FriendEntity::index_models()).await;
}
