use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 好友关系（有向边 uid -> to_uid）
/// 由好友申请子系统写入，本核心只读：去重比对与通知扇出
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["uid", "to_uid"], unique, name("uk_friend_edge"))]
pub struct FriendEntity {
    /// 边的属主
    pub uid: String,
    /// 指向的好友
    pub to_uid: String,
    /// 创建时间（Unix 时间戳，秒）
    pub created_at: u64,
}
