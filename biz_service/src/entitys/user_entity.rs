use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 性别枚举
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
pub enum Sex {
    Unknown = 0,
    Male = 1,
    Female = 2,
}

/// 用户信息结构体，身份目录的主实体
/// uid 为全局唯一根标识，创建后不可变
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["uid"], unique, name("uk_user_uid"))]
#[mongo_index(fields["username"], unique, sparse, name("uk_user_username"))]
#[mongo_index(fields["zone", "phone"], unique, sparse, name("uk_user_zone_phone"))]
pub struct UserEntity {
    /// 用户唯一 ID（字符串形式）
    pub uid: String,
    /// 用户昵称
    pub name: String,
    /// 用户名（业务系统侧稳定标识，可选，存在时唯一）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// 性别 0:未知 1:男 2:女
    pub sex: u8,
    /// 设备标记 0:APP 1:PC
    pub device_flag: u8,
    /// 最近一次登录的设备标识
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// 区号（与手机号成对出现，成对唯一）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// 手机号
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// 是否已上传头像
    pub is_upload_avatar: bool,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: u64,
    /// 最后更新时间（Unix 时间戳，秒）
    pub update_time: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_range() {
        assert_eq!(Sex::try_from(0u8).unwrap(), Sex::Unknown);
        assert_eq!(Sex::try_from(2u8).unwrap(), Sex::Female);
        assert!(Sex::try_from(3u8).is_err());
    }

    #[test]
    fn test_index_models_declared() {
        let models = UserEntity::index_models();
        assert_eq!(models.len(), 3);

        let zone_phone = models
            .iter()
            .find(|m| m.options.as_ref().and_then(|o| o.name.as_deref()) == Some("uk_user_zone_phone"))
            .unwrap();
        assert!(zone_phone.keys.contains_key("zone"));
        assert!(zone_phone.keys.contains_key("phone"));
        let opts = zone_phone.options.clone().unwrap();
        assert_eq!(opts.unique, Some(true));
        assert_eq!(opts.sparse, Some(true));

        let uid = models.iter().find(|m| m.options.as_ref().and_then(|o| o.name.as_deref()) == Some("uk_user_uid")).unwrap();
        assert_eq!(uid.options.clone().unwrap().unique, Some(true));
    }

    #[test]
    fn test_optional_fields_absent_when_none() {
        // sparse 唯一索引依赖缺失字段不落库
        let user = UserEntity { uid: "u1".into(), name: "Alice".into(), ..Default::default() };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("username").is_none());
        assert!(value.get("zone").is_none());
        assert!(value.get("phone").is_none());
    }
}
