use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 通讯录上传记录，属主 + 区号 + 手机号 成对唯一
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["uid", "zone", "phone"], unique, name("uk_mail_list_owner_pair"))]
#[mongo_index(fields["vercode"], unique, name("uk_mail_list_vercode"))]
pub struct MailListEntity {
    /// 所属用户 uid
    pub uid: String,
    /// 联系人名称（唯一可变更字段）
    pub name: String,
    /// 区号
    pub zone: String,
    /// 手机号
    pub phone: String,
    /// 验证码标识，入库时生成一次，之后不再变更
    pub vercode: String,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_models_declared() {
        let models = MailListEntity::index_models();
        assert_eq!(models.len(), 2);

        let pair = models
            .iter()
            .find(|m| m.options.as_ref().and_then(|o| o.name.as_deref()) == Some("uk_mail_list_owner_pair"))
            .unwrap();
        assert!(pair.keys.contains_key("uid"));
        assert!(pair.keys.contains_key("zone"));
        assert!(pair.keys.contains_key("phone"));
        assert_eq!(pair.options.clone().unwrap().unique, Some(true));

        let vercode = models
            .iter()
            .find(|m| m.options.as_ref().and_then(|o| o.name.as_deref()) == Some("uk_mail_list_vercode"))
            .unwrap();
        assert_eq!(vercode.options.clone().unwrap().unique, Some(true));
    }
}
