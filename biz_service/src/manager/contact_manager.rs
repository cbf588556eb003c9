use crate::biz_const::{INTERNATIONAL_PREFIX, VercodeType, build_vercode};
use crate::biz_service::friend_service::UserFriendService;
use crate::biz_service::mail_list_service::MailListService;
use crate::biz_service::user_service::UserService;
use crate::entitys::friend_entity::FriendEntity;
use crate::entitys::mail_list_entity::MailListEntity;
use crate::entitys::user_entity::UserEntity;
use common::db::Db;
use common::errors::AppError;
use common::repository_util::{begin_transaction, is_duplicate_key};
use common::util::date_util::now;
use common::util::validate::{validate_contact_name, validate_phone};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use utoipa::ToSchema;

/// 通讯录上传条目
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct MailListReq {
    /// 联系人名称
    pub name: String,
    /// 区号，留空且号码非国际格式时补属主区号
    #[serde(default)]
    pub zone: String,
    /// 手机号
    pub phone: String,
}

/// 通讯录比对结果，仅包含已注册联系人
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MailListResp {
    pub name: String,
    pub zone: String,
    pub phone: String,
    /// 联系人注册用户的 uid
    pub uid: String,
    pub vercode: String,
    /// 是否已是属主好友
    pub is_friend: bool,
}

/// 修改联系人名称请求；zone/phone 仅用于定位，不可经此修改
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateMailListReq {
    pub name: String,
    #[serde(default)]
    pub zone: String,
    pub phone: String,
}

/// 通讯录比对引擎：上传去重入库、读取时与用户目录/好友关系交叉比对
pub struct ContactManager;

impl ContactManager {
    /// 批量上传：一次查询建去重索引，全部暂存条目单事务入库
    pub async fn add_contacts(&self, owner_uid: &str, req: Vec<MailListReq>) -> Result<(), AppError> {
        if req.is_empty() {
            return Ok(());
        }
        let owner = UserService::get().find_by_uid(owner_uid).await?.ok_or(AppError::NotFound)?;
        let existing = MailListService::get().query_by_uid(owner_uid).await?;
        let owner_zone = owner.zone.unwrap_or_default();
        let staged = stage_new_entries(owner_uid, &owner_zone, &existing, &req)?;
        if staged.is_empty() {
            // 全部已在册，幂等返回
            return Ok(());
        }

        let mail_list_service = MailListService::get();
        let mut session = begin_transaction(Db::client()).await.map_err(|e| {
            log::error!("数据库事务开启失败: {:?}", e);
            AppError::Transaction("数据库事务开启失败".to_string())
        })?;

        // 任何一条失败则整批回滚
        for entity in &staged {
            if let Err(e) = mail_list_service.insert_tx(entity, &mut session).await {
                let _ = session.abort_transaction().await;
                log::error!("添加用户通讯录联系人错误: {:?}", e);
                return Err(AppError::Transaction("添加用户通讯录联系人错误".to_string()));
            }
        }
        if let Err(e) = session.commit_transaction().await {
            log::error!("数据库事务提交失败: {:?}", e);
            return Err(AppError::Transaction("数据库事务提交失败".to_string()));
        }
        Ok(())
    }

    /// 单条上传：已存在按冲突上报，调用方期望唯一结果
    pub async fn add_single_contact(&self, owner_uid: &str, req: &MailListReq) -> Result<(), AppError> {
        validate_contact_name(&req.name).map_err(|_| AppError::Validation("联系人名称长度必须在1-32个字符之间".to_string()))?;
        validate_phone(&req.phone).map_err(|_| AppError::Validation("手机号格式有误".to_string()))?;

        let owner = UserService::get().find_by_uid(owner_uid).await?.ok_or(AppError::NotFound)?;
        let owner_zone = owner.zone.unwrap_or_default();
        let zone = effective_zone(&req.zone, &req.phone, &owner_zone);

        let mail_list_service = MailListService::get();
        if mail_list_service.find_by_owner_pair(owner_uid, &zone, &req.phone).await?.is_some() {
            return Err(AppError::Conflict("该联系人已存在于通讯录中".to_string()));
        }

        let entity = MailListEntity {
            uid: owner_uid.to_string(),
            name: req.name.clone(),
            zone,
            phone: req.phone.clone(),
            vercode: build_vercode(VercodeType::MailList),
            create_time: now(),
        };

        let mut session = begin_transaction(Db::client()).await.map_err(|e| {
            log::error!("数据库事务开启失败: {:?}", e);
            AppError::Transaction("数据库事务开启失败".to_string())
        })?;
        if let Err(e) = mail_list_service.insert_tx(&entity, &mut session).await {
            let _ = session.abort_transaction().await;
            if is_duplicate_key(&e) {
                // 并发插入撞唯一索引，同样按已存在上报
                return Err(AppError::Conflict("该联系人已存在于通讯录中".to_string()));
            }
            log::error!("添加用户通讯录联系人错误: {:?}", e);
            return Err(AppError::Transaction("添加用户通讯录联系人错误".to_string()));
        }
        if let Err(e) = session.commit_transaction().await {
            log::error!("数据库事务提交失败: {:?}", e);
            return Err(AppError::Transaction("数据库事务提交失败".to_string()));
        }
        Ok(())
    }

    /// 读取并比对：三类数据各一次查询，避免逐条访问
    pub async fn list_contacts(&self, owner_uid: &str) -> Result<Vec<MailListResp>, AppError> {
        let mail_lists = MailListService::get().query_by_uid(owner_uid).await?;
        if mail_lists.is_empty() {
            return Ok(vec![]);
        }
        let pairs: Vec<(String, String)> = mail_lists.iter().map(|m| (m.zone.clone(), m.phone.clone())).collect();
        let users = UserService::get().query_by_zone_phones(&pairs).await?;
        let friends = UserFriendService::get().query_friends(&owner_uid.to_string()).await?;
        Ok(reconcile_contacts(mail_lists, users, friends))
    }

    /// 修改联系人名称；zone/phone 定位不到时报未找到
    pub async fn rename_contact(&self, owner_uid: &str, req: &UpdateMailListReq) -> Result<(), AppError> {
        validate_contact_name(&req.name).map_err(|_| AppError::Validation("联系人名称长度必须在1-32个字符之间".to_string()))?;

        let mail_list_service = MailListService::get();
        let existing = mail_list_service.find_by_owner_pair(owner_uid, &req.zone, &req.phone).await?;
        if existing.is_none() {
            return Err(AppError::NotFound);
        }
        mail_list_service.update_name(owner_uid, &req.zone, &req.phone, &req.name).await?;
        Ok(())
    }

    pub fn init() {
        INSTANCE.set(Arc::new(ContactManager)).unwrap_or_else(|_| panic!("ContactManager already initialized"));
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("ContactManager is not initialized").clone()
    }
}

static INSTANCE: OnceCell<Arc<ContactManager>> = OnceCell::new();

/// 区号缺省规则：留空且号码不带国际前缀时视为属主同区
pub(crate) fn effective_zone(zone: &str, phone: &str, owner_zone: &str) -> String {
    if zone.is_empty() && !phone.starts_with(INTERNATIONAL_PREFIX) { owner_zone.to_string() } else { zone.to_string() }
}

/// 过滤在册与批内重复的条目，补全区号并生成 vercode
pub(crate) fn stage_new_entries(
    owner_uid: &str,
    owner_zone: &str,
    existing: &[MailListEntity],
    incoming: &[MailListReq],
) -> Result<Vec<MailListEntity>, AppError> {
    let mut seen: HashSet<(String, String)> = existing.iter().map(|m| (m.zone.clone(), m.phone.clone())).collect();
    let mut staged = vec![];
    let create_time = now();
    for item in incoming {
        validate_contact_name(&item.name).map_err(|_| AppError::Validation("联系人名称长度必须在1-32个字符之间".to_string()))?;
        validate_phone(&item.phone).map_err(|_| AppError::Validation("手机号格式有误".to_string()))?;

        let zone = effective_zone(&item.zone, &item.phone, owner_zone);
        // 已在册或批内重复：静默跳过，不产生重复行
        if !seen.insert((zone.clone(), item.phone.clone())) {
            continue;
        }
        staged.push(MailListEntity {
            uid: owner_uid.to_string(),
            name: item.name.clone(),
            zone,
            phone: item.phone.clone(),
            vercode: build_vercode(VercodeType::MailList),
            create_time,
        });
    }
    Ok(staged)
}

/// 与用户目录、好友关系交叉比对；未注册联系人不返回
pub(crate) fn reconcile_contacts(mail_lists: Vec<MailListEntity>, users: Vec<UserEntity>, friends: Vec<FriendEntity>) -> Vec<MailListResp> {
    let mut by_pair: HashMap<(String, String), String> = HashMap::new();
    for user in users {
        if let (Some(zone), Some(phone)) = (user.zone, user.phone) {
            by_pair.insert((zone, phone), user.uid);
        }
    }
    let friend_set: HashSet<String> = friends.into_iter().map(|f| f.to_uid).collect();

    let mut result = vec![];
    for m in mail_lists {
        let Some(uid) = by_pair.get(&(m.zone.clone(), m.phone.clone())) else {
            continue;
        };
        result.push(MailListResp {
            name: m.name,
            zone: m.zone,
            phone: m.phone,
            uid: uid.clone(),
            vercode: m.vercode,
            is_friend: friend_set.contains(uid),
        });
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(zone: &str, phone: &str) -> MailListEntity {
        MailListEntity {
            uid: "owner".to_string(),
            name: "某人".to_string(),
            zone: zone.to_string(),
            phone: phone.to_string(),
            vercode: "v@2".to_string(),
            create_time: 0,
        }
    }

    fn req(name: &str, zone: &str, phone: &str) -> MailListReq {
        MailListReq { name: name.to_string(), zone: zone.to_string(), phone: phone.to_string() }
    }

    fn user(uid: &str, zone: &str, phone: &str) -> UserEntity {
        UserEntity {
            uid: uid.to_string(),
            name: uid.to_string(),
            zone: Some(zone.to_string()),
            phone: Some(phone.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_effective_zone_rules() {
        assert_eq!(effective_zone("", "13900000000", "86"), "86");
        // 国际号码不补区号
        assert_eq!(effective_zone("", "0013900000000", "86"), "");
        // 显式区号原样保留
        assert_eq!(effective_zone("1", "2025550100", "86"), "1");
    }

    #[test]
    fn test_stage_skips_existing_pair() {
        let existing = vec![entry("86", "13900000000")];
        let incoming = vec![req("Bob", "86", "13900000000"), req("Carol", "86", "13700000000")];
        let staged = stage_new_entries("owner", "86", &existing, &incoming).unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].phone, "13700000000");
    }

    #[test]
    fn test_stage_defaults_zone_then_dedups() {
        // 在册记录的区号是补全后的值，空区号再次上传同号码时仍应去重
        let existing = vec![entry("86", "13900000000")];
        let incoming = vec![req("Bob", "", "13900000000")];
        let staged = stage_new_entries("owner", "86", &existing, &incoming).unwrap();
        assert!(staged.is_empty());
    }

    #[test]
    fn test_stage_dedups_within_batch() {
        let incoming = vec![req("Bob", "86", "13900000000"), req("Bobby", "", "13900000000")];
        let staged = stage_new_entries("owner", "86", &[], &incoming).unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].name, "Bob");
    }

    #[test]
    fn test_stage_rejects_bad_name() {
        let incoming = vec![req("", "86", "13900000000")];
        assert!(matches!(stage_new_entries("owner", "86", &[], &incoming), Err(AppError::Validation(_))));

        let long_name = "x".repeat(33);
        let incoming = vec![req(&long_name, "86", "13900000000")];
        assert!(matches!(stage_new_entries("owner", "86", &[], &incoming), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_stage_generates_unique_vercodes() {
        let incoming = vec![req("Bob", "86", "13900000000"), req("Carol", "86", "13700000000")];
        let staged = stage_new_entries("owner", "86", &[], &incoming).unwrap();
        assert_eq!(staged.len(), 2);
        assert_ne!(staged[0].vercode, staged[1].vercode);
        for entity in &staged {
            assert!(entity.vercode.ends_with("@2"));
        }
    }

    #[test]
    fn test_reconcile_omits_unregistered() {
        let mail_lists = vec![entry("86", "13900000000"), entry("86", "13700000000")];
        let users = vec![user("u_bob", "86", "13900000000")];
        let result = reconcile_contacts(mail_lists, users, vec![]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].uid, "u_bob");
        assert!(!result[0].is_friend);
    }

    #[test]
    fn test_reconcile_marks_friends() {
        let mail_lists = vec![entry("86", "13900000000"), entry("86", "13700000000")];
        let users = vec![user("u_bob", "86", "13900000000"), user("u_carol", "86", "13700000000")];
        let friends = vec![FriendEntity { uid: "owner".to_string(), to_uid: "u_bob".to_string(), created_at: 0 }];
        let result = reconcile_contacts(mail_lists, users, friends);
        assert_eq!(result.len(), 2);
        let bob = result.iter().find(|r| r.uid == "u_bob").unwrap();
        let carol = result.iter().find(|r| r.uid == "u_carol").unwrap();
        assert!(bob.is_friend);
        assert!(!carol.is_friend);
    }

    #[test]
    fn test_reconcile_keeps_vercode_and_name() {
        let mut m = entry("86", "13900000000");
        m.name = "老王".to_string();
        m.vercode = "abc@2".to_string();
        let result = reconcile_contacts(vec![m], vec![user("u1", "86", "13900000000")], vec![]);
        assert_eq!(result[0].name, "老王");
        assert_eq!(result[0].vercode, "abc@2");
    }
}
