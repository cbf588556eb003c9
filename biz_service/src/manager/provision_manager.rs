use crate::biz_const::LOGIN_TOKEN_TTL_SECS;
use crate::biz_service::avatar_service::AvatarService;
use crate::biz_service::cmd_service::CmdEvent;
use crate::biz_service::friend_service::UserFriendService;
use crate::biz_service::user_service::UserService;
use crate::entitys::user_entity::{Sex, UserEntity};
use crate::task::{SideTask, TaskService};
use common::ClientTokenDto;
use common::config::BusinessConfig;
use common::db::Db;
use common::errors::AppError;
use common::redis::redis_pool::get_redis_conn;
use common::repository_util::{Repository, begin_transaction, is_duplicate_key};
use common::util::common_utils::build_uuid;
use common::util::date_util::now;
use common::util::validate::validate_contact_name;
use deadpool_redis::redis::AsyncCommands;
use mongodb::bson::doc;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// 业务系统登录请求
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct BusinessLoginReq {
    /// 业务系统用户ID，可选
    #[serde(default)]
    pub uid: Option<String>,
    /// 用户昵称
    #[validate(length(min = 1, max = 32, message = "用户昵称不能为空"))]
    pub name: String,
    /// 性别 0:未知 1:男 2:女
    #[serde(default)]
    pub sex: u8,
    /// 设备标记 0:APP 1:PC
    #[serde(default)]
    pub flag: u8,
    /// 设备信息
    #[serde(default)]
    pub device: Option<DeviceReq>,
    /// 区号
    #[serde(default)]
    pub zone: Option<String>,
    /// 手机号
    #[serde(default)]
    pub phone: Option<String>,
    /// 用户名
    #[serde(default)]
    pub username: Option<String>,
    /// 头像链接
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct DeviceReq {
    /// 设备标识
    pub device_id: String,
    /// 设备名称
    #[serde(default)]
    pub device_name: Option<String>,
    /// 设备型号
    #[serde(default)]
    pub device_model: Option<String>,
}

/// 业务系统修改用户信息请求
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct BusinessUpdateUserReq {
    /// 用户昵称
    #[serde(default)]
    pub name: Option<String>,
    /// 性别 0:未知 1:男 2:女
    #[serde(default)]
    pub sex: Option<u8>,
    /// 头像链接
    #[serde(default)]
    pub avatar: Option<String>,
}

impl BusinessUpdateUserReq {
    pub fn check(&self) -> Result<(), AppError> {
        let name = normalize_opt(&self.name);
        let avatar = normalize_opt(&self.avatar);
        if name.is_none() && self.sex.is_none() && avatar.is_none() {
            return Err(AppError::Validation("请至少提供一个需要修改的字段".to_string()));
        }
        if let Some(name) = name {
            validate_contact_name(&name).map_err(|_| AppError::Validation("用户昵称长度必须在1-32个字符之间".to_string()))?;
        }
        if let Some(sex) = self.sex {
            Sex::try_from(sex).map_err(|_| AppError::Validation("性别参数错误".to_string()))?;
        }
        Ok(())
    }
}

/// 登录结果
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDetailResp {
    pub uid: String,
    pub name: String,
    pub username: Option<String>,
    pub zone: Option<String>,
    pub phone: Option<String>,
    pub sex: u8,
    pub device_flag: u8,
    /// 会话令牌
    pub token: String,
    /// 本次请求是否新建了用户
    pub is_new_user: bool,
}

/// 修改用户结果；warning 为提交成功后发生的非致命告警
#[derive(Debug, Default)]
pub struct UpdateUserOutcome {
    pub warning: Option<String>,
}

/// 开通编排器：登录即注册 + 用户信息修改
/// 业务 token 白名单在构造时注入，不读全局状态
pub struct ProvisionManager {
    business: BusinessConfig,
}

impl ProvisionManager {
    pub fn new(business: BusinessConfig) -> Self {
        Self { business }
    }

    /// 业务系统 token 校验；白名单为空时拒绝一切调用
    pub fn verify_business_token(&self, token: Option<&str>) -> Result<(), AppError> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AppError::Unauthorized("缺少业务系统认证信息".to_string())),
        };
        if !self.business.tokens.iter().any(|t| t == token) {
            return Err(AppError::Unauthorized("业务系统认证失败".to_string()));
        }
        Ok(())
    }

    /// 登录即注册：带 uid 且在册则直接登录，否则事务内创建
    pub async fn login_or_create(&self, req: BusinessLoginReq, login_ip: String) -> Result<UserDetailResp, AppError> {
        Sex::try_from(req.sex).map_err(|_| AppError::Validation("性别参数错误".to_string()))?;

        let user_service = UserService::get();
        let mut user_info: Option<UserEntity> = None;
        if let Some(uid) = req.uid.as_deref() {
            if !uid.is_empty() {
                user_info = user_service.find_by_uid(uid).await?;
            }
        }

        let (user, is_new) = match user_info {
            Some(user) => {
                // 用户存在，直接登录；顺带记录最新设备（尽力而为）
                let device_id = req.device.as_ref().map(|d| d.device_id.as_str());
                if let Err(e) = user_service.record_device(&user.uid, req.flag, device_id).await {
                    log::warn!("记录登录设备失败: {:?}", e);
                }
                (user, false)
            }
            None => self.create_user(&req).await?,
        };

        // 会话登记
        let token = self.build_token(&user.uid, req.flag).await?;

        // 旁路任务与请求生命周期解耦，失败不影响本次响应
        if let Some(avatar) = req.avatar.as_deref() {
            if !avatar.is_empty() {
                TaskService::get().dispatch(SideTask::AvatarIngest { uid: user.uid.clone(), avatar_url: avatar.to_string() });
            }
        }
        TaskService::get().dispatch(SideTask::WelcomeMessage { uid: user.uid.clone(), login_ip });

        Ok(UserDetailResp {
            uid: user.uid,
            name: user.name,
            username: user.username,
            zone: user.zone,
            phone: user.phone,
            sex: user.sex,
            device_flag: req.flag,
            token,
            is_new_user: is_new,
        })
    }

    /// 事务内创建新用户；zone+phone 唯一冲突视为已存在并转登录
    async fn create_user(&self, req: &BusinessLoginReq) -> Result<(UserEntity, bool), AppError> {
        let user_service = UserService::get();
        let now = now();
        let entity = UserEntity {
            uid: build_uuid(),
            name: req.name.clone(),
            username: normalize_opt(&req.username),
            sex: req.sex,
            device_flag: req.flag,
            device_id: req.device.as_ref().map(|d| d.device_id.clone()),
            zone: normalize_opt(&req.zone),
            phone: normalize_opt(&req.phone),
            is_upload_avatar: false,
            create_time: now,
            update_time: now,
        };

        let mut session = begin_transaction(Db::client()).await.map_err(|e| {
            log::error!("创建事务失败: {:?}", e);
            AppError::Transaction("创建事务失败".to_string())
        })?;

        if let Err(e) = user_service.dao.insert_with_session(&entity, &mut session).await {
            let _ = session.abort_transaction().await;
            if is_duplicate_key(&e) {
                // 并发创建或重复上报，按已存在处理：重查后转登录
                if let Some(existing) = self.refetch_existing(req).await? {
                    log::info!("用户已存在，转登录: uid={}", existing.uid);
                    return Ok((existing, false));
                }
            }
            log::error!("创建用户失败: {:?}", e);
            return Err(AppError::Transaction("注册失败".to_string()));
        }

        // 提交只尝试一次，失败按失败上报（至多一次可见）
        if let Err(e) = session.commit_transaction().await {
            log::error!("数据库事务提交失败: {:?}", e);
            return Err(AppError::Transaction("数据库事务提交失败".to_string()));
        }

        Ok((entity, true))
    }

    async fn refetch_existing(&self, req: &BusinessLoginReq) -> Result<Option<UserEntity>, AppError> {
        let user_service = UserService::get();
        if let (Some(zone), Some(phone)) = (normalize_opt(&req.zone), normalize_opt(&req.phone)) {
            if let Some(user) = user_service.find_by_zone_phone(&zone, &phone).await? {
                return Ok(Some(user));
            }
        }
        if let Some(username) = normalize_opt(&req.username) {
            if let Some(user) = user_service.find_by_username(&username).await? {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    /// 会话令牌写入 Redis，`token:{token}` -> dto，1 小时有效
    async fn build_token(&self, uid: &str, device_flag: u8) -> Result<String, AppError> {
        let token = build_uuid();
        let dto = ClientTokenDto { uid: uid.to_string(), device_flag };
        let token_str = serde_json::to_string(&dto)?;
        let mut conn = get_redis_conn().await?;
        let key = format!("token:{}", token);
        let _: () = conn.set_ex(key, token_str, LOGIN_TOKEN_TTL_SECS).await?;
        Ok(token)
    }

    /// 业务系统修改用户信息：基础字段与头像同一事务，头像失败回滚整单
    pub async fn update_user(&self, username: &str, req: &BusinessUpdateUserReq) -> Result<UpdateUserOutcome, AppError> {
        req.check()?;

        let user_service = UserService::get();
        let user = user_service.find_by_username(username).await?.ok_or(AppError::NotFound)?;

        let mut session = begin_transaction(Db::client()).await.map_err(|e| {
            log::error!("创建事务失败: {:?}", e);
            AppError::Transaction("创建事务失败".to_string())
        })?;

        let mut set_doc = doc! { "update_time": now() as i64 };
        if let Some(name) = normalize_opt(&req.name) {
            set_doc.insert("name", name);
        }
        if let Some(sex) = req.sex {
            set_doc.insert("sex", sex as i32);
        }
        if set_doc.len() > 1 {
            if let Err(e) = user_service.dao.update_with_session(doc! { "uid": &user.uid }, doc! { "$set": set_doc }, &mut session).await {
                let _ = session.abort_transaction().await;
                log::error!("修改用户信息失败: {:?}", e);
                return Err(AppError::Transaction("修改用户信息失败".to_string()));
            }
        }

        // 头像在本路径同步入库，结果决定事务提交与否
        let mut avatar_ingested = false;
        if let Some(avatar_url) = normalize_opt(&req.avatar) {
            if let Err(e) = AvatarService::get().ingest_avatar(&avatar_url, &user.uid).await {
                let _ = session.abort_transaction().await;
                log::error!("头像入库失败: {:?}", e);
                return Err(AppError::from(e));
            }
            avatar_ingested = true;
        }

        if let Err(e) = session.commit_transaction().await {
            log::error!("数据库事务提交失败: {:?}", e);
            return Err(AppError::Transaction("数据库事务提交失败".to_string()));
        }

        // 提交后好友扇出；失败不回滚已提交状态，仅以告警形式返回
        let mut warning = None;
        if avatar_ingested {
            let event = CmdEvent::AvatarUpdate { uid: user.uid.clone() };
            if let Err(e) = UserFriendService::get().notify_friends(&user.uid, &event).await {
                log::error!("通知好友头像更新失败: {:?}", e);
                warning = Some("通知好友头像更新失败".to_string());
            }
        }

        Ok(UpdateUserOutcome { warning })
    }

    pub fn init(business: BusinessConfig) {
        let instance = Self::new(business);
        INSTANCE.set(Arc::new(instance)).unwrap_or_else(|_| panic!("ProvisionManager already initialized"));
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("ProvisionManager is not initialized").clone()
    }
}

static INSTANCE: OnceCell<Arc<ProvisionManager>> = OnceCell::new();

pub(crate) fn normalize_opt(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with_tokens(tokens: &[&str]) -> ProvisionManager {
        ProvisionManager::new(BusinessConfig {
            tokens: tokens.iter().map(|s| s.to_string()).collect(),
            welcome_message: "欢迎".to_string(),
        })
    }

    #[test]
    fn test_verify_token_missing() {
        let manager = manager_with_tokens(&["secret-a"]);
        assert!(matches!(manager.verify_business_token(None), Err(AppError::Unauthorized(_))));
        assert!(matches!(manager.verify_business_token(Some("")), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_verify_token_invalid() {
        let manager = manager_with_tokens(&["secret-a", "secret-b"]);
        assert!(matches!(manager.verify_business_token(Some("secret-c")), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_verify_token_ok() {
        let manager = manager_with_tokens(&["secret-a", "secret-b"]);
        assert!(manager.verify_business_token(Some("secret-b")).is_ok());
    }

    #[test]
    fn test_verify_token_empty_allowlist_rejects_all() {
        let manager = manager_with_tokens(&[]);
        assert!(manager.verify_business_token(Some("anything")).is_err());
    }

    #[test]
    fn test_update_req_requires_one_field() {
        let req = BusinessUpdateUserReq { name: None, sex: None, avatar: None };
        assert!(matches!(req.check(), Err(AppError::Validation(_))));

        let req = BusinessUpdateUserReq { name: Some("".to_string()), sex: None, avatar: Some("".to_string()) };
        assert!(matches!(req.check(), Err(AppError::Validation(_))));

        let req = BusinessUpdateUserReq { name: None, sex: Some(1), avatar: None };
        assert!(req.check().is_ok());
    }

    #[test]
    fn test_update_req_rejects_bad_sex_and_name() {
        let req = BusinessUpdateUserReq { name: None, sex: Some(9), avatar: None };
        assert!(matches!(req.check(), Err(AppError::Validation(_))));

        let req = BusinessUpdateUserReq { name: Some("x".repeat(33)), sex: None, avatar: None };
        assert!(matches!(req.check(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_normalize_opt() {
        assert_eq!(normalize_opt(&None), None);
        assert_eq!(normalize_opt(&Some("".to_string())), None);
        assert_eq!(normalize_opt(&Some("abc".to_string())), Some("abc".to_string()));
    }
}
