use crate::handlers::business_token;
use crate::result::{ApiResponse, result, result_warn_msg};
use actix_web::{HttpRequest, HttpResponse, Responder, patch, post, web};
use biz_service::manager::provision_manager::{BusinessLoginReq, BusinessUpdateUserReq, ProvisionManager, UserDetailResp};
use common::errors::AppError;
use common::util::ip_util::client_public_ip;
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(business_login);
    cfg.service(business_update_user);
}

/// 业务系统登录
///
/// 带已知 uid 时直接登录，否则创建新用户后登录
#[utoipa::path(
    post,
    path = "/business/login",
    tag = "业务系统",
    summary = "登录即注册",
    request_body = BusinessLoginReq,
    responses(
        (status = 200, description = "登录成功", body = UserDetailResp),
        (status = 400, description = "请求数据格式有误"),
        (status = 401, description = "业务系统认证失败"),
    )
)]
#[post("/business/login")]
pub async fn business_login(dto: web::Json<BusinessLoginReq>, req: HttpRequest) -> Result<impl Responder, AppError> {
    let manager = ProvisionManager::get();
    manager.verify_business_token(business_token(&req).as_deref())?;
    dto.validate()?;

    // 公网地址随欢迎消息落审计
    let login_ip = client_public_ip(&req);
    let detail = manager.login_or_create(dto.into_inner(), login_ip).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// 业务系统修改用户信息
///
/// 按用户名定位；头像同步入库，失败则整单回滚
#[utoipa::path(
    patch,
    path = "/business/users/{username}",
    tag = "业务系统",
    summary = "修改用户信息",
    request_body = BusinessUpdateUserReq,
    responses(
        (status = 200, description = "修改成功", body = ApiResponse<String>),
        (status = 404, description = "用户不存在"),
        (status = 401, description = "业务系统认证失败"),
    )
)]
#[patch("/business/users/{username}")]
pub async fn business_update_user(
    path: web::Path<String>,
    dto: web::Json<BusinessUpdateUserReq>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let manager = ProvisionManager::get();
    manager.verify_business_token(business_token(&req).as_deref())?;

    let username = path.into_inner();
    if username.is_empty() {
        return Err(AppError::Validation("用户名不能为空".to_string()));
    }

    let outcome = manager.update_user(&username, &dto).await?;
    match outcome.warning {
        Some(warning) => Ok(web::Json(result_warn_msg(&warning))),
        None => Ok(web::Json(result())),
    }
}
