pub mod business_handler;
pub mod mail_list_handler;
pub mod swagger;

use actix_web::{HttpRequest, web};
use common::errors::AppError;

/// 业务系统认证 header
pub const BUSINESS_AUTH_HEADER: &str = "IM-Business-Token";
/// 网关注入的登录用户 header（终端会话鉴权在上游完成）
pub const LOGIN_UID_HEADER: &str = "IM-Login-UID";

pub fn configure(cfg: &mut web::ServiceConfig) {
    business_handler::configure(cfg);
    mail_list_handler::configure(cfg);
    swagger::configure(cfg);
}

pub(crate) fn business_token(req: &HttpRequest) -> Option<String> {
    req.headers().get(BUSINESS_AUTH_HEADER).and_then(|v| v.to_str().ok()).map(|v| v.to_string())
}

pub(crate) fn login_uid(req: &HttpRequest) -> Result<String, AppError> {
    let uid = req.headers().get(LOGIN_UID_HEADER).and_then(|v| v.to_str().ok()).unwrap_or_default();
    if uid.is_empty() {
        return Err(AppError::Unauthorized("缺少登录用户标识".to_string()));
    }
    Ok(uid.to_string())
}
