use crate::handlers::{business_token, login_uid};
use crate::result::{ApiResponse, result};
use actix_web::{HttpRequest, Responder, get, post, put, web};
use biz_service::manager::contact_manager::{ContactManager, MailListReq, MailListResp, UpdateMailListReq};
use biz_service::manager::provision_manager::ProvisionManager;
use common::errors::AppError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(add_mail_list);
    cfg.service(add_single_mail_list);
    cfg.service(get_mail_list);
    cfg.service(update_mail_list);
}

fn check_request(req: &HttpRequest) -> Result<String, AppError> {
    ProvisionManager::get().verify_business_token(business_token(req).as_deref())?;
    login_uid(req)
}

/// 批量上传通讯录
///
/// 已在册的 (区号, 手机号) 对静默跳过，新条目整批一个事务入库
#[utoipa::path(
    post,
    path = "/maillist",
    tag = "通讯录",
    summary = "批量上传通讯录",
    request_body = Vec<MailListReq>,
    responses(
        (status = 200, description = "成功", body = ApiResponse<String>),
        (status = 400, description = "请求数据格式有误"),
    )
)]
#[post("/maillist")]
pub async fn add_mail_list(dto: web::Json<Vec<MailListReq>>, req: HttpRequest) -> Result<impl Responder, AppError> {
    let uid = check_request(&req)?;
    ContactManager::get().add_contacts(&uid, dto.into_inner()).await?;
    Ok(web::Json(result()))
}

/// 添加单条通讯录记录
#[utoipa::path(
    post,
    path = "/maillist/single",
    tag = "通讯录",
    summary = "添加单条联系人",
    request_body = MailListReq,
    responses(
        (status = 200, description = "成功", body = ApiResponse<String>),
        (status = 409, description = "该联系人已存在于通讯录中"),
    )
)]
#[post("/maillist/single")]
pub async fn add_single_mail_list(dto: web::Json<MailListReq>, req: HttpRequest) -> Result<impl Responder, AppError> {
    let uid = check_request(&req)?;
    ContactManager::get().add_single_contact(&uid, &dto).await?;
    Ok(web::Json(result()))
}

/// 获取通讯录比对结果
///
/// 仅返回已注册为用户的联系人，并标记是否已是好友
#[utoipa::path(
    get,
    path = "/maillist",
    tag = "通讯录",
    summary = "获取通讯录",
    responses(
        (status = 200, description = "比对结果", body = Vec<MailListResp>),
    )
)]
#[get("/maillist")]
pub async fn get_mail_list(req: HttpRequest) -> Result<impl Responder, AppError> {
    let uid = check_request(&req)?;
    let list = ContactManager::get().list_contacts(&uid).await?;
    Ok(web::Json(list))
}

/// 修改联系人名称
#[utoipa::path(
    put,
    path = "/maillist",
    tag = "通讯录",
    summary = "修改联系人名称",
    request_body = UpdateMailListReq,
    responses(
        (status = 200, description = "成功", body = ApiResponse<String>),
        (status = 404, description = "未找到该联系人"),
    )
)]
#[put("/maillist")]
pub async fn update_mail_list(dto: web::Json<UpdateMailListReq>, req: HttpRequest) -> Result<impl Responder, AppError> {
    let uid = check_request(&req)?;
    ContactManager::get().rename_contact(&uid, &dto).await?;
    Ok(web::Json(result()))
}
