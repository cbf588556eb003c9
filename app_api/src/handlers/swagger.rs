use crate::handlers::business_handler::*;
use crate::handlers::mail_list_handler::*;
use crate::result::ApiResponse;

use actix_web::{HttpResponse, Responder, get, web};
use biz_service::manager::contact_manager::{MailListReq, MailListResp, UpdateMailListReq};
use biz_service::manager::provision_manager::{BusinessLoginReq, BusinessUpdateUserReq, DeviceReq, UserDetailResp};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        //业务系统
        business_login,
        business_update_user,

        //通讯录
        add_mail_list,
        add_single_mail_list,
        get_mail_list,
        update_mail_list,
    ),
    components(schemas(
        ApiResponse<String>,
        BusinessLoginReq,
        BusinessUpdateUserReq,
        DeviceReq,
        UserDetailResp,
        MailListReq,
        MailListResp,
        UpdateMailListReq,
    ))
)]
pub struct ApiDoc;

#[get("/api-doc/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(openapi_json);
}
