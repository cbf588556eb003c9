use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use app_api::handlers;
use common::config::AppConfig;
use common::db::Db;
use common::redis::redis_pool::init_redis_pool;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 读取配置文件
    AppConfig::init(&"api-config.toml".to_string());
    let app_cfg = AppConfig::get();
    // 初始化日志
    let log_level = app_cfg.get_sys().log_level;
    let log_level = if log_level.is_empty() { "info".to_string() } else { log_level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // 初始化存储与业务服务
    Db::init(&app_cfg.get_database()).await.expect("MongoDB init failed");
    init_redis_pool(&app_cfg.get_redis().url).expect("Redis pool init failed");
    biz_service::init_service(Db::get().clone(), &app_cfg).await;

    let address_and_port = format!("{}:{}", &app_cfg.get_server().host, &app_cfg.get_server().port);
    log::info!("Starting server on {}", address_and_port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            // 配置 控制器
            .configure(|cfg| {
                handlers::configure(cfg);
            })
    })
    .keep_alive(actix_web::http::KeepAlive::Timeout(std::time::Duration::from_secs(600))) // 允许 10 分钟超时
    .bind(address_and_port)?
    .run()
    .await
}
