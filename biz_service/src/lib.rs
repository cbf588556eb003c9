use common::config::AppConfig;
use mongodb::Database;

pub mod biz_const;
pub mod biz_service;
pub mod entitys;
pub mod manager;
pub mod task;
pub mod util;

pub async fn init_service(db: Database, cfg: &AppConfig) {
    biz_service::init_service(db, cfg).await;
    manager::init_manager(cfg);
    task::TaskService::init(biz_const::TASK_QUEUE_CAPACITY, biz_const::TASK_WORKER_COUNT);
}
