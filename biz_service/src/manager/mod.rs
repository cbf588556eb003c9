pub mod contact_manager;
pub mod provision_manager;

use common::config::AppConfig;

pub fn init_manager(cfg: &AppConfig) {
    provision_manager::ProvisionManager::init(cfg.get_business());
    contact_manager::ContactManager::init();
}
