// ==========================================
// 库存盘点对账系统 - 配置层
// ==========================================
// 职责: 系统配置管理，支持文件覆写
// 存储: JSON 配置文件
// ==========================================

pub mod config_manager;
pub mod reconcile_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, CONFIG_PATH_ENV};
pub use reconcile_config_trait::ReconcileConfigReader;
