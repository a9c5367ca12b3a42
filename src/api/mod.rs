// ==========================================
// 库存盘点对账系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令行调用
// ==========================================

pub mod error;
pub mod reconcile_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use reconcile_api::{CheckResponse, FinalizeResponse, ReconcileApi, TemplateResponse};
