// ==========================================
// 库存盘点对账系统 - 核心库
// ==========================================
// 技术栈: Rust + CSV / Excel
// 系统定位: Sage X3 盘点掩码的实盘差异分配工具
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "fr");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 导出层 - 文件写出
pub mod exporter;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DepotType, Indicator, LineKind, LotStatus, TemplateFormat};

// 领域实体
pub use domain::{
    AggregatedRow, DistributionSummary, MaskLayout, MaskMetadata, MaskStats, MatchKey,
    OutputRow, ParsedMask, RealEntry, ReconcileReport, ReconcileWarning, ReportingKey,
    TheoreticalRow,
};

// 引擎
pub use engine::{
    BusinessRuleValidator, ChronoKey, GapDistributionEngine, KeyAggregator, LotDateResolver,
    OutputFormatter, ReconcileError, ReconcileOrchestrator, RuleViolation,
};

// API
pub use api::{ApiError, ApiResult, ReconcileApi};

// 配置
pub use config::{ConfigManager, ReconcileConfigReader};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Moulinette";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
