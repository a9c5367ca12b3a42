// ==========================================
// 库存盘点对账系统 - 领域模型层
// ==========================================
// 职责: 定义掩码行、实盘行、对账结果等实体与类型
// 红线: 不含文件读写逻辑,不含分配逻辑
// ==========================================

pub mod mask;
pub mod reconcile;
pub mod types;

// 重导出核心类型
pub use mask::{
    MaskLayout, MaskMetadata, MaskStats, MatchKey, ParsedMask, ReportingKey, TheoreticalRow,
};
pub use reconcile::{
    AggregatedRow, DistributionSummary, OutputRow, RealEntry, ReconcileReport, ReconcileWarning,
};
pub use types::{DepotType, Indicator, LineKind, LotStatus, TemplateFormat};
