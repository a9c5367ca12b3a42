// ==========================================
// 库存盘点对账系统 - 引擎层
// ==========================================
// 职责: 业务规则校验、汇总、差异分配、输出格式化
// 红线: 引擎不读写文件；所有分配结果可由输入完全复现
// ==========================================

pub mod aggregator;
pub mod error;
pub mod gap_distribution;
pub mod lot_date;
pub mod orchestrator;
pub mod output_formatter;
pub mod rule_validator;

// 重导出核心引擎
pub use aggregator::KeyAggregator;
pub use error::{ReconcileError, ReconcileResult};
pub use gap_distribution::{DistributionOutcome, GapDistributionEngine, DEFAULT_UNMATCHED_LOT_LABEL};
pub use lot_date::{ChronoKey, LotDateResolver};
pub use orchestrator::ReconcileOrchestrator;
pub use output_formatter::{render_quantity, round_quantity, OutputFormatter};
pub use rule_validator::{BusinessRuleValidator, RuleViolation};
