// ==========================================
// 库存盘点对账系统 - 引擎编排器
// ==========================================
// 用途: 协调校验 → 汇总 / 分配 → 格式化的执行顺序
// 红线: 业务规则未通过时不得修改任何数量
// ==========================================

use crate::config::ReconcileConfigReader;
use crate::domain::mask::{MaskLayout, ParsedMask};
use crate::domain::reconcile::{AggregatedRow, RealEntry, ReconcileReport};
use crate::domain::types::DepotType;
use crate::engine::aggregator::KeyAggregator;
use crate::engine::error::{ReconcileError, ReconcileResult};
use crate::engine::gap_distribution::GapDistributionEngine;
use crate::engine::output_formatter::OutputFormatter;
use crate::engine::rule_validator::{BusinessRuleValidator, RuleViolation};
use tracing::{info, instrument};

// ==========================================
// ReconcileOrchestrator - 引擎编排器
// ==========================================
pub struct ReconcileOrchestrator {
    validator: BusinessRuleValidator,
    aggregator: KeyAggregator,
    distributor: GapDistributionEngine,
    formatter: OutputFormatter,
}

impl ReconcileOrchestrator {
    pub fn new(layout: MaskLayout, unmatched_lot_label: impl Into<String>) -> Self {
        Self {
            validator: BusinessRuleValidator::new(),
            aggregator: KeyAggregator::new(),
            distributor: GapDistributionEngine::new(unmatched_lot_label),
            formatter: OutputFormatter::new(layout),
        }
    }

    /// 从配置读取器构建
    pub fn from_config<C: ReconcileConfigReader>(config: &C) -> Self {
        Self::new(config.get_mask_layout(), config.get_unmatched_lot_label())
    }

    /// 仅做业务规则校验
    pub fn check(&self, mask: &ParsedMask, depot_type: DepotType) -> Vec<RuleViolation> {
        self.validator.validate(&mask.rows, depot_type)
    }

    fn ensure_valid(&self, mask: &ParsedMask, depot_type: DepotType) -> ReconcileResult<()> {
        let violations = self.check(mask, depot_type);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ReconcileError::from_violations(violations))
        }
    }

    /// 生成实盘模板行
    #[instrument(skip(self, mask), fields(depot_type = %depot_type))]
    pub fn build_template(
        &self,
        mask: &ParsedMask,
        depot_type: DepotType,
    ) -> ReconcileResult<Vec<AggregatedRow>> {
        self.ensure_valid(mask, depot_type)?;

        let rows = self.aggregator.aggregate(&mask.rows);
        info!(template_rows = rows.len(), "模板生成完成");
        Ok(rows)
    }

    /// 执行对账: 校验 → 分配 → 格式化
    #[instrument(skip(self, mask, entries), fields(depot_type = %depot_type, entries = entries.len()))]
    pub fn reconcile(
        &self,
        mut mask: ParsedMask,
        entries: &[RealEntry],
        depot_type: DepotType,
    ) -> ReconcileResult<ReconcileReport> {
        self.ensure_valid(&mask, depot_type)?;

        let outcome = self.distributor.distribute(&mut mask.rows, entries);
        let rows = self.formatter.format(&mut mask.rows);

        info!(
            output_rows = rows.len(),
            warnings = outcome.warnings.len(),
            "对账完成"
        );

        Ok(ReconcileReport {
            rows,
            summary: outcome.summary,
            warnings: outcome.warnings,
        })
    }
}
