// ==========================================
// 库存盘点对账系统 - 差异分配引擎
// ==========================================
// 职责: 按实盘数量调整各批次理论数量
// 输入: 掩码行（可变）+ 实盘行（按模板顺序）
// 输出: 调整后的工作数量 + 指示器 + 分配汇总 + 告警
// ==========================================
// 规则（按实盘行逐一处理）:
// 1. 无匹配库存行 → 跳过并告警
// 2. 理论合计为 0 且实盘 > 0 → 首行改为 LOECART 批次，其余行清零
// 3. 差异为 0 → 不变
// 4. 盘盈 → 全部加到最新批次（无日期批次视为最新，日期非法的批次排最后）
// 5. 盘亏 → 从最老批次开始扣减，超出部分告警
// 全部处理后: 数量取整为 0 的库存行指示器置为异常
// ==========================================

use crate::domain::mask::{MatchKey, TheoreticalRow};
use crate::domain::reconcile::{DistributionSummary, RealEntry, ReconcileWarning};
use crate::domain::types::Indicator;
use crate::engine::lot_date::{ChronoKey, LotDateResolver};
use crate::engine::output_formatter::round_quantity;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use tracing::{debug, info, instrument, warn};

/// 默认的新发现库存批次标签
pub const DEFAULT_UNMATCHED_LOT_LABEL: &str = "LOECART";

// ==========================================
// DistributionOutcome - 分配结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DistributionOutcome {
    pub summary: DistributionSummary,
    pub warnings: Vec<ReconcileWarning>,
}

// ==========================================
// GapDistributionEngine - 差异分配引擎
// ==========================================
pub struct GapDistributionEngine {
    resolver: LotDateResolver,
    unmatched_lot_label: String,
}

impl GapDistributionEngine {
    pub fn new(unmatched_lot_label: impl Into<String>) -> Self {
        Self {
            resolver: LotDateResolver::new(),
            unmatched_lot_label: unmatched_lot_label.into(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 按实盘行顺序分配差异
    ///
    /// # 参数
    /// - `rows`: 掩码行（仅库存行被修改）
    /// - `entries`: 实盘行
    #[instrument(skip_all, fields(rows = rows.len(), entries = entries.len()))]
    pub fn distribute(
        &self,
        rows: &mut [TheoreticalRow],
        entries: &[RealEntry],
    ) -> DistributionOutcome {
        let mut outcome = DistributionOutcome::default();

        for entry in entries {
            self.apply_entry(rows, entry, &mut outcome);
        }

        outcome.summary.exception_rows = self.flag_depleted_rows(rows);

        info!(
            processed = outcome.summary.entries_processed,
            skipped = outcome.summary.entries_skipped,
            positive = outcome.summary.positive_gaps,
            negative = outcome.summary.negative_gaps,
            unmatched_lots = outcome.summary.unmatched_lots,
            exception_rows = outcome.summary.exception_rows,
            "差异分配完成"
        );

        outcome
    }

    fn apply_entry(
        &self,
        rows: &mut [TheoreticalRow],
        entry: &RealEntry,
        outcome: &mut DistributionOutcome,
    ) {
        let key = entry.match_key();
        let matched: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_stock() && r.matches(&key))
            .map(|(idx, _)| idx)
            .collect();

        // 1. 无匹配
        if matched.is_empty() {
            warn!(row_number = entry.row_number, key = %key, "实盘行无匹配库存行，已跳过");
            outcome.summary.entries_skipped += 1;
            outcome.warnings.push(ReconcileWarning::UnmatchedRealEntry {
                row_number: entry.row_number,
                key,
                real_qty: entry.real_qty,
            });
            return;
        }

        outcome.summary.entries_processed += 1;

        let real_qty = entry.real_qty;
        let theoretical_total = matched
            .iter()
            .fold(Decimal::ZERO, |acc, &idx| acc.saturating_add(rows[idx].theoretical_qty));

        // 2. 新发现库存
        if theoretical_total.is_zero() && real_qty > Decimal::ZERO {
            self.assign_unmatched_lot(rows, &matched, entry);
            outcome.summary.unmatched_lots += 1;
            return;
        }

        let gap = real_qty.saturating_sub(theoretical_total);
        debug!(key = %key, %theoretical_total, %real_qty, %gap, "计算差异");

        match gap.cmp(&Decimal::ZERO) {
            // 3. 无差异
            Ordering::Equal => outcome.summary.unchanged_keys += 1,
            // 4. 盘盈
            Ordering::Greater => {
                self.allocate_surplus(rows, &matched, gap);
                outcome.summary.positive_gaps += 1;
            }
            // 5. 盘亏
            Ordering::Less => {
                outcome.summary.negative_gaps += 1;
                let remainder = self.absorb_deficit(rows, &matched, -gap);
                if remainder > Decimal::ZERO {
                    warn!(key = %key, %remainder, "盘亏超过理论库存，剩余部分未被吸收");
                    outcome.warnings.push(ReconcileWarning::UnabsorbedDeficit {
                        key,
                        real_qty,
                        theoretical_total,
                        remainder,
                    });
                }
            }
        }
    }

    /// 首个匹配行改写为新发现批次，其余匹配行清零
    fn assign_unmatched_lot(&self, rows: &mut [TheoreticalRow], matched: &[usize], entry: &RealEntry) {
        let Some((&first, others)) = matched.split_first() else {
            return;
        };

        let row = &mut rows[first];
        row.lot_number = self.unmatched_lot_label.clone();
        row.indicator = Some(Indicator::Exception);
        row.depot = entry.depot.clone();
        row.theoretical_qty = entry.real_qty;

        for &idx in others {
            rows[idx].theoretical_qty = Decimal::ZERO;
        }

        debug!(
            line_number = rows[first].line_number,
            real_qty = %entry.real_qty,
            "新发现库存归入 {}", self.unmatched_lot_label
        );
    }

    /// 匹配行按批次日期排序（稳定排序，同日期保持原始顺序）
    fn order_by_date(
        &self,
        rows: &[TheoreticalRow],
        matched: &[usize],
        compare: fn(&ChronoKey, &ChronoKey) -> Ordering,
    ) -> Vec<usize> {
        let mut keyed: Vec<(usize, ChronoKey)> = matched
            .iter()
            .map(|&idx| (idx, self.resolver.resolve(&rows[idx].lot_number)))
            .collect();
        keyed.sort_by(|a, b| compare(&a.1, &b.1));
        keyed.into_iter().map(|(idx, _)| idx).collect()
    }

    /// 盘盈全部加到最新批次
    fn allocate_surplus(&self, rows: &mut [TheoreticalRow], matched: &[usize], gap: Decimal) {
        let ordered = self.order_by_date(rows, matched, ChronoKey::cmp_youngest_first);
        if let Some(&youngest) = ordered.first() {
            let row = &mut rows[youngest];
            row.theoretical_qty = row.theoretical_qty.saturating_add(gap);
        }
    }

    /// 盘亏从最老批次开始扣减
    ///
    /// # 返回
    /// 未被吸收的剩余差异（>= 0）
    fn absorb_deficit(&self, rows: &mut [TheoreticalRow], matched: &[usize], deficit: Decimal) -> Decimal {
        let ordered = self.order_by_date(rows, matched, ChronoKey::cmp_oldest_first);
        let mut remaining = deficit;

        for idx in ordered {
            if remaining <= Decimal::ZERO {
                break;
            }
            let take = rows[idx].theoretical_qty.min(remaining);
            rows[idx].theoretical_qty = rows[idx].theoretical_qty.saturating_sub(take);
            remaining = remaining.saturating_sub(take);
        }

        remaining.max(Decimal::ZERO)
    }

    /// 取整后为 0 的库存行置为异常
    ///
    /// # 返回
    /// 指示器为异常的库存行数
    fn flag_depleted_rows(&self, rows: &mut [TheoreticalRow]) -> usize {
        let mut exception_rows = 0;
        for row in rows.iter_mut().filter(|r| r.is_stock()) {
            if round_quantity(row.theoretical_qty).is_zero() {
                row.indicator = Some(Indicator::Exception);
            }
            if row.indicator == Some(Indicator::Exception) {
                exception_rows += 1;
            }
        }
        exception_rows
    }
}

impl Default for GapDistributionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_UNMATCHED_LOT_LABEL)
    }
}

/// 匹配键下当前工作数量合计
pub fn key_total(rows: &[TheoreticalRow], key: &MatchKey) -> Decimal {
    rows.iter()
        .filter(|r| r.is_stock() && r.matches(key))
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.theoretical_qty))
}
