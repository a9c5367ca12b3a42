// ==========================================
// 库存盘点对账系统 - 汇总引擎
// ==========================================
// 职责: 库存行按 (盘点号, 物料, 仓库, 库位, 单位) 汇总为模板行
// 输入: 掩码行（非库存行忽略）
// 输出: 每个汇总键一行，按首次出现顺序；实盘数量初始化为 0
// ==========================================

use crate::domain::mask::{ReportingKey, TheoreticalRow};
use crate::domain::reconcile::AggregatedRow;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, instrument};

// ==========================================
// KeyAggregator - 汇总引擎
// ==========================================
pub struct KeyAggregator {
    // 无状态引擎
}

impl KeyAggregator {
    pub fn new() -> Self {
        Self {}
    }

    /// 汇总库存行
    ///
    /// 会话号取该键下第一行的值；理论数量为工作数量之和（溢出时饱和）
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub fn aggregate(&self, rows: &[TheoreticalRow]) -> Vec<AggregatedRow> {
        let mut index: HashMap<ReportingKey, usize> = HashMap::new();
        let mut aggregated: Vec<AggregatedRow> = Vec::new();

        for row in rows.iter().filter(|r| r.is_stock()) {
            let key = row.reporting_key();
            match index.get(&key) {
                Some(&pos) => {
                    let total = &mut aggregated[pos].theoretical_qty;
                    *total = total.saturating_add(row.theoretical_qty);
                }
                None => {
                    index.insert(key, aggregated.len());
                    aggregated.push(AggregatedRow {
                        session_num: row.session_num.clone(),
                        inventory_num: row.inventory_num.clone(),
                        article_code: row.article_code.clone(),
                        theoretical_qty: row.theoretical_qty,
                        real_qty: Decimal::ZERO,
                        depot: row.depot.clone(),
                        location: row.location.clone(),
                        unit: row.unit.clone(),
                    });
                }
            }
        }

        debug!(keys = aggregated.len(), "汇总完成");
        aggregated
    }
}

impl Default for KeyAggregator {
    fn default() -> Self {
        Self::new()
    }
}
