// ==========================================
// 库存盘点对账系统 - 输出格式化器
// ==========================================
// 职责: 分配后的掩码行 → 最终文件字段
// 红线: 非库存行原样输出；理论数量列恢复为原始值
// ==========================================
// 库存行回写列: 仓库 / 批次号 / 指示器 / 理论数量（原始）/ 调整后数量（工作数量）
// 数量统一银行家舍入为整数，0 输出为 "0"
// ==========================================

use crate::domain::mask::{MaskLayout, TheoreticalRow};
use crate::domain::reconcile::OutputRow;
use rust_decimal::{Decimal, RoundingStrategy};

/// 数量取整（银行家舍入）
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

/// 数量文本: 空值为 ""，其余为整数文本（不输出 "-0"）
pub fn render_quantity(value: Option<Decimal>) -> String {
    match value {
        None => String::new(),
        Some(v) => {
            let rounded = round_quantity(v);
            if rounded.is_zero() {
                "0".to_string()
            } else {
                rounded.normalize().to_string()
            }
        }
    }
}

pub struct OutputFormatter {
    layout: MaskLayout,
}

impl OutputFormatter {
    pub fn new(layout: MaskLayout) -> Self {
        Self { layout }
    }

    /// 格式化全部行（保持原始行顺序）
    ///
    /// 同时将工作数量写入 `adjusted_qty`
    pub fn format(&self, rows: &mut [TheoreticalRow]) -> Vec<OutputRow> {
        rows.iter_mut().map(|row| self.format_row(row)).collect()
    }

    fn format_row(&self, row: &mut TheoreticalRow) -> OutputRow {
        if !row.is_stock() {
            return OutputRow {
                line_number: row.line_number,
                fields: row.raw_fields.clone(),
            };
        }

        row.adjusted_qty = Some(row.theoretical_qty);

        let layout = &self.layout;
        let mut fields = row.raw_fields.clone();
        if fields.len() <= layout.max_index() {
            fields.resize(layout.max_index() + 1, String::new());
        }

        // 文本列仅在取值变化时覆盖，保留原始空白
        overwrite_if_changed(&mut fields[layout.depot], &row.depot);
        overwrite_if_changed(&mut fields[layout.lot_number], &row.lot_number);
        if let Some(indicator) = row.indicator {
            overwrite_if_changed(&mut fields[layout.indicator], indicator.code());
        }

        fields[layout.theoretical_qty] = render_quantity(row.original_qty);
        fields[layout.adjusted_qty] = render_quantity(row.adjusted_qty);

        OutputRow {
            line_number: row.line_number,
            fields,
        }
    }
}

fn overwrite_if_changed(field: &mut String, value: &str) {
    if field.trim() != value {
        *field = value.to_string();
    }
}
