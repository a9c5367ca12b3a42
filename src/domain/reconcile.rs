// ==========================================
// 库存盘点对账系统 - 对账实体
// ==========================================
// 职责: 定义汇总模板行、实盘行、对账告警、对账报告
// ==========================================

use crate::domain::mask::MatchKey;
use crate::i18n::t_with_args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// 实盘模板列名
// ==========================================
pub mod template_columns {
    pub const SESSION_NUM: &str = "NUMERO_SESSION";
    pub const INVENTORY_NUM: &str = "NUMERO_INVENTAIRE";
    pub const ARTICLE_CODE: &str = "CODE_ARTICLE";
    pub const THEORETICAL_QTY: &str = "QUANTITE_THEORIQUE";
    pub const REAL_QTY: &str = "QUANTITE_REELLE";
    pub const DEPOT: &str = "DEPOT";
    pub const LOCATION: &str = "EMPLACEMENT";
    pub const UNIT: &str = "UNITE";

    /// 模板表头（写出顺序）
    pub const HEADERS: [&str; 8] = [
        SESSION_NUM,
        INVENTORY_NUM,
        ARTICLE_CODE,
        THEORETICAL_QTY,
        REAL_QTY,
        DEPOT,
        LOCATION,
        UNIT,
    ];

    /// 回填模板必需列
    pub const REQUIRED: [&str; 5] = [INVENTORY_NUM, ARTICLE_CODE, REAL_QTY, DEPOT, LOCATION];
}

// ==========================================
// AggregatedRow - 汇总模板行
// ==========================================
// 列顺序: 会话号, 盘点号, 物料, 理论数量, 实盘数量, 仓库, 库位, 单位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub session_num: String,
    pub inventory_num: String,
    pub article_code: String,
    pub theoretical_qty: Decimal,
    pub real_qty: Decimal, // 占位，初始化为 0，由用户填写
    pub depot: String,
    pub location: String,
    pub unit: String,
}

// ==========================================
// RealEntry - 实盘行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealEntry {
    pub row_number: usize,    // 模板文件行号（数据行，1 起）
    pub inventory_num: String,
    pub article_code: String,
    pub depot: String,
    pub location: String,
    pub unit: Option<String>, // 仅携带，不参与匹配
    pub real_qty: Decimal,    // 空值/无法解析时为 0
}

impl RealEntry {
    pub fn match_key(&self) -> MatchKey {
        MatchKey {
            inventory_num: self.inventory_num.clone(),
            article_code: self.article_code.clone(),
            depot: self.depot.clone(),
            location: self.location.clone(),
        }
    }
}

// ==========================================
// ReconcileWarning - 对账告警
// ==========================================
// 不阻断处理，只暴露给调用方
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcileWarning {
    /// 实盘行在掩码中找不到对应库存行，已跳过
    UnmatchedRealEntry {
        row_number: usize,
        key: MatchKey,
        real_qty: Decimal,
    },
    /// 负差异超过该键下全部库存，剩余部分未被吸收
    UnabsorbedDeficit {
        key: MatchKey,
        real_qty: Decimal,
        theoretical_total: Decimal,
        remainder: Decimal,
    },
}

impl ReconcileWarning {
    /// 当前语言下的提示信息
    pub fn message(&self) -> String {
        match self {
            ReconcileWarning::UnmatchedRealEntry {
                row_number,
                key,
                real_qty,
            } => t_with_args(
                "warning.unmatched_real_entry",
                &[
                    ("row", &row_number.to_string()),
                    ("key", &key.to_string()),
                    ("qty", &real_qty.normalize().to_string()),
                ],
            ),
            ReconcileWarning::UnabsorbedDeficit {
                key,
                real_qty,
                theoretical_total,
                remainder,
            } => t_with_args(
                "warning.unabsorbed_deficit",
                &[
                    ("key", &key.to_string()),
                    ("remainder", &remainder.normalize().to_string()),
                    ("theoretical", &theoretical_total.normalize().to_string()),
                    ("qty", &real_qty.normalize().to_string()),
                ],
            ),
        }
    }
}

// ==========================================
// DistributionSummary - 分配汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub entries_processed: usize, // 已处理的实盘行
    pub entries_skipped: usize,   // 无匹配被跳过的实盘行
    pub unchanged_keys: usize,    // 无差异
    pub positive_gaps: usize,     // 盘盈
    pub negative_gaps: usize,     // 盘亏
    pub unmatched_lots: usize,    // LOECART（理论为 0 的新发现库存）
    pub exception_rows: usize,    // 最终指示器为异常的库存行
}

// ==========================================
// OutputRow - 输出行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    pub line_number: usize,
    pub fields: Vec<String>,
}

// ==========================================
// ReconcileReport - 对账报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub rows: Vec<OutputRow>,
    pub summary: DistributionSummary,
    pub warnings: Vec<ReconcileWarning>,
}
