// ==========================================
// 库存盘点对账系统 - 掩码（理论库存）实体
// ==========================================
// 依据: Sage X3 盘点掩码列定义
// 职责: 定义掩码行、列布局、汇总键、元信息
// 红线: 不含解析逻辑，不含分配逻辑
// ==========================================

use crate::domain::types::{Indicator, LineKind, LotStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// MaskLayout - 掩码列布局
// ==========================================
// 解析时一次性确定，之后所有字段按名称访问
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskLayout {
    pub line_kind: usize,       // 行类型 (S/E/L)
    pub session_num: usize,     // 会话号
    pub inventory_num: usize,   // 盘点号
    pub depot: usize,           // 站点/仓库
    pub theoretical_qty: usize, // 理论数量（F 列）
    pub adjusted_qty: usize,    // 调整后数量（G 列）
    pub indicator: usize,       // 指示器（H 列）
    pub article_code: usize,    // 物料编码
    pub location: usize,        // 库位
    pub status: usize,          // 批次状态
    pub unit: usize,            // 单位
    pub lot_number: usize,      // 批次号
}

impl Default for MaskLayout {
    fn default() -> Self {
        Self {
            line_kind: 0,
            session_num: 1,
            inventory_num: 2,
            depot: 4,
            theoretical_qty: 5,
            adjusted_qty: 6,
            indicator: 7,
            article_code: 8,
            location: 9,
            status: 10,
            unit: 11,
            lot_number: 14,
        }
    }
}

impl MaskLayout {
    /// 布局涉及的最大列索引（用于回写时补齐字段）
    pub fn max_index(&self) -> usize {
        [
            self.line_kind,
            self.session_num,
            self.inventory_num,
            self.depot,
            self.theoretical_qty,
            self.adjusted_qty,
            self.indicator,
            self.article_code,
            self.location,
            self.status,
            self.unit,
            self.lot_number,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

// ==========================================
// ReportingKey - 汇总键
// ==========================================
// (盘点号, 物料, 仓库, 库位, 单位)，同一键下可有多个批次
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportingKey {
    pub inventory_num: String,
    pub article_code: String,
    pub depot: String,
    pub location: String,
    pub unit: String,
}

// ==========================================
// MatchKey - 实盘匹配键
// ==========================================
// 实盘行与理论行按此键匹配（不含单位）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchKey {
    pub inventory_num: String,
    pub article_code: String,
    pub depot: String,
    pub location: String,
}

impl std::fmt::Display for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.inventory_num, self.article_code, self.depot, self.location
        )
    }
}

// ==========================================
// TheoreticalRow - 掩码行
// ==========================================
// theoretical_qty 为分配过程中的工作列；original_qty 为解析时的快照，分配过程不修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoreticalRow {
    pub line_number: usize,              // 原始文件行号（1 起）
    pub line_kind: LineKind,             // 行类型
    pub session_num: String,             // 会话号
    pub inventory_num: String,           // 盘点号
    pub depot: String,                   // 站点/仓库
    pub original_qty: Option<Decimal>,   // 原始理论数量快照（空值/无法解析时为 None）
    pub theoretical_qty: Decimal,        // 工作数量（无法解析时为 0）
    pub adjusted_qty: Option<Decimal>,   // 最终数量（格式化前未设置）
    pub indicator: Option<Indicator>,    // 指示器（无法识别时为 None，原样回写）
    pub article_code: String,            // 物料编码
    pub location: String,                // 库位
    pub status: Option<LotStatus>,       // 批次状态
    pub unit: String,                    // 单位
    pub lot_number: String,              // 批次号（可为空）
    pub raw_fields: Vec<String>,         // 原始字段
}

impl TheoreticalRow {
    pub fn is_stock(&self) -> bool {
        self.line_kind.is_stock()
    }

    pub fn reporting_key(&self) -> ReportingKey {
        ReportingKey {
            inventory_num: self.inventory_num.clone(),
            article_code: self.article_code.clone(),
            depot: self.depot.clone(),
            location: self.location.clone(),
            unit: self.unit.clone(),
        }
    }

    /// 是否与匹配键一致（不比较单位）
    pub fn matches(&self, key: &MatchKey) -> bool {
        self.inventory_num == key.inventory_num
            && self.article_code == key.article_code
            && self.depot == key.depot
            && self.location == key.location
    }

    /// 读取原始字段（越界返回空串）
    pub fn raw_field(&self, index: usize) -> &str {
        self.raw_fields.get(index).map(String::as_str).unwrap_or("")
    }
}

// ==========================================
// MaskMetadata - 掩码元信息
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskMetadata {
    pub session_num: String,   // E 行第 2 列
    pub inventory_num: String, // L 行第 3 列
    pub site: String,          // 首个 S 行的仓库列
}

// ==========================================
// MaskStats - 掩码统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskStats {
    pub total_lines: usize,    // 库存行数
    pub total_products: usize, // 不同物料数
    pub total_lots: usize,     // 不同批次数
}

// ==========================================
// ParsedMask - 解析后的掩码
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedMask {
    pub rows: Vec<TheoreticalRow>,
    pub column_count: usize, // 所有行中的最大列数
}

impl ParsedMask {
    pub fn stock_rows(&self) -> impl Iterator<Item = &TheoreticalRow> {
        self.rows.iter().filter(|r| r.is_stock())
    }
}
