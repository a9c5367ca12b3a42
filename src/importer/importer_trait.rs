// ==========================================
// 库存盘点对账系统 - 导入层 Trait
// ==========================================
// 职责: 定义文件解析、字段映射、数据清洗、结构校验接口（不包含实现）
// ==========================================

use crate::domain::mask::TheoreticalRow;
use crate::domain::reconcile::RealEntry;
use crate::importer::error::ImportResult;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// RawSheet - 带表头的原始表格
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub records: Vec<HashMap<String, String>>,
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 带表头文件解析（实盘模板）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录（HashMap<列名, 值>）
    ///
    /// # 返回
    /// - Ok(RawSheet): 表头 + 行记录（已跳过全空行）
    /// - Err: 文件读取错误、格式错误
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<RawSheet>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 原始字段 → 具名记录
pub trait FieldMapper: Send + Sync {
    /// 将掩码原始字段映射为 TheoreticalRow
    ///
    /// # 参数
    /// - fields: 原始字段（保持原样，不裁剪）
    /// - line_number: 文件行号（1 起）
    fn map_mask_row(&self, fields: Vec<String>, line_number: usize) -> TheoreticalRow;

    /// 将模板行映射为 RealEntry
    ///
    /// # 参数
    /// - row: 模板行（HashMap<列名, 值>）
    /// - row_number: 数据行号（1 起）
    fn map_real_entry(&self, row: &HashMap<String, String>, row_number: usize) -> RealEntry;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 文本与数值清洗（宽松策略，从不报错）
pub trait DataCleaner: Send + Sync {
    /// 清洗文本字段（TRIM）
    fn clean_text(&self, value: &str) -> String;

    /// 标准化 NULL 值（空字符串/空白 → None）
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    /// 严格解析数值（`,` 视为小数点）
    ///
    /// # 返回
    /// - Some(Decimal): 解析成功
    /// - None: 空值或无法解析
    fn parse_decimal(&self, value: &str) -> Option<Decimal>;

    /// 宽松解析数量: 严格解析失败时提取文本中的第一个数字，仍失败则为 0
    fn parse_quantity(&self, value: &str) -> Decimal;
}
