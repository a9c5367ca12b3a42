// ==========================================
// 库存盘点对账系统 - 领域类型定义
// ==========================================
// 依据: Sage X3 盘点掩码文件格式（分号分隔，首列为行类型）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 行类型 (Line Kind)
// ==========================================
// 只有库存行 (S) 参与差异分配，其余行原样回写
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    Stock,           // S: 库存行
    SessionHeader,   // E: 会话表头
    InventoryHeader, // L: 盘点表头
    Other(String),   // 其他未识别的行类型
}

impl LineKind {
    /// 从掩码首列解析行类型
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "S" => LineKind::Stock,
            "E" => LineKind::SessionHeader,
            "L" => LineKind::InventoryHeader,
            other => LineKind::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            LineKind::Stock => "S",
            LineKind::SessionHeader => "E",
            LineKind::InventoryHeader => "L",
            LineKind::Other(code) => code.as_str(),
        }
    }

    pub fn is_stock(&self) -> bool {
        matches!(self, LineKind::Stock)
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 批次状态 (Lot Status)
// ==========================================
// A/AM 为合格批次，R/RM 为不合格批次，Q 为待检（隔离）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LotStatus {
    Accepted,         // A
    AcceptedModified, // AM
    Rejected,         // R
    RejectedModified, // RM
    Quarantine,       // Q
}

impl LotStatus {
    /// 解析状态码（未识别的状态码返回 None，不参与规则校验）
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "A" => Some(LotStatus::Accepted),
            "AM" => Some(LotStatus::AcceptedModified),
            "R" => Some(LotStatus::Rejected),
            "RM" => Some(LotStatus::RejectedModified),
            "Q" => Some(LotStatus::Quarantine),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LotStatus::Accepted => "A",
            LotStatus::AcceptedModified => "AM",
            LotStatus::Rejected => "R",
            LotStatus::RejectedModified => "RM",
            LotStatus::Quarantine => "Q",
        }
    }
}

impl fmt::Display for LotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 指示器 (Indicator)
// ==========================================
// 1 = 正常；2 = 异常（LOECART 新发现库存 / 批次被扣减至 0）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Indicator {
    Normal,
    Exception,
}

impl Indicator {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(Indicator::Normal),
            "2" => Some(Indicator::Exception),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Indicator::Normal => "1",
            Indicator::Exception => "2",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 仓库类型 (Depot Type)
// ==========================================
// 合格库只允许 A/AM，不合格库只允许 R/RM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepotType {
    #[serde(rename = "Conforme")]
    Conforme,
    #[serde(rename = "Non-Conforme")]
    NonConforme,
}

impl DepotType {
    /// 解析用户输入的仓库类型（兼容常见写法）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Conforme" | "conforme" => Some(DepotType::Conforme),
            "Non-Conforme" | "NonConforme" | "non-conforme" | "Non Conforme" => {
                Some(DepotType::NonConforme)
            }
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DepotType::Conforme => "Conforme",
            DepotType::NonConforme => "Non-Conforme",
        }
    }

    /// 该仓库类型下禁止出现的状态
    pub fn forbidden_statuses(&self) -> [LotStatus; 2] {
        match self {
            DepotType::Conforme => [LotStatus::Rejected, LotStatus::RejectedModified],
            DepotType::NonConforme => [LotStatus::Accepted, LotStatus::AcceptedModified],
        }
    }
}

impl fmt::Display for DepotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// TemplateFormat - 实盘模板格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    #[default]
    Xlsx,
    Csv,
}

impl TemplateFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "xlsx" => Some(TemplateFormat::Xlsx),
            "csv" => Some(TemplateFormat::Csv),
            _ => None,
        }
    }

    /// 文件扩展名（不含点）
    pub fn extension(&self) -> &'static str {
        match self {
            TemplateFormat::Xlsx => "xlsx",
            TemplateFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_kind_from_code() {
        assert_eq!(LineKind::from_code("S"), LineKind::Stock);
        assert_eq!(LineKind::from_code(" E "), LineKind::SessionHeader);
        assert_eq!(LineKind::from_code("L"), LineKind::InventoryHeader);
        assert_eq!(LineKind::from_code("X"), LineKind::Other("X".to_string()));
        assert!(LineKind::Stock.is_stock());
    }

    #[test]
    fn test_lot_status_round_trip_codes() {
        for code in ["A", "AM", "R", "RM", "Q"] {
            let status = LotStatus::from_code(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert_eq!(LotStatus::from_code("Z"), None);
    }

    #[test]
    fn test_depot_type_parse_variants() {
        assert_eq!(DepotType::parse("conforme"), Some(DepotType::Conforme));
        assert_eq!(DepotType::parse("Non Conforme"), Some(DepotType::NonConforme));
        assert_eq!(DepotType::parse("NonConforme"), Some(DepotType::NonConforme));
        assert_eq!(DepotType::parse("CONFORME"), None);
        assert_eq!(DepotType::NonConforme.to_string(), "Non-Conforme");
    }

    #[test]
    fn test_template_format_parse() {
        assert_eq!(TemplateFormat::parse("XLSX"), Some(TemplateFormat::Xlsx));
        assert_eq!(TemplateFormat::parse(".csv"), Some(TemplateFormat::Csv));
        assert_eq!(TemplateFormat::parse("xls"), None);
        assert_eq!(TemplateFormat::default().extension(), "xlsx");
    }
}
