// ==========================================
// 库存盘点对账系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 数值宽松解析
// 红线: 清洗从不报错，无法解析或超出范围的数量一律视为 0
// ==========================================

use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

const EMBEDDED_NUMBER_PATTERN: &str = r"-?\d+\.?\d*";

/// 数量绝对值上限（10^15），保证后续累加不会溢出
const MAX_ABS_QUANTITY: i64 = 1_000_000_000_000_000;

fn within_bound(value: Decimal, raw: &str) -> Option<Decimal> {
    if value.abs() > Decimal::from(MAX_ABS_QUANTITY) {
        warn!(value = raw, "数量超出范围，视为无法解析");
        None
    } else {
        Some(value)
    }
}

pub struct DataCleaner {
    embedded_number: Regex,
}

impl DataCleaner {
    pub fn new() -> Self {
        Self {
            embedded_number: Regex::new(EMBEDDED_NUMBER_PATTERN)
                .expect("invalid embedded-number pattern"),
        }
    }

    /// 从文本中提取第一个数字（如 "12 kg" → 12）
    fn extract_embedded_number(&self, normalized: &str) -> Option<Decimal> {
        self.embedded_number
            .find(normalized)
            .and_then(|m| Decimal::from_str(m.as_str().trim_end_matches('.')).ok())
            .and_then(|d| within_bound(d, normalized))
    }
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str) -> String {
        value.trim().to_string()
    }

    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn parse_decimal(&self, value: &str) -> Option<Decimal> {
        let normalized = value.trim().replace(',', ".");
        if normalized.is_empty() {
            return None;
        }

        Decimal::from_str(&normalized)
            .or_else(|_| Decimal::from_scientific(&normalized))
            .ok()
            .and_then(|d| within_bound(d, value))
    }

    fn parse_quantity(&self, value: &str) -> Decimal {
        if let Some(parsed) = self.parse_decimal(value) {
            return parsed;
        }

        let normalized = value.trim().replace(',', ".");
        self.extract_embedded_number(&normalized)
            .unwrap_or(Decimal::ZERO)
    }
}
