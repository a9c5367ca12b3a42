// ==========================================
// 库存盘点对账系统 - 批次日期解析器
// ==========================================
// 职责: 批次号 → 可排序的时间键
// 红线: 无状态、无副作用；日期非法的批次在任何排序方向下都排在最后
// ==========================================
// 支持两种批次号格式（按顺序尝试，先匹配先生效）:
// 1. 3~5 位大写字母（站点代码）+ DDMMYY + 可选流水号，如 ABCD150124003
// 2. LOT + DDMMYY，如 LOT010124
// ==========================================

use chrono::NaiveDate;
use regex::Regex;
use std::cmp::Ordering;

const SITE_DATE_PATTERN: &str = r"^[A-Z]{3,5}([0-9]{6})[0-9]*";
const LOT_DATE_PATTERN: &str = r"^LOT([0-9]{6})";
const LOT_DATE_FORMAT: &str = "%d%m%y";

// ==========================================
// ChronoKey - 批次时间键
// ==========================================
// 派生的 Ord（升序）: 日期先后 < 无日期（视为最大日期）< 日期非法
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChronoKey {
    Dated(NaiveDate),
    /// 空批次号或不符合任何格式
    Undated,
    /// 格式匹配但日期非法（如 32 日、13 月）
    InvalidDate,
}

impl ChronoKey {
    /// 最老优先（升序）: 无日期排在所有日期之后，日期非法排最后
    pub fn cmp_oldest_first(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// 最新优先（降序）: 无日期排最前，日期非法仍排最后
    pub fn cmp_youngest_first(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ChronoKey::InvalidDate, ChronoKey::InvalidDate) => Ordering::Equal,
            (ChronoKey::InvalidDate, _) => Ordering::Greater,
            (_, ChronoKey::InvalidDate) => Ordering::Less,
            (a, b) => b.cmp(a),
        }
    }
}

// ==========================================
// LotDateResolver - 批次日期解析器
// ==========================================
// 预编译正则，解析结果只取决于输入
#[derive(Debug, Clone)]
pub struct LotDateResolver {
    site_date: Regex,
    lot_date: Regex,
}

impl LotDateResolver {
    pub fn new() -> Self {
        // 常量模式，编译失败属于程序缺陷
        Self {
            site_date: Regex::new(SITE_DATE_PATTERN).expect("invalid site-date lot pattern"),
            lot_date: Regex::new(LOT_DATE_PATTERN).expect("invalid LOT-date lot pattern"),
        }
    }

    /// 解析批次号
    ///
    /// # 返回
    /// - ChronoKey::Dated: 匹配任一格式且日期合法
    /// - ChronoKey::Undated: 空值或无匹配格式
    /// - ChronoKey::InvalidDate: 匹配格式但日期非法
    pub fn resolve(&self, lot_number: &str) -> ChronoKey {
        if lot_number.is_empty() {
            return ChronoKey::Undated;
        }

        // 先匹配先生效：格式 1 匹配但日期非法时不再尝试格式 2
        let digits = match self.site_date.captures(lot_number) {
            Some(caps) => caps.get(1),
            None => self
                .lot_date
                .captures(lot_number)
                .and_then(|caps| caps.get(1)),
        };

        match digits {
            None => ChronoKey::Undated,
            Some(m) => NaiveDate::parse_from_str(m.as_str(), LOT_DATE_FORMAT)
                .map(ChronoKey::Dated)
                .unwrap_or(ChronoKey::InvalidDate),
        }
    }
}

impl Default for LotDateResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> ChronoKey {
        ChronoKey::Dated(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_resolve_lot_prefix() {
        let resolver = LotDateResolver::new();
        assert_eq!(resolver.resolve("LOT010124"), ymd(2024, 1, 1));
        assert_eq!(resolver.resolve("LOT150124"), ymd(2024, 1, 15));
    }

    #[test]
    fn test_resolve_site_prefix_with_sequence() {
        let resolver = LotDateResolver::new();
        assert_eq!(resolver.resolve("ABC311223"), ymd(2023, 12, 31));
        assert_eq!(resolver.resolve("SITEA050324017"), ymd(2024, 3, 5));
    }

    #[test]
    fn test_two_digit_year_pivot() {
        let resolver = LotDateResolver::new();
        assert_eq!(resolver.resolve("LOT010199"), ymd(1999, 1, 1));
        assert_eq!(resolver.resolve("LOT010168"), ymd(2068, 1, 1));
    }

    #[test]
    fn test_undated_inputs() {
        let resolver = LotDateResolver::new();
        assert_eq!(resolver.resolve(""), ChronoKey::Undated);
        assert_eq!(resolver.resolve("LOECART"), ChronoKey::Undated);
        assert_eq!(resolver.resolve("lot010124"), ChronoKey::Undated);
        assert_eq!(resolver.resolve("AB010124"), ChronoKey::Undated);
        assert_eq!(resolver.resolve("ABCDEF010124"), ChronoKey::Undated);
        assert_eq!(resolver.resolve("12345"), ChronoKey::Undated);
    }

    #[test]
    fn test_invalid_dates() {
        let resolver = LotDateResolver::new();
        assert_eq!(resolver.resolve("LOT320124"), ChronoKey::InvalidDate);
        assert_eq!(resolver.resolve("ABC011324"), ChronoKey::InvalidDate);
    }

    #[test]
    fn test_oldest_first_ordering() {
        let mut keys = vec![
            ChronoKey::InvalidDate,
            ChronoKey::Undated,
            ymd(2024, 1, 15),
            ymd(2024, 1, 1),
        ];

        keys.sort_by(|a, b| a.cmp_oldest_first(b));
        assert_eq!(
            keys,
            vec![
                ymd(2024, 1, 1),
                ymd(2024, 1, 15),
                ChronoKey::Undated,
                ChronoKey::InvalidDate
            ]
        );
    }

    #[test]
    fn test_youngest_first_puts_undated_first_and_invalid_last() {
        let mut keys = vec![
            ChronoKey::InvalidDate,
            ymd(2024, 1, 1),
            ChronoKey::Undated,
            ymd(2024, 1, 15),
        ];

        keys.sort_by(|a, b| a.cmp_youngest_first(b));
        assert_eq!(
            keys,
            vec![
                ChronoKey::Undated,
                ymd(2024, 1, 15),
                ymd(2024, 1, 1),
                ChronoKey::InvalidDate
            ]
        );
    }

    #[test]
    fn test_resolver_is_deterministic() {
        let resolver = LotDateResolver::default();
        let first = resolver.resolve("DEPOT120224");
        for _ in 0..3 {
            assert_eq!(resolver.resolve("DEPOT120224"), first);
        }
        assert_eq!(first, ymd(2024, 2, 12));
    }
}
