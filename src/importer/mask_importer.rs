// ==========================================
// 库存盘点对账系统 - 掩码 / 实盘模板导入器
// ==========================================
// 职责: 整合导入流程，从文件到领域记录
// 流程: 准入校验 → 解析 → 映射 → 结构校验 → 元信息 / 统计
// ==========================================

use crate::config::ReconcileConfigReader;
use crate::domain::mask::{MaskLayout, MaskMetadata, MaskStats, ParsedMask, TheoreticalRow};
use crate::domain::reconcile::RealEntry;
use crate::domain::types::LineKind;
use crate::importer::dq_validator::{DqValidator, MASK_EXTENSIONS, TEMPLATE_EXTENSIONS};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{MaskParser, UniversalFileParser};
use crate::importer::importer_trait::FieldMapper as _;
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument};

const UNKNOWN_SITE: &str = "UNKNOWN";

// ==========================================
// MaskImporter - 掩码导入器
// ==========================================
pub struct MaskImporter {
    mask_parser: MaskParser,
    template_parser: UniversalFileParser,
    field_mapper: FieldMapper,
    dq_validator: DqValidator,
}

impl MaskImporter {
    pub fn new(
        layout: MaskLayout,
        mask_delimiter: u8,
        template_delimiter: u8,
        min_mask_columns: usize,
        max_file_size: u64,
    ) -> Self {
        Self {
            mask_parser: MaskParser::new(mask_delimiter),
            template_parser: UniversalFileParser::new(template_delimiter),
            field_mapper: FieldMapper::new(layout),
            dq_validator: DqValidator::new(min_mask_columns, max_file_size),
        }
    }

    /// 从配置读取器构建
    pub fn from_config<C: ReconcileConfigReader>(config: &C) -> Self {
        Self::new(
            config.get_mask_layout(),
            config.get_mask_delimiter(),
            config.get_template_delimiter(),
            config.get_min_mask_columns(),
            config.get_max_file_size_bytes(),
        )
    }

    /// 导入掩码文件
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn load_mask<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ParsedMask> {
        let path = file_path.as_ref();
        let size = self.dq_validator.validate_file(path, &MASK_EXTENSIONS)?;
        info!(size, "开始导入掩码");

        let lines = self.mask_parser.parse_file(path)?;
        self.build_mask(lines)
    }

    /// 从内存内容导入掩码（不做文件准入校验）
    pub fn parse_mask(&self, content: &[u8]) -> ImportResult<ParsedMask> {
        let lines = self.mask_parser.parse_bytes(content)?;
        self.build_mask(lines)
    }

    fn build_mask(&self, lines: Vec<(usize, Vec<String>)>) -> ImportResult<ParsedMask> {
        let column_count = lines.iter().map(|(_, f)| f.len()).max().unwrap_or(0);

        let rows: Vec<_> = lines
            .into_iter()
            .map(|(line_number, fields)| self.field_mapper.map_mask_row(fields, line_number))
            .collect();

        self.dq_validator
            .validate_mask_structure(column_count, &rows)?;

        let mask = ParsedMask { rows, column_count };

        info!(
            total_rows = mask.rows.len(),
            stock_rows = mask.stock_rows().count(),
            column_count,
            "掩码解析完成"
        );

        Ok(mask)
    }

    /// 提取会话号 / 盘点号 / 站点，缺失时生成兜底值
    pub fn extract_metadata(&self, mask: &ParsedMask, now: NaiveDateTime) -> MaskMetadata {
        let stamp = now.format("%Y%m%d%H%M%S");

        let first_value = |kind: LineKind, pick: fn(&TheoreticalRow) -> &str| {
            mask.rows
                .iter()
                .find(|r| r.line_kind == kind)
                .map(|r| pick(r).to_string())
                .filter(|v| !v.is_empty())
        };

        let session_num = first_value(LineKind::SessionHeader, |r| r.session_num.as_str())
            .unwrap_or_else(|| format!("AUTO_SESS_{}", stamp));
        let inventory_num = first_value(LineKind::InventoryHeader, |r| r.inventory_num.as_str())
            .unwrap_or_else(|| format!("AUTO_INV_{}", stamp));
        let site = first_value(LineKind::Stock, |r| r.depot.as_str())
            .unwrap_or_else(|| UNKNOWN_SITE.to_string());

        debug!(%session_num, %inventory_num, %site, "掩码元信息");

        MaskMetadata {
            session_num,
            inventory_num,
            site,
        }
    }

    /// 库存行统计: 行数 / 不同物料数 / 不同批次数
    pub fn compute_stats(&self, mask: &ParsedMask) -> MaskStats {
        let mut products = HashSet::new();
        let mut lots = HashSet::new();
        let mut total_lines = 0;

        for row in mask.stock_rows() {
            total_lines += 1;
            if !row.article_code.is_empty() {
                products.insert(row.article_code.as_str());
            }
            if !row.lot_number.is_empty() {
                lots.insert(row.lot_number.as_str());
            }
        }

        MaskStats {
            total_lines,
            total_products: products.len(),
            total_lots: lots.len(),
        }
    }

    /// 导入回填后的实盘模板
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn load_real_entries<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RealEntry>> {
        let path = file_path.as_ref();
        self.dq_validator.validate_file(path, &TEMPLATE_EXTENSIONS)?;

        let sheet = self.template_parser.parse(path)?;
        self.dq_validator.validate_template_headers(&sheet.headers)?;

        let entries: Vec<RealEntry> = sheet
            .records
            .iter()
            .enumerate()
            .map(|(idx, row)| self.field_mapper.map_real_entry(row, idx + 1))
            .collect();

        info!(entries = entries.len(), "实盘模板解析完成");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::ImportError;
    use chrono::NaiveDate;

    fn importer() -> MaskImporter {
        MaskImporter::new(MaskLayout::default(), b';', b';', 15, 50 * 1024 * 1024)
    }

    fn stock_line(article: &str, lot: &str) -> String {
        format!("S;SESS01;INV01;;SITE1;10;10;1;{};LOC1;A;UN;;;{}", article, lot)
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_mask_and_metadata() {
        let content = format!(
            "E;SESS01;x\nL;SESS01;INV01\n{}\n{}\n{}\n",
            stock_line("ART1", "LOT010124"),
            stock_line("ART1", "LOT150124"),
            stock_line("ART2", "LOT010124"),
        );
        let importer = importer();
        let mask = importer.parse_mask(content.as_bytes()).unwrap();

        assert_eq!(mask.column_count, 15);
        assert_eq!(mask.rows.len(), 5);

        let metadata = importer.extract_metadata(&mask, now());
        assert_eq!(metadata.session_num, "SESS01");
        assert_eq!(metadata.inventory_num, "INV01");
        assert_eq!(metadata.site, "SITE1");

        let stats = importer.compute_stats(&mask);
        assert_eq!(stats.total_lines, 3);
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.total_lots, 2);
    }

    #[test]
    fn test_metadata_fallbacks() {
        let importer = importer();
        let mask = importer
            .parse_mask(format!("{}\n", stock_line("ART1", "")).as_bytes())
            .unwrap();

        let metadata = importer.extract_metadata(&mask, now());
        assert_eq!(metadata.session_num, "AUTO_SESS_20240305143000");
        assert_eq!(metadata.inventory_num, "AUTO_INV_20240305143000");
        assert_eq!(metadata.site, "SITE1");
    }

    #[test]
    fn test_parse_mask_rejects_narrow_file() {
        let result = importer().parse_mask(b"S;SESS01;INV01;;SITE1;10\n");
        assert!(matches!(
            result,
            Err(ImportError::InvalidMaskStructure { columns: 6, min: 15 })
        ));
    }

    #[test]
    fn test_parse_mask_rejects_missing_stock_lines() {
        let content = "E;SESS01;;;;;;;;;;;;;x\nL;SESS01;INV01\n";
        let result = importer().parse_mask(content.as_bytes());
        assert!(matches!(result, Err(ImportError::NoStockLines)));
    }
}
