// ==========================================
// 库存盘点对账系统 - 字段映射器实现
// ==========================================
// 职责: 掩码位置字段 / 模板具名列 → 领域记录 + 类型转换
// ==========================================

use crate::domain::mask::{MaskLayout, TheoreticalRow};
use crate::domain::reconcile::{template_columns, RealEntry};
use crate::domain::types::{Indicator, LineKind, LotStatus};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::importer_trait::{
    DataCleaner as DataCleanerTrait, FieldMapper as FieldMapperTrait,
};
use std::collections::HashMap;

pub struct FieldMapper {
    layout: MaskLayout,
    cleaner: DataCleaner,
}

impl FieldMapper {
    pub fn new(layout: MaskLayout) -> Self {
        Self {
            layout,
            cleaner: DataCleaner::new(),
        }
    }

    /// 按位置读取并裁剪（越界返回空串）
    fn positional(&self, fields: &[String], index: usize) -> String {
        fields
            .get(index)
            .map(|v| self.cleaner.clean_text(v))
            .unwrap_or_default()
    }

    /// 按列名读取（列名大小写、首尾空白不敏感）
    fn get_string(&self, row: &HashMap<String, String>, column: &str) -> String {
        row.get(column)
            .or_else(|| {
                row.iter()
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case(column))
                    .map(|(_, v)| v)
            })
            .map(|v| self.cleaner.clean_text(v))
            .unwrap_or_default()
    }
}

impl FieldMapperTrait for FieldMapper {
    fn map_mask_row(&self, fields: Vec<String>, line_number: usize) -> TheoreticalRow {
        let layout = &self.layout;
        let original_qty = self
            .cleaner
            .parse_decimal(&self.positional(&fields, layout.theoretical_qty));
        let adjusted_text = self.positional(&fields, layout.adjusted_qty);

        TheoreticalRow {
            line_number,
            line_kind: LineKind::from_code(&self.positional(&fields, layout.line_kind)),
            session_num: self.positional(&fields, layout.session_num),
            inventory_num: self.positional(&fields, layout.inventory_num),
            depot: self.positional(&fields, layout.depot),
            original_qty,
            theoretical_qty: original_qty.unwrap_or_default(),
            adjusted_qty: self.cleaner.parse_decimal(&adjusted_text),
            indicator: Indicator::from_code(&self.positional(&fields, layout.indicator)),
            article_code: self.positional(&fields, layout.article_code),
            location: self.positional(&fields, layout.location),
            status: LotStatus::from_code(&self.positional(&fields, layout.status)),
            unit: self.positional(&fields, layout.unit),
            lot_number: self.positional(&fields, layout.lot_number),
            raw_fields: fields,
        }
    }

    fn map_real_entry(&self, row: &HashMap<String, String>, row_number: usize) -> RealEntry {
        let unit = self
            .cleaner
            .normalize_null(Some(self.get_string(row, template_columns::UNIT)));

        RealEntry {
            row_number,
            inventory_num: self.get_string(row, template_columns::INVENTORY_NUM),
            article_code: self.get_string(row, template_columns::ARTICLE_CODE),
            depot: self.get_string(row, template_columns::DEPOT),
            location: self.get_string(row, template_columns::LOCATION),
            unit,
            real_qty: self
                .cleaner
                .parse_quantity(&self.get_string(row, template_columns::REAL_QTY)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn stock_fields() -> Vec<String> {
        let mut fields = vec![String::new(); 15];
        fields[0] = "S".to_string();
        fields[1] = "SESS01".to_string();
        fields[2] = "INV01".to_string();
        fields[4] = " SITE1 ".to_string();
        fields[5] = "12,5".to_string();
        fields[6] = "12,5".to_string();
        fields[7] = "1".to_string();
        fields[8] = "ART1".to_string();
        fields[9] = "LOC1".to_string();
        fields[10] = "A".to_string();
        fields[11] = "UN".to_string();
        fields[14] = "LOT010124".to_string();
        fields
    }

    #[test]
    fn test_map_mask_row_stock_line() {
        let mapper = FieldMapper::new(MaskLayout::default());
        let row = mapper.map_mask_row(stock_fields(), 3);

        assert!(row.is_stock());
        assert_eq!(row.line_number, 3);
        assert_eq!(row.depot, "SITE1");
        assert_eq!(row.original_qty, Some(dec!(12.5)));
        assert_eq!(row.theoretical_qty, dec!(12.5));
        assert_eq!(row.indicator, Some(Indicator::Normal));
        assert_eq!(row.status, Some(LotStatus::Accepted));
        assert_eq!(row.lot_number, "LOT010124");
        // 原始字段保持不变
        assert_eq!(row.raw_fields[4], " SITE1 ");
    }

    #[test]
    fn test_map_mask_row_short_line() {
        let mapper = FieldMapper::new(MaskLayout::default());
        let row = mapper.map_mask_row(vec!["E".to_string(), "SESS01".to_string()], 1);

        assert_eq!(row.line_kind, LineKind::SessionHeader);
        assert_eq!(row.session_num, "SESS01");
        assert_eq!(row.original_qty, None);
        assert_eq!(row.theoretical_qty, dec!(0));
        assert_eq!(row.lot_number, "");
    }

    #[test]
    fn test_map_mask_row_unparseable_quantity_is_zero() {
        let mapper = FieldMapper::new(MaskLayout::default());
        let mut fields = stock_fields();
        fields[5] = "abc".to_string();
        let row = mapper.map_mask_row(fields, 1);

        assert_eq!(row.original_qty, None);
        assert_eq!(row.theoretical_qty, dec!(0));
    }

    #[test]
    fn test_map_real_entry() {
        let mapper = FieldMapper::new(MaskLayout::default());
        let mut row = HashMap::new();
        row.insert("NUMERO_INVENTAIRE".to_string(), "INV01".to_string());
        row.insert("CODE_ARTICLE".to_string(), "ART1".to_string());
        row.insert("DEPOT".to_string(), "SITE1".to_string());
        row.insert("emplacement".to_string(), " LOC1 ".to_string());
        row.insert("QUANTITE_REELLE".to_string(), "7,5".to_string());
        row.insert("UNITE".to_string(), "".to_string());

        let entry = mapper.map_real_entry(&row, 4);
        assert_eq!(entry.row_number, 4);
        assert_eq!(entry.location, "LOC1");
        assert_eq!(entry.real_qty, dec!(7.5));
        assert_eq!(entry.unit, None);
    }

    #[test]
    fn test_map_real_entry_blank_quantity_is_zero() {
        let mapper = FieldMapper::new(MaskLayout::default());
        let row = HashMap::new();
        let entry = mapper.map_real_entry(&row, 1);
        assert_eq!(entry.real_qty, dec!(0));
        assert_eq!(entry.inventory_num, "");
    }
}
