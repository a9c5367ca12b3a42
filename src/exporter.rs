// ==========================================
// 库存盘点对账系统 - 文件导出器
// ==========================================
// 职责: 实盘模板（xlsx / CSV，带表头）/ 最终掩码 CSV（无表头）写出
// 红线: 最终文件行顺序与字段数保持掩码原样（仅库存行可能补齐列）
// 红线: 最终文件始终使用掩码分隔符，模板分隔符只作用于 CSV 模板
// ==========================================

use crate::config::ReconcileConfigReader;
use crate::domain::mask::MaskMetadata;
use crate::domain::reconcile::{template_columns, AggregatedRow, OutputRow};
use crate::domain::types::TemplateFormat;
use crate::importer::error::{ImportError, ImportResult};
use csv::WriterBuilder;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};
use tracing::info;

/// xlsx 模板工作表名
pub const TEMPLATE_SHEET_NAME: &str = "Saisie Inventaire";

/// xlsx 模板列宽
const TEMPLATE_COLUMN_WIDTH: f64 = 15.0;

/// 模板文件名: <盘点号>_<站点>_TEMPLATE.<xlsx|csv>
pub fn template_file_name(metadata: &MaskMetadata, format: TemplateFormat) -> String {
    format!(
        "{}_{}_TEMPLATE.{}",
        sanitize_file_component(&metadata.inventory_num),
        sanitize_file_component(&metadata.site),
        format.extension()
    )
}

/// 最终文件名: <盘点号>_<站点>_FINAL.csv
pub fn final_file_name(metadata: &MaskMetadata) -> String {
    format!(
        "{}_{}_FINAL.csv",
        sanitize_file_component(&metadata.inventory_num),
        sanitize_file_component(&metadata.site)
    )
}

/// 文件名片段中的路径分隔符等替换为 `_`
fn sanitize_file_component(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// 模板数量保留原始精度
fn template_quantity(value: Decimal) -> String {
    if value.is_zero() {
        "0".to_string()
    } else {
        value.normalize().to_string()
    }
}

// ==========================================
// CsvExporter - CSV 写出
// ==========================================
pub struct CsvExporter {
    delimiter: u8,
}

impl CsvExporter {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// 实盘模板内容
    pub fn template_bytes(&self, rows: &[AggregatedRow]) -> ImportResult<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        writer.write_record(template_columns::HEADERS)?;
        for row in rows {
            writer.write_record([
                row.session_num.as_str(),
                row.inventory_num.as_str(),
                row.article_code.as_str(),
                template_quantity(row.theoretical_qty).as_str(),
                template_quantity(row.real_qty).as_str(),
                row.depot.as_str(),
                row.location.as_str(),
                row.unit.as_str(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| ImportError::InternalError(e.to_string()))
    }

    /// 最终掩码内容（每行字段数可不同）
    pub fn final_bytes(&self, rows: &[OutputRow]) -> ImportResult<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_writer(Vec::new());

        for row in rows {
            writer.write_record(&row.fields)?;
        }

        writer
            .into_inner()
            .map_err(|e| ImportError::InternalError(e.to_string()))
    }
}

// ==========================================
// XlsxExporter - Excel 模板写出
// ==========================================
// 单工作表 "Saisie Inventaire"，数量列写为数值单元格
pub struct XlsxExporter;

impl XlsxExporter {
    fn write_quantity(
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        value: Decimal,
    ) -> Result<(), XlsxError> {
        match value.to_f64() {
            Some(number) => worksheet.write_number(row, col, number)?,
            None => worksheet.write_string(row, col, template_quantity(value))?,
        };
        Ok(())
    }

    /// 实盘模板内容
    pub fn template_bytes(&self, rows: &[AggregatedRow]) -> ImportResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(TEMPLATE_SHEET_NAME)?;

        for (col, header) in (0u16..).zip(template_columns::HEADERS) {
            worksheet.write_string(0, col, header)?;
            worksheet.set_column_width(col, TEMPLATE_COLUMN_WIDTH)?;
        }

        for (row_num, row) in (1u32..).zip(rows) {
            worksheet.write_string(row_num, 0, &row.session_num)?;
            worksheet.write_string(row_num, 1, &row.inventory_num)?;
            worksheet.write_string(row_num, 2, &row.article_code)?;
            Self::write_quantity(worksheet, row_num, 3, row.theoretical_qty)?;
            Self::write_quantity(worksheet, row_num, 4, row.real_qty)?;
            worksheet.write_string(row_num, 5, &row.depot)?;
            worksheet.write_string(row_num, 6, &row.location)?;
            worksheet.write_string(row_num, 7, &row.unit)?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}

// ==========================================
// FileExporter - 按配置选择写出方式
// ==========================================
pub struct FileExporter {
    mask_csv: CsvExporter,
    template_csv: CsvExporter,
    template_format: TemplateFormat,
}

impl FileExporter {
    pub fn new(mask_delimiter: u8, template_delimiter: u8, template_format: TemplateFormat) -> Self {
        Self {
            mask_csv: CsvExporter::new(mask_delimiter),
            template_csv: CsvExporter::new(template_delimiter),
            template_format,
        }
    }

    pub fn from_config<C: ReconcileConfigReader>(config: &C) -> Self {
        Self::new(
            config.get_mask_delimiter(),
            config.get_template_delimiter(),
            config.get_template_format(),
        )
    }

    /// 实盘模板内容（按配置格式）
    pub fn template_bytes(&self, rows: &[AggregatedRow]) -> ImportResult<Vec<u8>> {
        match self.template_format {
            TemplateFormat::Xlsx => XlsxExporter.template_bytes(rows),
            TemplateFormat::Csv => self.template_csv.template_bytes(rows),
        }
    }

    /// 写出实盘模板
    pub fn write_template(
        &self,
        out_dir: &Path,
        metadata: &MaskMetadata,
        rows: &[AggregatedRow],
    ) -> ImportResult<PathBuf> {
        let path = out_dir.join(template_file_name(metadata, self.template_format));
        let content = self.template_bytes(rows)?;
        std::fs::create_dir_all(out_dir)?;
        std::fs::write(&path, content)?;
        info!(
            path = %path.display(),
            rows = rows.len(),
            format = %self.template_format,
            "实盘模板已写出"
        );
        Ok(path)
    }

    /// 写出最终掩码（掩码分隔符）
    pub fn write_final(
        &self,
        out_dir: &Path,
        metadata: &MaskMetadata,
        rows: &[OutputRow],
    ) -> ImportResult<PathBuf> {
        let path = out_dir.join(final_file_name(metadata));
        let content = self.mask_csv.final_bytes(rows)?;
        std::fs::create_dir_all(out_dir)?;
        std::fs::write(&path, content)?;
        info!(path = %path.display(), rows = rows.len(), "最终文件已写出");
        Ok(path)
    }
}
