// ==========================================
// 库存盘点对账系统 - 文件解析器实现
// ==========================================
// 支持: 掩码 (.csv, 无表头, `;` 分隔) / 实盘模板 (.csv / .xlsx / .xls, 带表头)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, RawSheet};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;

/// 文本解码: 优先 UTF-8（去 BOM），否则按 Latin-1 逐字节解码
pub fn decode_text(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

// ==========================================
// Mask Parser 实现
// ==========================================
// 掩码无表头、列数不固定，字段原样保留（不裁剪）
pub struct MaskParser {
    delimiter: u8,
}

impl MaskParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// 解析掩码内容
    ///
    /// # 返回
    /// - Ok(Vec<(行号, 字段)>): 行号为 1 起的文件行号，空行已跳过
    pub fn parse_bytes(&self, content: &[u8]) -> ImportResult<Vec<(usize, Vec<String>)>> {
        let text = decode_text(content);
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .delimiter(self.delimiter)
            .from_reader(text.as_bytes());

        let mut lines = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(lines.len() + 1);
            let fields: Vec<String> = record.iter().map(str::to_string).collect();

            // 跳过完全空白的行
            if fields.iter().all(|f| f.trim().is_empty()) {
                continue;
            }

            lines.push((line_number, fields));
        }

        Ok(lines)
    }

    pub fn parse_file(&self, file_path: &Path) -> ImportResult<Vec<(usize, Vec<String>)>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }
        let content = std::fs::read(file_path)?;
        self.parse_bytes(&content)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser {
    delimiter: u8,
}

impl CsvParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// 表头行不含首选分隔符时回退到 `,` 或 `;`
    fn detect_delimiter(&self, text: &str) -> u8 {
        let header_line = text.lines().next().unwrap_or("");
        [self.delimiter, b',', b';']
            .into_iter()
            .find(|d| header_line.contains(*d as char))
            .unwrap_or(self.delimiter)
    }

    pub fn parse_bytes(&self, content: &[u8]) -> ImportResult<RawSheet> {
        let text = decode_text(content);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.detect_delimiter(&text))
            .from_reader(text.as_bytes());

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // 读取所有行
        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row_map = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(row_map);
        }

        Ok(RawSheet { headers, records })
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<RawSheet> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }
        let content = std::fs::read(file_path)?;
        self.parse_bytes(&content)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<RawSheet> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        // 按扩展名自动识别 xlsx / xls
        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names.first().cloned().ok_or_else(|| {
            ImportError::ExcelParseError("le classeur ne contient aucune feuille".to_string())
        })?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = match rows.next() {
            Some(row) => row,
            None => return Ok(RawSheet::default()),
        };

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        // 读取数据行
        let mut records = Vec::new();
        for data_row in rows {
            let mut row_map = HashMap::new();

            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), cell.to_string().trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(row_map);
        }

        Ok(RawSheet { headers, records })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser {
    csv_delimiter: u8,
}

impl UniversalFileParser {
    pub fn new(csv_delimiter: u8) -> Self {
        Self { csv_delimiter }
    }

    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawSheet> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser::new(self.csv_delimiter).parse_to_raw_records(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_records(path),
            _ => Err(ImportError::UnsupportedFormat {
                extension: ext,
                allowed: vec![".csv".to_string(), ".xlsx".to_string(), ".xls".to_string()],
            }),
        }
    }
}
