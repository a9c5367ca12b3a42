// ==========================================
// 库存盘点对账系统 - 数据质量校验器实现
// ==========================================
// 职责: 文件准入（扩展名/大小）+ 掩码结构校验 + 模板必需列校验
// 红线: 结构不合格直接拒绝，不做部分处理
// ==========================================

use crate::domain::mask::TheoreticalRow;
use crate::domain::reconcile::template_columns;
use crate::importer::error::{ImportError, ImportResult};
use std::path::Path;
use tracing::debug;

/// 掩码允许的扩展名
pub const MASK_EXTENSIONS: [&str; 1] = ["csv"];
/// 回填模板允许的扩展名
pub const TEMPLATE_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

pub struct DqValidator {
    min_mask_columns: usize,
    max_file_size: u64, // 字节
}

impl DqValidator {
    pub fn new(min_mask_columns: usize, max_file_size: u64) -> Self {
        Self {
            min_mask_columns,
            max_file_size,
        }
    }

    /// 文件准入校验
    ///
    /// # 返回
    /// - Ok(u64): 文件大小（字节）
    pub fn validate_file(&self, path: &Path, allowed_extensions: &[&str]) -> ImportResult<u64> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !allowed_extensions.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat {
                extension: format!(".{}", ext),
                allowed: allowed_extensions.iter().map(|e| format!(".{}", e)).collect(),
            });
        }

        let size = std::fs::metadata(path)?.len();
        if size > self.max_file_size {
            return Err(ImportError::FileTooLarge {
                size,
                max_size: self.max_file_size,
            });
        }

        debug!(path = %path.display(), size, "文件准入校验通过");
        Ok(size)
    }

    /// 掩码结构校验: 最大列数下限 + 至少一行库存行
    pub fn validate_mask_structure(
        &self,
        column_count: usize,
        rows: &[TheoreticalRow],
    ) -> ImportResult<()> {
        if column_count < self.min_mask_columns {
            return Err(ImportError::InvalidMaskStructure {
                columns: column_count,
                min: self.min_mask_columns,
            });
        }

        if !rows.iter().any(|r| r.is_stock()) {
            return Err(ImportError::NoStockLines);
        }

        Ok(())
    }

    /// 回填模板必需列校验（列名大小写不敏感）
    pub fn validate_template_headers(&self, headers: &[String]) -> ImportResult<()> {
        let missing: Vec<String> = template_columns::REQUIRED
            .iter()
            .filter(|required| {
                !headers
                    .iter()
                    .any(|h| h.trim().eq_ignore_ascii_case(required))
            })
            .map(|c| c.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::MissingColumns(missing))
        }
    }
}
