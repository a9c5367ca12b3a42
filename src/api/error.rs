// ==========================================
// 库存盘点对账系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换导入层/引擎层错误为用户友好的错误消息
// ==========================================

use crate::engine::error::ReconcileError;
use crate::engine::rule_validator::RuleViolation;
use crate::importer::error::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("{message}")]
    BusinessRuleViolation {
        violations: Vec<RuleViolation>,
        message: String, // 多条违规以 " | " 连接
    },

    #[error("Paramètre invalide : {0}")]
    InvalidInput(String),

    #[error("Ressource introuvable : {0}")]
    NotFound(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("{0}")]
    ValidationError(String),

    #[error("Import impossible : {0}")]
    ImportError(String),

    #[error("Configuration invalide : {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("Erreur interne : {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::NotFound(path),

            // 结构/准入错误: 消息原样透传
            e @ (ImportError::UnsupportedFormat { .. }
            | ImportError::FileTooLarge { .. }
            | ImportError::InvalidMaskStructure { .. }
            | ImportError::NoStockLines
            | ImportError::MissingColumns(_)) => ApiError::ValidationError(e.to_string()),

            // 文件读取/解析错误
            e @ (ImportError::FileReadError(_)
            | ImportError::ExcelParseError(_)
            | ImportError::CsvParseError(_)) => ApiError::ImportError(e.to_string()),

            // 文件写出错误
            e @ ImportError::ExcelWriteError(_) => ApiError::InternalError(e.to_string()),

            // 配置错误
            e @ (ImportError::ConfigReadError { .. } | ImportError::ConfigValueError { .. }) => {
                ApiError::ConfigError(e.to_string())
            }

            // 通用错误
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            ImportError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ReconcileError 转换
// ==========================================
impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::BusinessRuleViolation {
                violations,
                messages,
            } => ApiError::BusinessRuleViolation {
                violations,
                message: messages.join(" | "),
            },
            e @ ReconcileError::InvalidDepotType(_) => ApiError::InvalidInput(e.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
