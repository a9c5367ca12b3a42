// ==========================================
// 库存盘点对账系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 错误消息面向法语用户（与上游 Sage X3 使用方一致）
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("Fichier introuvable : {0}")]
    FileNotFound(String),

    #[error("Extension '{extension}' invalide. Extensions autorisées : {}", .allowed.join(", "))]
    UnsupportedFormat {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Fichier trop volumineux ({}MB). Taille maximale : {}MB", .size / (1024 * 1024), .max_size / (1024 * 1024))]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Lecture du fichier impossible : {0}")]
    FileReadError(String),

    #[error("Erreur de lecture du fichier Excel : {0}")]
    ExcelParseError(String),

    #[error("Fichier CSV invalide : {0}")]
    CsvParseError(String),

    #[error("Écriture du fichier Excel impossible : {0}")]
    ExcelWriteError(String),

    // ===== 结构校验错误 =====
    #[error("Format invalide : {columns} colonnes détectées, {min} minimum requises.")]
    InvalidMaskStructure { columns: usize, min: usize },

    #[error("Aucune ligne de stock ('S') trouvée dans le fichier.")]
    NoStockLines,

    #[error("Colonnes manquantes : {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    // ===== 配置错误 =====
    #[error("Lecture de la configuration impossible (clé : {key}) : {message}")]
    ConfigReadError { key: String, message: String },

    #[error("Valeur de configuration invalide (clé : {key}, valeur : {value}) : {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error("Erreur interne : {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<rust_xlsxwriter::XlsxError>
impl From<rust_xlsxwriter::XlsxError> for ImportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ImportError::ExcelWriteError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
