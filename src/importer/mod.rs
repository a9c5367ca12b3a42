// ==========================================
// 库存盘点对账系统 - 导入层
// ==========================================
// 职责: 外部文件导入，生成领域记录
// 支持: 掩码 CSV；实盘模板 CSV / Excel
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod mask_importer;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use dq_validator::DqValidator as DqValidatorImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, MaskParser, UniversalFileParser};
pub use mask_importer::MaskImporter;

// 重导出 Trait 接口
pub use importer_trait::{DataCleaner, FieldMapper, FileParser, RawSheet};
