// ==========================================
// 库存盘点对账系统 - 对账配置读取 Trait
// ==========================================
// 职责: 定义导入与引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑；读取失败一律回退默认值
// ==========================================

use crate::domain::mask::MaskLayout;
use crate::domain::types::TemplateFormat;

// ==========================================
// ReconcileConfigReader Trait
// ==========================================
// 实现者: ConfigManager
pub trait ReconcileConfigReader: Send + Sync {
    // ===== 文件格式 =====

    /// 掩码分隔符（默认 `;`）
    fn get_mask_delimiter(&self) -> u8;

    /// 实盘模板分隔符（默认 `;`，仅 CSV 模板使用）
    fn get_template_delimiter(&self) -> u8;

    /// 实盘模板格式（默认 xlsx）
    fn get_template_format(&self) -> TemplateFormat;

    /// 掩码最少列数（默认 15）
    fn get_min_mask_columns(&self) -> usize;

    /// 上传文件大小上限，字节（默认 50 MiB）
    fn get_max_file_size_bytes(&self) -> u64;

    // ===== 对账 =====

    /// 新发现库存批次标签（默认 LOECART）
    fn get_unmatched_lot_label(&self) -> String;

    /// 默认语言（默认 fr）
    fn get_default_locale(&self) -> String;

    // ===== 掩码列布局 =====

    fn get_mask_layout(&self) -> MaskLayout;
}
