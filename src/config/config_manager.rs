// ==========================================
// 库存盘点对账系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: JSON 文件（扁平 key-value），文件不存在时全部取默认值
// ==========================================
// 路径: 环境变量 MOULINETTE_CONFIG_PATH，否则 <系统配置目录>/moulinette/config.json
// ==========================================

use crate::config::reconcile_config_trait::ReconcileConfigReader;
use crate::domain::mask::MaskLayout;
use crate::domain::types::TemplateFormat;
use crate::engine::gap_distribution::DEFAULT_UNMATCHED_LOT_LABEL;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "MOULINETTE_CONFIG_PATH";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建仅含默认值的 ConfigManager
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文件加载
    ///
    /// # 参数
    /// - path: 配置文件路径（顶层为对象，非字符串值按 JSON 文本保存）
    pub fn from_file(path: &Path) -> ImportResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;

        let parsed: HashMap<String, serde_json::Value> =
            serde_json::from_str(&raw).map_err(|e| ImportError::ConfigReadError {
                key: path.display().to_string(),
                message: e.to_string(),
            })?;

        let values = parsed
            .into_iter()
            .map(|(k, v)| {
                let value = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, value)
            })
            .collect::<HashMap<_, _>>();

        info!(path = %path.display(), keys = values.len(), "配置文件加载完成");

        Ok(Self {
            values,
            source: Some(path.to_path_buf()),
        })
    }

    /// 按默认路径加载（文件不存在时使用默认值）
    pub fn load() -> ImportResult<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            Some(path) => {
                debug!(path = %path.display(), "配置文件不存在，使用默认配置");
                Ok(Self::new())
            }
            None => Ok(Self::new()),
        }
    }

    /// 默认配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::config_dir().map(|dir| dir.join("moulinette").join("config.json"))
    }

    /// 配置来源文件（默认配置时为 None）
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 覆写单个配置
    pub fn set_config_value(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.get_config_value(key).unwrap_or(default).to_string()
    }

    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> T
    where
        T: std::str::FromStr + Copy,
    {
        match self.get_config_value(key) {
            None => default,
            Some(raw) => raw.parse::<T>().unwrap_or_else(|_| {
                warn!(key, value = raw, "配置值无法解析，使用默认值");
                default
            }),
        }
    }

    fn get_delimiter_or_default(&self, key: &str, default: u8) -> u8 {
        match self.get_config_value(key) {
            None => default,
            Some("\\t") | Some("tab") | Some("TAB") => b'\t',
            Some(raw) if raw.len() == 1 && raw.is_ascii() => raw.as_bytes()[0],
            Some(raw) => {
                warn!(key, value = raw, "分隔符必须为单个 ASCII 字符，使用默认值");
                default
            }
        }
    }

    /// 获取所有生效配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 随对账结果输出，便于复现
    pub fn get_config_snapshot(&self) -> ImportResult<String> {
        let layout = self.get_mask_layout();
        let mut snapshot: BTreeMap<String, String> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let effective = [
            (config_keys::MASK_DELIMITER, (self.get_mask_delimiter() as char).to_string()),
            (
                config_keys::TEMPLATE_DELIMITER,
                (self.get_template_delimiter() as char).to_string(),
            ),
            (config_keys::TEMPLATE_FORMAT, self.get_template_format().to_string()),
            (config_keys::MIN_MASK_COLUMNS, self.get_min_mask_columns().to_string()),
            (
                config_keys::MAX_FILE_SIZE_BYTES,
                self.get_max_file_size_bytes().to_string(),
            ),
            (config_keys::UNMATCHED_LOT_LABEL, self.get_unmatched_lot_label()),
            (config_keys::LOCALE, self.get_default_locale()),
            (config_keys::COLUMN_LINE_KIND, layout.line_kind.to_string()),
            (config_keys::COLUMN_SESSION_NUM, layout.session_num.to_string()),
            (config_keys::COLUMN_INVENTORY_NUM, layout.inventory_num.to_string()),
            (config_keys::COLUMN_DEPOT, layout.depot.to_string()),
            (config_keys::COLUMN_THEORETICAL_QTY, layout.theoretical_qty.to_string()),
            (config_keys::COLUMN_ADJUSTED_QTY, layout.adjusted_qty.to_string()),
            (config_keys::COLUMN_INDICATOR, layout.indicator.to_string()),
            (config_keys::COLUMN_ARTICLE_CODE, layout.article_code.to_string()),
            (config_keys::COLUMN_LOCATION, layout.location.to_string()),
            (config_keys::COLUMN_STATUS, layout.status.to_string()),
            (config_keys::COLUMN_UNIT, layout.unit.to_string()),
            (config_keys::COLUMN_LOT_NUMBER, layout.lot_number.to_string()),
        ];
        for (key, value) in effective {
            snapshot.insert(key.to_string(), value);
        }

        serde_json::to_string(&snapshot).map_err(|e| ImportError::InternalError(e.to_string()))
    }
}

impl ReconcileConfigReader for ConfigManager {
    // ===== 文件格式 =====

    fn get_mask_delimiter(&self) -> u8 {
        self.get_delimiter_or_default(config_keys::MASK_DELIMITER, b';')
    }

    fn get_template_delimiter(&self) -> u8 {
        self.get_delimiter_or_default(config_keys::TEMPLATE_DELIMITER, b';')
    }

    fn get_template_format(&self) -> TemplateFormat {
        match self.get_config_value(config_keys::TEMPLATE_FORMAT) {
            None => TemplateFormat::default(),
            Some(raw) => TemplateFormat::parse(raw).unwrap_or_else(|| {
                warn!(key = config_keys::TEMPLATE_FORMAT, value = raw, "模板格式无效，使用默认值");
                TemplateFormat::default()
            }),
        }
    }

    fn get_min_mask_columns(&self) -> usize {
        self.get_parsed_or_default(config_keys::MIN_MASK_COLUMNS, 15)
    }

    fn get_max_file_size_bytes(&self) -> u64 {
        self.get_parsed_or_default(config_keys::MAX_FILE_SIZE_BYTES, 50 * 1024 * 1024)
    }

    // ===== 对账 =====

    fn get_unmatched_lot_label(&self) -> String {
        self.get_config_or_default(config_keys::UNMATCHED_LOT_LABEL, DEFAULT_UNMATCHED_LOT_LABEL)
    }

    fn get_default_locale(&self) -> String {
        self.get_config_or_default(config_keys::LOCALE, "fr")
    }

    // ===== 掩码列布局 =====

    fn get_mask_layout(&self) -> MaskLayout {
        let d = MaskLayout::default();
        MaskLayout {
            line_kind: self.get_parsed_or_default(config_keys::COLUMN_LINE_KIND, d.line_kind),
            session_num: self.get_parsed_or_default(config_keys::COLUMN_SESSION_NUM, d.session_num),
            inventory_num: self
                .get_parsed_or_default(config_keys::COLUMN_INVENTORY_NUM, d.inventory_num),
            depot: self.get_parsed_or_default(config_keys::COLUMN_DEPOT, d.depot),
            theoretical_qty: self
                .get_parsed_or_default(config_keys::COLUMN_THEORETICAL_QTY, d.theoretical_qty),
            adjusted_qty: self
                .get_parsed_or_default(config_keys::COLUMN_ADJUSTED_QTY, d.adjusted_qty),
            indicator: self.get_parsed_or_default(config_keys::COLUMN_INDICATOR, d.indicator),
            article_code: self
                .get_parsed_or_default(config_keys::COLUMN_ARTICLE_CODE, d.article_code),
            location: self.get_parsed_or_default(config_keys::COLUMN_LOCATION, d.location),
            status: self.get_parsed_or_default(config_keys::COLUMN_STATUS, d.status),
            unit: self.get_parsed_or_default(config_keys::COLUMN_UNIT, d.unit),
            lot_number: self.get_parsed_or_default(config_keys::COLUMN_LOT_NUMBER, d.lot_number),
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 文件格式
    pub const MASK_DELIMITER: &str = "mask_delimiter";
    pub const TEMPLATE_DELIMITER: &str = "template_delimiter";
    pub const TEMPLATE_FORMAT: &str = "template_format"; // xlsx | csv
    pub const MIN_MASK_COLUMNS: &str = "min_mask_columns";
    pub const MAX_FILE_SIZE_BYTES: &str = "max_file_size_bytes";

    // 对账
    pub const UNMATCHED_LOT_LABEL: &str = "unmatched_lot_label";
    pub const LOCALE: &str = "locale";

    // 掩码列布局（0 起的列索引）
    pub const COLUMN_LINE_KIND: &str = "mask_column_line_kind";
    pub const COLUMN_SESSION_NUM: &str = "mask_column_session_num";
    pub const COLUMN_INVENTORY_NUM: &str = "mask_column_inventory_num";
    pub const COLUMN_DEPOT: &str = "mask_column_depot";
    pub const COLUMN_THEORETICAL_QTY: &str = "mask_column_theoretical_qty";
    pub const COLUMN_ADJUSTED_QTY: &str = "mask_column_adjusted_qty";
    pub const COLUMN_INDICATOR: &str = "mask_column_indicator";
    pub const COLUMN_ARTICLE_CODE: &str = "mask_column_article_code";
    pub const COLUMN_LOCATION: &str = "mask_column_location";
    pub const COLUMN_STATUS: &str = "mask_column_status";
    pub const COLUMN_UNIT: &str = "mask_column_unit";
    pub const COLUMN_LOT_NUMBER: &str = "mask_column_lot_number";
}
