// ==========================================
// 库存盘点对账API
// ==========================================
// 职责: 封装 校验 / 生成实盘模板 / 生成最终文件 三个用例
// 流程: 导入层 → 引擎编排器 → 导出器
// ==========================================

use crate::api::error::ApiResult;
use crate::config::ReconcileConfigReader;
use crate::domain::mask::{MaskMetadata, MaskStats, ParsedMask};
use crate::domain::reconcile::{DistributionSummary, ReconcileWarning};
use crate::domain::types::DepotType;
use crate::engine::error::ReconcileError;
use crate::engine::rule_validator::RuleViolation;
use crate::engine::ReconcileOrchestrator;
use crate::exporter::FileExporter;
use crate::importer::MaskImporter;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

/// 校验响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    pub metadata: MaskMetadata,
    pub stats: MaskStats,
    /// 是否通过业务规则校验
    pub passed: bool,
    pub violations: Vec<RuleViolation>,
    /// 当前语言下的违规说明
    pub messages: Vec<String>,
}

/// 模板生成响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub metadata: MaskMetadata,
    pub stats: MaskStats,
    pub template_path: String,
    /// 模板数据行数（不含表头）
    pub template_rows: usize,
}

/// 最终文件响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeResponse {
    /// 本次运行ID（日志关联用）
    pub run_id: String,
    pub metadata: MaskMetadata,
    pub final_path: String,
    pub summary: DistributionSummary,
    pub warnings: Vec<ReconcileWarning>,
    /// 当前语言下的告警说明
    pub warning_messages: Vec<String>,
    /// 耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 对账API
pub struct ReconcileApi {
    importer: MaskImporter,
    orchestrator: ReconcileOrchestrator,
    exporter: FileExporter,
}

impl ReconcileApi {
    /// 创建新的ReconcileApi实例
    pub fn new<C: ReconcileConfigReader>(config: &C) -> Self {
        Self {
            importer: MaskImporter::from_config(config),
            orchestrator: ReconcileOrchestrator::from_config(config),
            exporter: FileExporter::from_config(config),
        }
    }

    /// 解析用户输入的仓库类型
    pub fn parse_depot_type(value: &str) -> ApiResult<DepotType> {
        DepotType::parse(value)
            .ok_or_else(|| ReconcileError::InvalidDepotType(value.to_string()).into())
    }

    fn load_mask(&self, mask_path: &Path) -> ApiResult<(ParsedMask, MaskMetadata, MaskStats)> {
        let mask = self.importer.load_mask(mask_path)?;
        let metadata = self
            .importer
            .extract_metadata(&mask, Local::now().naive_local());
        let stats = self.importer.compute_stats(&mask);
        Ok((mask, metadata, stats))
    }

    /// 仅校验掩码（不写文件）
    ///
    /// # 返回
    /// - Ok(CheckResponse): 结构合法；业务规则结果见 passed / violations
    /// - Err(ApiError): 文件或结构错误、仓库类型无效
    #[instrument(skip(self, mask_path), fields(mask = %mask_path.as_ref().display()))]
    pub fn check<P: AsRef<Path>>(&self, mask_path: P, depot_type: &str) -> ApiResult<CheckResponse> {
        let depot_type = Self::parse_depot_type(depot_type)?;
        let (mask, metadata, stats) = self.load_mask(mask_path.as_ref())?;

        let violations = self.orchestrator.check(&mask, depot_type);
        let messages = violations.iter().map(RuleViolation::message).collect();

        Ok(CheckResponse {
            metadata,
            stats,
            passed: violations.is_empty(),
            violations,
            messages,
        })
    }

    /// 生成实盘模板
    ///
    /// # 参数
    /// - mask_path: 掩码文件（.csv）
    /// - depot_type: 仓库类型（Conforme / Non-Conforme）
    /// - out_dir: 输出目录
    #[instrument(skip(self, mask_path, out_dir), fields(mask = %mask_path.as_ref().display()))]
    pub fn prepare_template<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        mask_path: P,
        depot_type: &str,
        out_dir: Q,
    ) -> ApiResult<TemplateResponse> {
        let depot_type = Self::parse_depot_type(depot_type)?;
        let (mask, metadata, stats) = self.load_mask(mask_path.as_ref())?;

        let rows = self.orchestrator.build_template(&mask, depot_type)?;
        let path = self
            .exporter
            .write_template(out_dir.as_ref(), &metadata, &rows)?;

        Ok(TemplateResponse {
            metadata,
            stats,
            template_path: path.display().to_string(),
            template_rows: rows.len(),
        })
    }

    /// 根据回填模板生成最终文件
    ///
    /// # 参数
    /// - mask_path: 原始掩码文件（.csv）
    /// - filled_path: 回填后的实盘模板（.csv / .xlsx / .xls）
    /// - depot_type: 仓库类型
    /// - out_dir: 输出目录
    #[instrument(skip_all, fields(run_id = tracing::field::Empty))]
    pub fn finalize<P: AsRef<Path>, F: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        mask_path: P,
        filled_path: F,
        depot_type: &str,
        out_dir: Q,
    ) -> ApiResult<FinalizeResponse> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        let depot_type = Self::parse_depot_type(depot_type)?;
        let (mask, metadata, _stats) = self.load_mask(mask_path.as_ref())?;
        let entries = self.importer.load_real_entries(filled_path.as_ref())?;

        let report = self.orchestrator.reconcile(mask, &entries, depot_type)?;
        let path = self
            .exporter
            .write_final(out_dir.as_ref(), &metadata, &report.rows)?;

        let warning_messages = report
            .warnings
            .iter()
            .map(ReconcileWarning::message)
            .collect();
        let elapsed_ms = i64::try_from(start_time.elapsed().as_millis()).unwrap_or(i64::MAX);

        info!(
            run_id = %run_id,
            final_path = %path.display(),
            warnings = report.warnings.len(),
            elapsed_ms,
            "对账运行完成"
        );

        Ok(FinalizeResponse {
            run_id,
            metadata,
            final_path: path.display().to_string(),
            summary: report.summary,
            warnings: report.warnings,
            warning_messages,
            elapsed_ms,
        })
    }
}
