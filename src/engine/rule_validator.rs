// ==========================================
// 库存盘点对账系统 - 业务规则校验引擎
// ==========================================
// 职责: 掩码库存行状态与所选仓库类型的一致性校验
// 红线: 收集全部违规后一次返回，存在违规时不得进入差异分配
// ==========================================
// 规则:
// 1. 任一库存行状态为 Q（待检）→ 拒绝
// 2. 合格库出现 R/RM → 拒绝
// 3. 不合格库出现 A/AM → 拒绝
// ==========================================

use crate::domain::mask::TheoreticalRow;
use crate::domain::types::{DepotType, LotStatus};
use crate::i18n::{t, t_with_args};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, instrument};

// ==========================================
// RuleViolation - 规则违规
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleViolation {
    /// 存在待检批次
    QuarantinePresent,
    /// 批次状态与仓库类型冲突
    DepotStatusIncompatible {
        depot_type: DepotType,
        found: Vec<LotStatus>, // 实际出现的冲突状态（去重、有序）
    },
}

impl RuleViolation {
    /// 当前语言下的提示信息
    pub fn message(&self) -> String {
        match self {
            RuleViolation::QuarantinePresent => t("validation.quarantine_present"),
            RuleViolation::DepotStatusIncompatible { depot_type, .. } => {
                let forbidden = depot_type
                    .forbidden_statuses()
                    .iter()
                    .map(|s| s.code())
                    .collect::<Vec<_>>()
                    .join("/");
                t_with_args(
                    "validation.depot_status_incompatible",
                    &[("depot", depot_type.label()), ("statuses", &forbidden)],
                )
            }
        }
    }
}

// ==========================================
// BusinessRuleValidator - 业务规则校验引擎
// ==========================================
pub struct BusinessRuleValidator {
    // 无状态引擎
}

impl BusinessRuleValidator {
    pub fn new() -> Self {
        Self {}
    }

    /// 校验库存行
    ///
    /// # 返回
    /// 违规列表（空表示通过）；待检违规排在仓库类型违规之前
    #[instrument(skip(self, rows), fields(depot_type = %depot_type))]
    pub fn validate(&self, rows: &[TheoreticalRow], depot_type: DepotType) -> Vec<RuleViolation> {
        let statuses: BTreeSet<LotStatus> = rows
            .iter()
            .filter(|r| r.is_stock())
            .filter_map(|r| r.status)
            .collect();

        let mut violations = Vec::new();

        if statuses.contains(&LotStatus::Quarantine) {
            violations.push(RuleViolation::QuarantinePresent);
        }

        let forbidden = depot_type.forbidden_statuses();
        let found: Vec<LotStatus> = statuses
            .iter()
            .copied()
            .filter(|s| forbidden.contains(s))
            .collect();
        if !found.is_empty() {
            violations.push(RuleViolation::DepotStatusIncompatible { depot_type, found });
        }

        if !violations.is_empty() {
            info!(violations = violations.len(), "业务规则校验未通过");
        }

        violations
    }
}

impl Default for BusinessRuleValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::LineKind;
    use rust_decimal::Decimal;

    fn row(kind: LineKind, status: &str) -> TheoreticalRow {
        TheoreticalRow {
            line_number: 0,
            line_kind: kind,
            session_num: String::new(),
            inventory_num: String::new(),
            depot: String::new(),
            original_qty: None,
            theoretical_qty: Decimal::ZERO,
            adjusted_qty: None,
            indicator: None,
            article_code: String::new(),
            location: String::new(),
            status: LotStatus::from_code(status),
            unit: String::new(),
            lot_number: String::new(),
            raw_fields: Vec::new(),
        }
    }

    #[test]
    fn test_conforme_accepts_a_and_am() {
        let rows = vec![row(LineKind::Stock, "A"), row(LineKind::Stock, "AM")];
        let violations = BusinessRuleValidator::new().validate(&rows, DepotType::Conforme);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_conforme_rejects_r_and_rm() {
        let rows = vec![
            row(LineKind::Stock, "A"),
            row(LineKind::Stock, "RM"),
            row(LineKind::Stock, "R"),
        ];
        let violations = BusinessRuleValidator::new().validate(&rows, DepotType::Conforme);
        assert_eq!(
            violations,
            vec![RuleViolation::DepotStatusIncompatible {
                depot_type: DepotType::Conforme,
                found: vec![LotStatus::Rejected, LotStatus::RejectedModified],
            }]
        );
    }

    #[test]
    fn test_non_conforme_rejects_accepted() {
        let rows = vec![row(LineKind::Stock, "R"), row(LineKind::Stock, "AM")];
        let violations = BusinessRuleValidator::new().validate(&rows, DepotType::NonConforme);
        assert_eq!(
            violations,
            vec![RuleViolation::DepotStatusIncompatible {
                depot_type: DepotType::NonConforme,
                found: vec![LotStatus::AcceptedModified],
            }]
        );
    }

    #[test]
    fn test_quarantine_collected_with_depot_violation() {
        let rows = vec![row(LineKind::Stock, "Q"), row(LineKind::Stock, "R")];
        let violations = BusinessRuleValidator::new().validate(&rows, DepotType::Conforme);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0], RuleViolation::QuarantinePresent);
    }

    #[test]
    fn test_non_stock_rows_and_unknown_status_ignored() {
        let rows = vec![
            row(LineKind::SessionHeader, "Q"),
            row(LineKind::Stock, "X"),
            row(LineKind::Stock, ""),
        ];
        let violations = BusinessRuleValidator::new().validate(&rows, DepotType::Conforme);
        assert!(violations.is_empty());
    }
}
