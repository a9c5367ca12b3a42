// ==========================================
// 库存盘点对账系统 - 引擎错误类型
// ==========================================

use crate::engine::rule_validator::RuleViolation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("{}", .messages.join(" | "))]
    BusinessRuleViolation {
        violations: Vec<RuleViolation>,
        messages: Vec<String>, // 生成时的语言
    },

    #[error("Type de dépôt invalide : {0}")]
    InvalidDepotType(String),
}

impl ReconcileError {
    pub fn from_violations(violations: Vec<RuleViolation>) -> Self {
        let messages = violations.iter().map(RuleViolation::message).collect();
        ReconcileError::BusinessRuleViolation {
            violations,
            messages,
        }
    }
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
