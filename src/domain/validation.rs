// ==========================================
// 资源分配优化器 - 校验问题记录
// ==========================================
// 上游导入层的校验结果原样透传，本系统的结构校验使用同一格式
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// 问题代码
    pub code: String,

    /// 可读描述
    pub text: String,

    /// 引发问题的对象名（类名/实例名/链接名）
    pub offender: String,

    /// true = 可修复（不阻断导入）；false = 致命
    pub fixable: bool,
}

impl ValidationIssue {
    pub fn fatal(code: &str, offender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            text: text.into(),
            offender: offender.into(),
            fixable: false,
        }
    }

    pub fn warning(code: &str, offender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            text: text.into(),
            offender: offender.into(),
            fixable: true,
        }
    }

    pub fn is_fatal(&self) -> bool {
        !self.fixable
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.code, self.text, self.offender)
    }
}

/// 是否存在致命问题
pub fn has_fatal(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(ValidationIssue::is_fatal)
}
