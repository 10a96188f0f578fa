// ==========================================
// 资源分配优化器 - 编排层错误类型
// ==========================================

use crate::config::ConfigError;
use crate::domain::validation::ValidationIssue;
use crate::engine::error::BuildError;
use crate::importer::error::ImportError;
use crate::solver::error::SolverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("输入图校验未通过: {} 个致命问题", count_fatal(.0))]
    ValidationFailed(Vec<ValidationIssue>),

    #[error("尚未导入输入图")]
    NotIngested,

    #[error("未知活动实例: {0}")]
    UnknownActivity(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

fn count_fatal(issues: &[ValidationIssue]) -> usize {
    issues.iter().filter(|i| i.is_fatal()).count()
}

/// Result 类型别名
pub type OptimizerResult<T> = Result<T, OptimizerError>;
