// ==========================================
// 资源分配优化器 - 求解器错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 除 RetriesExhausted 外均为单次尝试的可恢复错误
// ==========================================

use crate::domain::types::TerminationCondition;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("求解器启动失败 ({program}): {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("求解器文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("求解器长时间无改进已被终止，建议下次时限 {revised_timeout:?}")]
    Stalled { revised_timeout: Duration },

    #[error("求解器退出异常 (退出码 {code:?})")]
    ExitStatus { code: Option<i32> },

    #[error("求解报告无法解析: {0}")]
    Report(String),

    #[error("求解未成功，终止条件: {0}")]
    Termination(TerminationCondition),

    #[error("求解尝试 {attempts} 次均未成功，最后一次: {last}")]
    RetriesExhausted { attempts: u32, last: Box<SolverError> },
}

impl SolverError {
    /// 看门狗给出的下次时限（仅 Stalled 有）
    pub fn revised_timeout(&self) -> Option<Duration> {
        match self {
            SolverError::Stalled { revised_timeout } => Some(*revised_timeout),
            _ => None,
        }
    }
}

/// Result 类型别名
pub type SolverResult<T> = Result<T, SolverError>;
