// ==========================================
// 资源分配优化器 - 求解器层
// ==========================================
// 职责: 把编译好的 MILP 交给外部求解器，并管理超时、停滞与重试
// - backend:   求解后端接口
// - glpk:      glpsol 子进程适配
// - report:    glpsol 输出解析
// - watcher:   停滞看门狗
// - retry:     尝试循环与时限增长
// - workspace: 每次尝试的工作目录
// ==========================================

pub mod backend;
pub mod error;
pub mod glpk;
pub mod report;
pub mod retry;
pub mod watcher;
pub mod workspace;

pub use backend::{AttemptLimits, Solution, SolverBackend};
pub use error::{SolverError, SolverResult};
pub use glpk::GlpkSolver;
pub use retry::{solve_with_retries, RetryPolicy, SolveOutcome, DEFAULT_TIMEOUT};
pub use watcher::WatchSettings;
pub use workspace::Workspace;
