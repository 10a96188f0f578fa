// ==========================================
// 资源分配优化器 - 求解重试
// ==========================================
// 最优/可行即接受；其余终止条件或启动失败按尝试上限重试
// 时限每次按增长系数放大；看门狗给出修正时限后，后续尝试沿用修正值
// ==========================================

use crate::domain::types::TerminationCondition;
use crate::engine::milp::MilpProblem;
use crate::solver::backend::{AttemptLimits, Solution, SolverBackend};
use crate::solver::error::{SolverError, SolverResult};
use std::time::Duration;
use tracing::{info, warn};

/// 未指定初始时限时使用
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_timeout: Duration,
    pub growth: f64,
    pub mip_gap: Option<f64>,
}

/// 被接受的解及所用尝试次数
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub solution: Solution,
    pub attempts: u32,
}

pub async fn solve_with_retries(
    backend: &dyn SolverBackend,
    problem: &MilpProblem,
    policy: &RetryPolicy,
) -> SolverResult<SolveOutcome> {
    if let Err(e) = backend.prepare() {
        warn!(backend = backend.name(), error = %e, "求解前准备失败，继续求解");
    }

    let max_attempts = policy.max_attempts.max(1);
    let mut timeout = policy.initial_timeout;
    let mut revised: Option<Duration> = None;
    let mut last = SolverError::Termination(TerminationCondition::Error);

    for attempt in 1..=max_attempts {
        let limits = AttemptLimits {
            attempt,
            time_limit: timeout,
            mip_gap: policy.mip_gap,
        };
        info!(
            backend = backend.name(),
            attempt,
            max_attempts,
            time_limit_secs = timeout.as_secs_f64(),
            "开始求解尝试"
        );

        match backend.solve(problem, &limits).await {
            Ok(solution) if solution.termination.is_success() => {
                info!(attempt, termination = %solution.termination, "求解成功");
                return Ok(SolveOutcome { solution, attempts: attempt });
            }
            Ok(solution) => {
                warn!(attempt, termination = %solution.termination, "求解未成功");
                last = SolverError::Termination(solution.termination);
            }
            Err(e) => {
                warn!(attempt, error = %e, "求解尝试失败");
                if let Some(r) = e.revised_timeout() {
                    revised = Some(r);
                }
                last = e;
            }
        }

        timeout = match revised {
            Some(r) => r,
            None => grow(timeout, policy.growth),
        };
    }

    Err(SolverError::RetriesExhausted {
        attempts: max_attempts,
        last: Box::new(last),
    })
}

/// 按增长系数放大时限；溢出时取上限
fn grow(timeout: Duration, growth: f64) -> Duration {
    Duration::try_from_secs_f64(timeout.as_secs_f64() * growth).unwrap_or(Duration::MAX)
}
