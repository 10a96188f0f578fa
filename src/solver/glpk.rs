// ==========================================
// 资源分配优化器 - GLPK 求解器适配
// ==========================================
// 调用: glpsol --lp problem.lp --tmlim <秒> [--mipgap <g>] --log progress.log -o report.txt
// 并发: 子进程运行期间看门狗任务轮询进度日志；
//       收到停滞信号即终止子进程，本次尝试以 Stalled 结束
// ==========================================

use crate::engine::milp::MilpProblem;
use crate::solver::backend::{AttemptLimits, Solution, SolverBackend};
use crate::solver::error::{SolverError, SolverResult};
use crate::solver::report::parse_report;
use crate::solver::watcher::{spawn_watcher, WatchSettings};
use crate::solver::workspace::{RunDir, Workspace};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct GlpkSolver {
    program: PathBuf,
    workspace: Workspace,
    watch: WatchSettings,
}

impl GlpkSolver {
    pub fn new(program: impl Into<PathBuf>, workspace: Workspace, watch: WatchSettings) -> Self {
        Self {
            program: program.into(),
            workspace,
            watch,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    async fn run_attempt(&self, run: &RunDir, problem: &MilpProblem, limits: &AttemptLimits) -> SolverResult<Solution> {
        tokio::fs::write(run.problem_path(), problem.to_lp()).await?;

        // glpsol 只接受整数秒
        let tmlim = limits.time_limit.as_secs_f64().ceil().max(1.0) as u64;

        let mut command = Command::new(&self.program);
        command
            .arg("--lp")
            .arg(run.problem_path())
            .arg("--tmlim")
            .arg(tmlim.to_string());
        if let Some(gap) = limits.mip_gap {
            command.arg("--mipgap").arg(gap.to_string());
        }
        command
            .arg("--log")
            .arg(run.log_path())
            .arg("-o")
            .arg(run.report_path());
        command.current_dir(&run.path);
        command.stdin(Stdio::null());
        command.stdout(Stdio::null());
        command.stderr(Stdio::null());
        command.kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| SolverError::Launch {
            program: self.program.display().to_string(),
            source,
        })?;
        debug!(attempt = limits.attempt, tmlim, dir = %run.path.display(), "glpsol 已启动");

        let (watcher, mut stall_rx) = spawn_watcher(run.log_path(), self.watch);
        let finished = tokio::select! {
            status = child.wait() => Ok(status),
            Ok(signal) = &mut stall_rx => Err(signal),
        };
        watcher.abort();

        let status = match finished {
            Ok(status) => status?,
            Err(signal) => {
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "终止 glpsol 失败");
                }
                return Err(SolverError::Stalled {
                    revised_timeout: signal.revised_timeout,
                });
            }
        };

        if !status.success() {
            return Err(SolverError::ExitStatus { code: status.code() });
        }

        let report = tokio::fs::read_to_string(run.report_path()).await?;
        parse_report(&report)
    }
}

#[async_trait]
impl SolverBackend for GlpkSolver {
    fn name(&self) -> &str {
        "glpk"
    }

    fn prepare(&self) -> SolverResult<()> {
        self.workspace.clean_stale()?;
        Ok(())
    }

    async fn solve(&self, problem: &MilpProblem, limits: &AttemptLimits) -> SolverResult<Solution> {
        let run = self.workspace.create_run_dir()?;
        let result = self.run_attempt(&run, problem, limits).await;

        let success = matches!(&result, Ok(solution) if solution.termination.is_success());
        self.workspace.finish(&run, success);

        if let Ok(solution) = &result {
            info!(
                attempt = limits.attempt,
                termination = %solution.termination,
                objective = ?solution.objective,
                "glpsol 尝试结束"
            );
        }
        result
    }
}
