// ==========================================
// glpsol 子进程集成测试
// ==========================================
// 用 shell 脚本冒充 glpsol：按参数写进度日志与报告，
// 验证命令行约定、报告解析、工作目录清理与停滞终止
// ==========================================
#![cfg(unix)]

mod helpers;

use allocation_optimizer::{Optimizer, OptimizerConfig, OptimizerError, SolverError};
use helpers::graph_builder::single_pair_graph;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::Mutex;

// 同一进程内并发 fork 可能持有刚写入脚本的句柄（ETXTBSY），串行执行
static SERIAL: Mutex<()> = Mutex::const_new(());

const ARG_PARSING: &str = r#"#!/bin/sh
log=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    --log) log="$2"; shift ;;
    -o) out="$2"; shift ;;
  esac
  shift
done
"#;

const SOLVED_BODY: &str = r#"
echo "+     3: >>>>>   1.000000000e+00 <=   1.000000000e+00   0.0% (1; 0)" >> "$log"
cat > "$out" <<'REPORT'
Problem:
Rows:       3
Columns:    2 (2 integer, 2 binary)
Non-zeros:  4
Status:     INTEGER OPTIMAL
Objective:  obj = 1 (MAXimum)

   No.   Row name        Activity     Lower bound   Upper bound
------ ------------    ------------- ------------- -------------
     1 cap_r0_b0                   1                           1

   No. Column name       Activity     Lower bound   Upper bound
------ ------------    ------------- ------------- -------------
     1 x_r0_a0      *              1             0             1
     2 pick_a0      *              1             0             1

End of output
REPORT
"#;

const STALL_BODY: &str = r#"
echo "+     3: >>>>>   1.000000000e+00 <=   9.000000000e+00  88.9% (1; 0)" >> "$log"
exec sleep 30
"#;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("{}{}", ARG_PARSING, body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn config(solver: PathBuf, work_dir: &Path) -> OptimizerConfig {
    allocation_optimizer::logging::init_test();
    OptimizerConfig {
        solver_path: solver,
        work_dir: work_dir.to_path_buf(),
        max_attempts: 1,
        initial_timeout_secs: Some(5.0),
        poll_interval_secs: 0.05,
        ..Default::default()
    }
}

fn run_dirs(work_dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(work_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect()
}

#[tokio::test]
async fn test_solved_report_is_decoded() {
    let _guard = SERIAL.lock().await;
    let bin = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let script = write_script(bin.path(), "glpsol", SOLVED_BODY);

    let mut opt = Optimizer::new(config(script, work.path())).unwrap();
    opt.ingest(single_pair_graph()).unwrap();
    let out = opt.get_output().await.unwrap();

    assert!((out.objective_value - 1.0).abs() < 1e-9);
    assert_eq!(out.allocations["wallet"], vec!["item".to_string()]);

    // 成功且未要求保留时，本次尝试的目录被删除
    assert!(run_dirs(work.path()).is_empty());
}

#[tokio::test]
async fn test_keep_files_leaves_problem_on_disk() {
    let _guard = SERIAL.lock().await;
    let bin = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let script = write_script(bin.path(), "glpsol", SOLVED_BODY);

    let cfg = OptimizerConfig {
        keep_files: true,
        ..config(script, work.path())
    };
    let mut opt = Optimizer::new(cfg).unwrap();
    opt.ingest(single_pair_graph()).unwrap();
    opt.get_output().await.unwrap();

    let dirs = run_dirs(work.path());
    assert_eq!(dirs.len(), 1);
    let lp = std::fs::read_to_string(dirs[0].join("problem.lp")).unwrap();
    assert!(lp.contains("Maximize\n obj: "));
    assert!(lp.contains("pick_a0"));
    assert!(dirs[0].join("progress.log").exists());
}

#[tokio::test]
async fn test_stalled_solver_is_killed() {
    let _guard = SERIAL.lock().await;
    let bin = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let script = write_script(bin.path(), "glpsol", STALL_BODY);

    let cfg = OptimizerConfig {
        stall_threshold_secs: 0.2,
        kill_if_stuck: true,
        initial_timeout_secs: Some(60.0),
        ..config(script, work.path())
    };
    let mut opt = Optimizer::new(cfg).unwrap();
    opt.ingest(single_pair_graph()).unwrap();

    let started = Instant::now();
    let err = opt.solve_with_defaults().await.unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(10));

    match err {
        OptimizerError::Solver(SolverError::RetriesExhausted { attempts, last }) => {
            assert_eq!(attempts, 1);
            assert!(matches!(*last, SolverError::Stalled { .. }));
        }
        other => panic!("意外错误: {:?}", other),
    }
    assert!(opt.output().is_none());

    // 失败的尝试保留现场
    assert_eq!(run_dirs(work.path()).len(), 1);
}

#[tokio::test]
async fn test_missing_binary_is_launch_error() {
    let _guard = SERIAL.lock().await;
    let work = TempDir::new().unwrap();
    let missing = work.path().join("no-such-glpsol");

    let mut opt = Optimizer::new(config(missing, work.path())).unwrap();
    opt.ingest(single_pair_graph()).unwrap();

    let err = opt.solve_with_defaults().await.unwrap_err();
    match err {
        OptimizerError::Solver(SolverError::RetriesExhausted { last, .. }) => {
            assert!(matches!(*last, SolverError::Launch { .. }));
        }
        other => panic!("意外错误: {:?}", other),
    }
}
