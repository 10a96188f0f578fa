// ==========================================
// 资源分配优化器 - 求解工作目录
// ==========================================
// 每次尝试一个独立目录: <本地时间戳>_<uuid>/{problem.lp, progress.log, report.txt}
// 每次求解前清理超过保留时长的旧目录；成功后按配置删除本次目录
// ==========================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};
use uuid::Uuid;

const PROBLEM_FILE: &str = "problem.lp";
const LOG_FILE: &str = "progress.log";
const REPORT_FILE: &str = "report.txt";

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    retention: Duration,
    keep_files: bool,
}

/// 单次尝试的目录
#[derive(Debug, Clone, PartialEq)]
pub struct RunDir {
    pub path: PathBuf,
}

impl RunDir {
    pub fn problem_path(&self) -> PathBuf {
        self.path.join(PROBLEM_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.path.join(LOG_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.path.join(REPORT_FILE)
    }
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, retention: Duration, keep_files: bool) -> Self {
        Self {
            root: root.into(),
            retention,
            keep_files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 删除修改时间早于保留时长的条目，返回删除数量
    pub fn clean_stale(&self) -> io::Result<usize> {
        if !self.root.exists() {
            return Ok(0);
        }

        let now = SystemTime::now();
        let mut removed = 0usize;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let modified = entry.metadata()?.modified()?;
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= self.retention {
                continue;
            }

            let path = entry.path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "旧求解文件删除失败"),
            }
        }

        if removed > 0 {
            debug!(removed, root = %self.root.display(), "已清理旧求解文件");
        }
        Ok(removed)
    }

    pub fn create_run_dir(&self) -> io::Result<RunDir> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = self.root.join(format!("{}_{}", stamp, Uuid::new_v4().simple()));
        fs::create_dir_all(&path)?;
        Ok(RunDir { path })
    }

    /// 尝试结束：成功且未要求保留时删除目录
    pub fn finish(&self, run: &RunDir, success: bool) {
        if !success || self.keep_files {
            debug!(path = %run.path.display(), "保留求解文件");
            return;
        }
        if let Err(e) = fs::remove_dir_all(&run.path) {
            warn!(path = %run.path.display(), error = %e, "求解文件删除失败");
        }
    }
}
