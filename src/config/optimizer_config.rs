// ==========================================
// 资源分配优化器 - 优化器配置
// ==========================================
// 优先级: 环境变量 > 配置文件 > 默认值
// 环境变量: ALLOC_OPT_SOLVER / ALLOC_OPT_MAX_ATTEMPTS / ALLOC_OPT_TIMEOUT_SECS /
//           ALLOC_OPT_MIP_GAP / ALLOC_OPT_KILL_IF_STUCK / ALLOC_OPT_WORK_DIR /
//           ALLOC_OPT_KEEP_FILES
// ==========================================

use crate::perf::is_true;
use crate::solver::{RetryPolicy, WatchSettings, Workspace, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    Read { path: String, message: String },

    #[error("配置文件解析失败 ({path}): {message}")]
    Parse { path: String, message: String },

    #[error("配置值无效 ({key}): {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// 求解器可执行文件
    pub solver_path: PathBuf,
    pub max_attempts: u32,
    /// 首次尝试时限（秒）；为空时使用默认值
    pub initial_timeout_secs: Option<f64>,
    /// 每次重试的时限增长系数
    pub timeout_growth: f64,
    pub mip_gap: Option<f64>,

    // ===== 看门狗 =====
    pub poll_interval_secs: f64,
    pub stall_threshold_secs: f64,
    pub kill_if_stuck: bool,

    // ===== 工作目录 =====
    pub work_dir: PathBuf,
    pub keep_files: bool,
    pub retention_hours: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            solver_path: PathBuf::from("glpsol"),
            max_attempts: 3,
            initial_timeout_secs: None,
            timeout_growth: 1.2,
            mip_gap: None,
            poll_interval_secs: 2.0,
            stall_threshold_secs: 600.0,
            kill_if_stuck: false,
            work_dir: default_work_dir(),
            keep_files: false,
            retention_hours: 1.0,
        }
    }
}

fn default_work_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("allocation-optimizer")
}

impl OptimizerConfig {
    /// 从 JSON 文件加载（缺省字段取默认值）
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!(path = %path.display(), "已加载优化器配置");
        Ok(config)
    }

    /// 应用 ALLOC_OPT_* 环境变量覆写；无法解析的值忽略并告警
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("ALLOC_OPT_SOLVER") {
            self.solver_path = PathBuf::from(v);
        }
        if let Some(v) = env_parse::<u32>("ALLOC_OPT_MAX_ATTEMPTS") {
            self.max_attempts = v;
        }
        if let Some(v) = env_parse::<f64>("ALLOC_OPT_TIMEOUT_SECS") {
            self.initial_timeout_secs = Some(v);
        }
        if let Some(v) = env_parse::<f64>("ALLOC_OPT_MIP_GAP") {
            self.mip_gap = Some(v);
        }
        if let Ok(v) = std::env::var("ALLOC_OPT_KILL_IF_STUCK") {
            self.kill_if_stuck = is_true(&v);
        }
        if let Ok(v) = std::env::var("ALLOC_OPT_WORK_DIR") {
            self.work_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("ALLOC_OPT_KEEP_FILES") {
            self.keep_files = is_true(&v);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &'static str, message: String| Err(ConfigError::Invalid { key, message });

        let numbers = [
            ("timeout_growth", Some(self.timeout_growth)),
            ("poll_interval_secs", Some(self.poll_interval_secs)),
            ("stall_threshold_secs", Some(self.stall_threshold_secs)),
            ("retention_hours", Some(self.retention_hours)),
            ("initial_timeout_secs", self.initial_timeout_secs),
            ("mip_gap", self.mip_gap),
        ];
        for (key, value) in numbers {
            if let Some(v) = value {
                if !v.is_finite() {
                    return invalid(key, format!("必须为有限数值: {}", v));
                }
            }
        }

        if self.max_attempts == 0 {
            return invalid("max_attempts", "至少需要 1 次尝试".to_string());
        }
        if !(self.timeout_growth >= 1.0) {
            return invalid("timeout_growth", format!("增长系数不能小于 1: {}", self.timeout_growth));
        }
        if !(self.poll_interval_secs > 0.0) {
            return invalid("poll_interval_secs", format!("轮询间隔必须为正: {}", self.poll_interval_secs));
        }
        if let Some(gap) = self.mip_gap {
            if !(gap >= 0.0) {
                return invalid("mip_gap", format!("MIP gap 不能为负: {}", gap));
            }
        }
        if let Some(t) = self.initial_timeout_secs {
            if !(t > 0.0) {
                return invalid("initial_timeout_secs", format!("时限必须为正: {}", t));
            }
        }
        if self.stall_threshold_secs < 0.0 || self.retention_hours < 0.0 {
            return invalid("stall_threshold_secs/retention_hours", "不能为负".to_string());
        }
        Ok(())
    }

    pub fn watch_settings(&self) -> WatchSettings {
        WatchSettings {
            poll_interval: duration_secs(self.poll_interval_secs),
            stall_threshold: duration_secs(self.stall_threshold_secs),
            kill_if_stuck: self.kill_if_stuck,
        }
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(
            &self.work_dir,
            duration_secs(self.retention_hours * 3600.0),
            self.keep_files,
        )
    }

    /// 重试策略；调用方参数优先于配置
    pub fn retry_policy(
        &self,
        max_attempts: Option<u32>,
        initial_timeout: Option<Duration>,
        mip_gap: Option<f64>,
    ) -> RetryPolicy {
        RetryPolicy {
            max_attempts: max_attempts.unwrap_or(self.max_attempts),
            initial_timeout: initial_timeout
                .or_else(|| self.initial_timeout_secs.map(duration_secs))
                .unwrap_or(DEFAULT_TIMEOUT),
            growth: self.timeout_growth,
            mip_gap: mip_gap.or(self.mip_gap),
        }
    }
}

/// 秒数转 Duration；超出范围时取上限
fn duration_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "环境变量无法解析，已忽略");
            None
        }
    }
}
