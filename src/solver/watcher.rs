// ==========================================
// 资源分配优化器 - 求解停滞看门狗
// ==========================================
// 职责: 定时读取 glpsol 进度日志，记录最近一次新最优解的时刻；
//       超过停滞阈值时告警，或经由 oneshot 通道请求终止本次尝试
// 约束: 只读日志文件，不触碰模型；终止动作由尝试方执行
// ==========================================

use crate::solver::report::parse_best_line;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// 看门狗参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchSettings {
    pub poll_interval: Duration,
    pub stall_threshold: Duration,
    pub kill_if_stuck: bool,
}

/// 停滞终止请求
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StallSignal {
    pub revised_timeout: Duration,
    pub best: Option<f64>,
}

/// 单次检查结论
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StallVerdict {
    Healthy,
    Warn { idle: Duration },
    Kill(StallSignal),
}

/// 下次尝试的时限：找到当前最优解所用时间再加 max(10s, 10%)
pub fn revised_timeout(seconds_to_best: f64) -> Duration {
    let margin = (seconds_to_best * 0.1).max(10.0);
    Duration::from_secs_f64(seconds_to_best + margin)
}

// ==========================================
// StallTracker - 停滞判定状态
// ==========================================
#[derive(Debug, Clone)]
pub struct StallTracker {
    started: Instant,
    last_best_at: Instant,
    best: Option<f64>,
    seconds_to_best: f64,
    warned: bool,
}

impl StallTracker {
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            last_best_at: started,
            best: None,
            seconds_to_best: 0.0,
            warned: false,
        }
    }

    pub fn best(&self) -> Option<f64> {
        self.best
    }

    /// 记录一条新最优解行；取值未变化时不算改进
    pub fn observe(&mut self, value: f64, at: Instant) -> bool {
        if self.best == Some(value) {
            return false;
        }
        self.best = Some(value);
        self.last_best_at = at;
        self.seconds_to_best = at.duration_since(self.started).as_secs_f64();
        self.warned = false;
        true
    }

    /// 尚无任何可行解时只告警不终止
    pub fn check(&mut self, now: Instant, settings: &WatchSettings) -> StallVerdict {
        let idle = now.duration_since(self.last_best_at);
        if idle <= settings.stall_threshold {
            return StallVerdict::Healthy;
        }

        if settings.kill_if_stuck && self.best.is_some() {
            return StallVerdict::Kill(StallSignal {
                revised_timeout: revised_timeout(self.seconds_to_best),
                best: self.best,
            });
        }

        if self.warned {
            StallVerdict::Healthy
        } else {
            self.warned = true;
            StallVerdict::Warn { idle }
        }
    }
}

// ==========================================
// 后台任务
// ==========================================

/// 启动看门狗任务；返回任务句柄与终止请求接收端
///
/// 尝试结束（接收端被丢弃）后任务在下一次轮询时自行退出
pub fn spawn_watcher(log_path: PathBuf, settings: WatchSettings) -> (JoinHandle<()>, oneshot::Receiver<StallSignal>) {
    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(watch(log_path, settings, tx));
    (handle, rx)
}

async fn watch(log_path: PathBuf, settings: WatchSettings, tx: oneshot::Sender<StallSignal>) {
    let mut tracker = StallTracker::new(Instant::now());
    let mut offset = 0usize;
    let mut ticker = tokio::time::interval(settings.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if tx.is_closed() {
            break;
        }

        if let Ok(text) = tokio::fs::read_to_string(&log_path).await {
            // 只消费完整行
            if text.len() > offset {
                if let Some(end) = text[offset..].rfind('\n') {
                    let now = Instant::now();
                    for line in text[offset..offset + end].lines() {
                        if let Some(value) = parse_best_line(line) {
                            if tracker.observe(value, now) {
                                info!(best = value, "求解器找到新的最优解");
                            }
                        }
                    }
                    offset += end + 1;
                }
            }
        }

        match tracker.check(Instant::now(), &settings) {
            StallVerdict::Healthy => {}
            StallVerdict::Warn { idle } => {
                warn!(idle_secs = idle.as_secs(), best = ?tracker.best(), "求解器长时间无改进");
            }
            StallVerdict::Kill(signal) => {
                warn!(
                    revised_secs = signal.revised_timeout.as_secs_f64(),
                    best = ?signal.best,
                    "求解器停滞，请求终止本次尝试"
                );
                if tx.send(signal).is_err() {
                    debug!("尝试已结束，终止请求被忽略");
                }
                break;
            }
        }
    }
}
