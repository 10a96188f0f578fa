// ==========================================
// 资源分配优化器 - 性能统计与操作历史
// ==========================================
// 职责: 记录生命周期各步骤耗时（导入/选型/建模/求解/提取）
// ==========================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};

pub fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

// ==========================================
// HistoryEntry - 单条操作记录
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// 操作结束时刻
    pub at: DateTime<Utc>,
    /// 操作名称
    pub operation: String,
    /// 耗时（毫秒）
    pub elapsed_ms: u64,
}

/// 性能统计 Guard：记录 elapsed_ms
///
/// 使用方式：
/// ```ignore
/// let perf = allocation_optimizer::perf::PerfGuard::new("build");
/// // do work...
/// history.push(perf.finish());
/// ```
///
/// 未调用 `finish` 而直接 drop（例如提前 `?` 返回）时同样输出耗时日志
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    finished: bool,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
            finished: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// 结束计时并生成历史记录
    pub fn finish(mut self) -> HistoryEntry {
        self.finished = true;
        let elapsed_ms = self.start.elapsed().as_millis() as u64;

        tracing::info!(target: "perf", op = self.op, elapsed_ms, "done");

        HistoryEntry {
            at: Utc::now(),
            operation: self.op.to_string(),
            elapsed_ms,
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        tracing::info!(target: "perf", op = self.op, elapsed_ms, "aborted");
    }
}

// ==========================================
// OperationHistory - 操作历史
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct OperationHistory {
    entries: Vec<HistoryEntry>,
}

impl OperationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// 某操作的累计耗时（毫秒）
    pub fn total_ms(&self, operation: &str) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.operation == operation)
            .map(|e| e.elapsed_ms)
            .sum()
    }
}
