// ==========================================
// 资源分配优化器 - 求解后端接口
// ==========================================
// 一次 solve 调用 = 一次尝试；重试与时限增长由 retry 负责
// ==========================================

use crate::domain::types::TerminationCondition;
use crate::engine::milp::{MilpProblem, VarKey};
use crate::solver::error::SolverResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// 单次尝试的限制
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptLimits {
    /// 从 1 开始的尝试序号
    pub attempt: u32,
    pub time_limit: Duration,
    pub mip_gap: Option<f64>,
}

/// 求解器返回的原始解（变量按 LP 名称索引）
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub termination: TerminationCondition,
    pub objective: Option<f64>,
    pub values: HashMap<String, f64>,
}

impl Solution {
    /// 变量取值，缺失视为 0
    pub fn value(&self, var: &VarKey) -> f64 {
        self.values.get(&var.to_string()).copied().unwrap_or(0.0)
    }

    /// 二元变量是否为真（取值 > 0.5）
    pub fn is_set(&self, var: &VarKey) -> bool {
        self.value(var) > 0.5
    }
}

#[async_trait]
pub trait SolverBackend: Send + Sync {
    fn name(&self) -> &str;

    /// 每次求解（全部尝试）开始前调用一次
    fn prepare(&self) -> SolverResult<()> {
        Ok(())
    }

    /// 求解一次；非成功终止条件也以 Ok 返回，由调用方决定是否重试
    async fn solve(&self, problem: &MilpProblem, limits: &AttemptLimits) -> SolverResult<Solution>;
}
