// ==========================================
// 资源分配优化器 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 通配实例名：展开为该类的全部实例
pub const WILDCARD: &str = "ALL";

// ==========================================
// 优化器生命周期状态 (Optimizer State)
// ==========================================
// 只能按 Uningested → Ingested → Built → Solved 前进
// 重新导入会回退到 Ingested
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizerState {
    Uningested, // 尚未导入
    Ingested,   // 已导入（模型未构建）
    Built,      // 模型已构建
    Solved,     // 已求解
}

impl fmt::Display for OptimizerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerState::Uningested => write!(f, "UNINGESTED"),
            OptimizerState::Ingested => write!(f, "INGESTED"),
            OptimizerState::Built => write!(f, "BUILT"),
            OptimizerState::Solved => write!(f, "SOLVED"),
        }
    }
}

// ==========================================
// 求解终止条件 (Termination Condition)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminationCondition {
    Optimal,    // 最优
    Feasible,   // 可行但未证明最优（通常为超时）
    Infeasible, // 无可行解
    Error,      // 求解器异常或状态未知
}

impl TerminationCondition {
    /// 最优与可行解都会被接受，其余需要重试
    pub fn is_success(&self) -> bool {
        matches!(self, TerminationCondition::Optimal | TerminationCondition::Feasible)
    }
}

impl fmt::Display for TerminationCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationCondition::Optimal => write!(f, "OPTIMAL"),
            TerminationCondition::Feasible => write!(f, "FEASIBLE"),
            TerminationCondition::Infeasible => write!(f, "INFEASIBLE"),
            TerminationCondition::Error => write!(f, "ERROR"),
        }
    }
}

// ==========================================
// 分配约束类型 (Allocation Constraint Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// 互斥：同一资源实例不能同时分配给两个活动类
    IfNot,
    /// 层级使能：子分配只有在包含它的父分配成立时才允许
    ContainedIfThen,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::IfNot => "IF-NOT",
            ConstraintKind::ContainedIfThen => "Contained IF-THEN",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConstraintKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "IF-NOT" => Ok(ConstraintKind::IfNot),
            "Contained IF-THEN" => Ok(ConstraintKind::ContainedIfThen),
            other => Err(format!("未知分配约束类型: {}", other)),
        }
    }
}

// ==========================================
// 包含关系所属侧 (Containment Side)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainmentSide {
    Resource,
    Activity,
}

impl fmt::Display for ContainmentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainmentSide::Resource => write!(f, "resource"),
            ContainmentSide::Activity => write!(f, "activity"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_kind_parse() {
        assert_eq!("IF-NOT".parse::<ConstraintKind>(), Ok(ConstraintKind::IfNot));
        assert_eq!(
            " Contained IF-THEN ".parse::<ConstraintKind>(),
            Ok(ConstraintKind::ContainedIfThen)
        );
        let err = "IF-THEN".parse::<ConstraintKind>().unwrap_err();
        assert!(err.contains("IF-THEN"));
    }

    #[test]
    fn test_termination_success() {
        assert!(TerminationCondition::Optimal.is_success());
        assert!(TerminationCondition::Feasible.is_success());
        assert!(!TerminationCondition::Infeasible.is_success());
        assert!(!TerminationCondition::Error.is_success());
    }

    #[test]
    fn test_state_order() {
        assert!(OptimizerState::Uningested < OptimizerState::Ingested);
        assert!(OptimizerState::Built < OptimizerState::Solved);
        assert_eq!(OptimizerState::Built.to_string(), "BUILT");
    }
}
