// ==========================================
// 资源分配优化器 - 领域模型层
// ==========================================
// 职责: 输入分配图、生命周期/终止条件类型、输出结果、校验记录
// 红线: 不含建模逻辑,不含求解器调用
// ==========================================

pub mod graph;
pub mod output;
pub mod types;
pub mod validation;

// 重导出核心类型
pub use graph::{
    ActivityClass, ActivityInstance, ActivityInstanceGroup, AllocationConstraint, AllocationGraph,
    AllocationLink, AllocationRow, ContainsLink, ContainsRow, LinkRef, ResourceClass,
    ResourceInstance, ResourceInstanceGroup,
};
pub use output::{AllocatedAmounts, FullTrace, OptimizerOutput, TraceRow};
pub use types::{ConstraintKind, ContainmentSide, OptimizerState, TerminationCondition, WILDCARD};
pub use validation::ValidationIssue;
