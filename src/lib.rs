// ==========================================
// 资源分配优化器 - 核心库
// ==========================================
// 定位: 资源 -> 活动分配问题的 MILP 模型编译器 + 求解生命周期
// 流程: 导入 -> 选型 -> 建模 -> 外部求解 -> 结果解码
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 输入图、输出与基础类型
pub mod domain;

// 输入层 - 图来源与结构校验
pub mod importer;

// 引擎层 - 模型编译
pub mod engine;

// 求解器层 - 外部 MILP 求解
pub mod solver;

// 编排层 - 生命周期状态机
pub mod optimizer;

// 配置层
pub mod config;

// 日志系统
pub mod logging;

// 性能统计与操作历史
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AllocationGraph, FullTrace, OptimizerOutput, OptimizerState, TerminationCondition,
    ValidationIssue,
};

// 引擎
pub use engine::{BuildError, BuiltModel, Formulation, GeneralFormulation, UnitCapacityFormulation};

// 求解器
pub use solver::{GlpkSolver, Solution, SolverBackend, SolverError};

// 编排
pub use config::OptimizerConfig;
pub use optimizer::{Optimizer, OptimizerError, OptimizerResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "资源分配优化器";
