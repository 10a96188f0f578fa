// ==========================================
// 资源分配优化器 - 引擎层（模型编译器）
// ==========================================
// 流程: 索引 -> 关系解析 -> 约束生成 -> 目标函数 -> (求解) -> 结果解码
// 红线: 建模全程同步、确定性；配置错误立即中止并携带出错标识
// ==========================================

pub mod error;
pub mod extractor;
pub mod features;
pub mod formulation;
pub mod hierarchy;
pub mod index;
pub mod milp;
pub mod relations;
pub mod selector;

#[cfg(test)]
pub(crate) mod test_support;

// 重导出核心类型
pub use error::{BuildError, BuildResult};
pub use extractor::extract;
pub use features::AmountMode;
pub use formulation::{
    default_formulations, BuiltModel, Formulation, GeneralFormulation, UnitCapacityFormulation,
};
pub use index::GraphIndex;
pub use milp::{MilpProblem, VarKey};
pub use relations::Relations;
pub use selector::select;
