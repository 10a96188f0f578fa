// ==========================================
// 资源分配优化器 - 建模错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 均为配置错误，出现即中止建模，并携带出错标识
// ==========================================

use crate::domain::types::ContainmentSide;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    // ===== 索引相关 =====
    #[error("实例重复声明 (类 {class}): {name}")]
    DuplicateInstance { class: String, name: String },

    #[error("分配类链接重复声明: {0}")]
    DuplicateLink(String),

    #[error("未知资源类: {0}")]
    UnknownResourceClass(String),

    #[error("未知活动类: {0}")]
    UnknownActivityClass(String),

    #[error("未知资源实例 (链接 {link}): {name}")]
    UnknownResourceInstance { link: String, name: String },

    #[error("未知活动实例 (链接 {link}): {name}")]
    UnknownActivityInstance { link: String, name: String },

    #[error("实例 {name} 不属于类 {class} (链接 {link})")]
    InstanceClassMismatch {
        link: String,
        class: String,
        name: String,
    },

    #[error("未声明的预算维度 (实例 {instance}): {budget}")]
    UnknownBudget { instance: String, budget: String },

    // ===== 分配约束相关 =====
    #[error("未知分配约束类型: {0}")]
    UnknownConstraintType(String),

    #[error("分配约束引用了不存在的分配类链接: {0}")]
    MissingAllocationLink(String),

    #[error("IF-NOT 约束的起止资源类必须相同: {start} / {end}")]
    IfNotResourceMismatch { start: String, end: String },

    #[error("IF-NOT 约束的起止活动类不能相同: {0}")]
    IfNotSameActivityClass(String),

    #[error("Contained IF-THEN 约束在{side}侧没有共同祖先类: {start} / {end}")]
    MissingCommonAncestor {
        side: ContainmentSide,
        start: String,
        end: String,
    },

    #[error("包含关系引用了未知实例 ({side}): {name}")]
    UnknownContainedInstance { side: ContainmentSide, name: String },

    // ===== 模型选型 =====
    #[error("没有可求解该输入的模型形式")]
    NoApplicableFormulation,
}

/// Result 类型别名
pub type BuildResult<T> = Result<T, BuildError>;
