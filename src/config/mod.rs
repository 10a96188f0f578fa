// ==========================================
// 资源分配优化器 - 配置层
// ==========================================
// 职责: 求解器、重试、看门狗与工作目录配置
// 来源: 默认值 / JSON 文件 / ALLOC_OPT_* 环境变量
// ==========================================

pub mod optimizer_config;

pub use optimizer_config::{ConfigError, OptimizerConfig};
