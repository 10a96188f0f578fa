// ==========================================
// 资源分配优化器 - 生命周期编排
// ==========================================
// 状态: UNINGESTED -> INGESTED -> BUILT -> SOLVED
// - ingest:  校验并保存输入图，作废已有模型与结果
// - build:   模型选型 + 编译
// - solve:   外部求解（重试/超时/停滞终止）+ 结果解码
// - output:  读取结果
// 红线: 乱序调用不报错，自动补齐缺失的前置步骤
// ==========================================

mod core;
mod error;


pub use core::Optimizer;
pub use error::{OptimizerError, OptimizerResult};
