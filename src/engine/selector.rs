// ==========================================
// 资源分配优化器 - 模型选型
// ==========================================
// 按候选列表声明顺序逐个判定，取第一个 can_solve 的模型形式
// 全部不适用时在任何建模工作之前报错
// ==========================================

use crate::domain::graph::AllocationGraph;
use crate::engine::error::{BuildError, BuildResult};
use crate::engine::formulation::Formulation;
use tracing::{debug, info};

pub fn select<'a>(
    candidates: &'a [Box<dyn Formulation>],
    graph: &AllocationGraph,
) -> BuildResult<&'a dyn Formulation> {
    for candidate in candidates {
        if candidate.can_solve(graph) {
            info!(formulation = candidate.name(), "已选定模型形式");
            return Ok(candidate.as_ref());
        }
        debug!(formulation = candidate.name(), "模型形式不适用");
    }
    Err(BuildError::NoApplicableFormulation)
}
