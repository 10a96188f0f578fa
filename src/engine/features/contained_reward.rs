// ==========================================
// 资源分配优化器 - 包含奖励约束
// ==========================================
// 容器活动（自身不可被直接分配）只有在全部子活动被选中时才可计奖:
//   子活动数 × PICKED[容器] ≤ Σ PICKED[子活动]
// 单向约束：子活动不依赖容器
// ==========================================

use crate::engine::error::BuildResult;
use crate::engine::features::ModelContext;
use crate::engine::milp::{Constraint, LinearExpr, MilpProblem, Sense, VarKey};
use tracing::info;

pub fn apply(ctx: &ModelContext<'_>, problem: &mut MilpProblem) -> BuildResult<bool> {
    let containers = &ctx.relations.containers;
    if containers.is_empty() {
        info!("无包含奖励结构，跳过该约束族");
        return Ok(false);
    }

    for (&c, children) in containers {
        let mut expr = LinearExpr::from_var(VarKey::Picked { a: c }, children.len() as f64);
        for &child in children {
            expr.add_term(VarKey::Picked { a: child }, -1.0);
        }
        problem.add_constraint(Constraint::new(format!("contain_a{}", c), expr, Sense::Le, 0.0));
    }

    info!(containers = containers.len(), "包含奖励约束生成完成");
    Ok(true)
}
