// ==========================================
// 资源分配优化器 - 基础分配约束
// ==========================================
// 约束族:
// - req_r_a_b:  ALLOCATED_AMT = cost × ALLOCATED（整单服务，无部分服务）
// - cap_r_b:    Σ_a ALLOCATED_AMT ≤ 容量
// - fanin_a:    Σ_r ALLOCATED ≥ 扇入度 × PICKED（全部入链接满足才可计奖）
// - limit_p_a:  同一链接对同一活动至多一个资源被分配
// - nopick_a:   既无入弧又非容器的活动 PICKED = 0
// ==========================================

use crate::engine::error::BuildResult;
use crate::engine::features::{AmountMode, ModelContext};
use crate::engine::milp::{Constraint, LinearExpr, MilpProblem, Sense, VarKey};
use tracing::info;

/// 声明决策变量并生成基础约束（始终存在）
pub fn apply(ctx: &ModelContext<'_>, problem: &mut MilpProblem) -> BuildResult<bool> {
    let index = ctx.index;
    let rel = ctx.relations;

    // ===== 变量 =====
    for &(r, a) in &rel.arcs {
        problem.declare(VarKey::Allocated { r, a });
    }
    for a in 0..index.activities.len() {
        problem.declare(VarKey::Picked { a });
    }

    // ===== 需求量 =====
    if ctx.amount_mode == AmountMode::Variable {
        for &(r, a, b) in &rel.arc_budgets {
            let amt = VarKey::Amount { r, a, b };
            problem.declare(amt);

            let cost = index.cost(a, b).unwrap_or(0.0);
            let mut expr = LinearExpr::from_var(amt, 1.0);
            expr.add_term(VarKey::Allocated { r, a }, -cost);
            problem.add_constraint(Constraint::new(
                format!("req_r{}_a{}_b{}", r, a, b),
                expr,
                Sense::Eq,
                0.0,
            ));
        }
    }

    // ===== 容量 =====
    for &(r, b) in &rel.resource_budgets {
        let capacity = index.capacity(r, b).unwrap_or(0.0);
        let mut expr = LinearExpr::zero();
        for a in rel.arcs_on_budget(r, b) {
            match ctx.amount_mode {
                AmountMode::Variable => expr.add_term(VarKey::Amount { r, a, b }, 1.0),
                AmountMode::Implied => expr.add_term(
                    VarKey::Allocated { r, a },
                    index.cost(a, b).unwrap_or(0.0),
                ),
            }
        }
        problem.add_constraint(Constraint::new(
            format!("cap_r{}_b{}", r, b),
            expr,
            Sense::Le,
            capacity,
        ));
    }

    // ===== 扇入 =====
    let mut unreachable = 0usize;
    for a in 0..index.activities.len() {
        let pick = VarKey::Picked { a };
        let k = rel.fan_in[a];
        if k > 0 {
            let mut expr = LinearExpr::sum(rel.total_reverse[a].iter().map(|&r| VarKey::Allocated { r, a }));
            expr.add_term(pick, -(k as f64));
            problem.add_constraint(Constraint::new(format!("fanin_a{}", a), expr, Sense::Ge, 0.0));
        } else if !rel.is_container(a) {
            unreachable += 1;
            problem.add_constraint(Constraint::new(
                format!("nopick_a{}", a),
                LinearExpr::from_var(pick, 1.0),
                Sense::Le,
                0.0,
            ));
        }
    }

    // ===== 链接单次分配 =====
    for (&(p, a), r_ids) in &rel.reverse {
        let expr = LinearExpr::sum(r_ids.iter().map(|&r| VarKey::Allocated { r, a }));
        problem.add_constraint(Constraint::new(format!("limit_p{}_a{}", p, a), expr, Sense::Le, 1.0));
    }

    info!(
        arcs = rel.arcs.len(),
        req = problem.count_family("req_"),
        cap = problem.count_family("cap_"),
        fanin = problem.count_family("fanin_"),
        limit = problem.count_family("limit_"),
        unreachable,
        "基础分配约束生成完成"
    );

    Ok(true)
}
