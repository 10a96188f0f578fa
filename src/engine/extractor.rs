// ==========================================
// 资源分配优化器 - 结果解码
// ==========================================
// 职责: 把求解器的变量取值还原为按名称组织的分配结果
// - 全量轨迹: 每条候选弧一行（无论是否选中）
// - 选中弧: ALLOCATED 与所属活动 PICKED 同时为真
// - 单位容量形式没有 ALLOCATED_AMT 变量，数量按 cost × ALLOCATED 还原
// ==========================================

use crate::domain::output::{AllocatedAmounts, FullTrace, OptimizerOutput};
use crate::engine::features::AmountMode;
use crate::engine::formulation::BuiltModel;
use crate::engine::milp::VarKey;
use crate::solver::backend::Solution;
use std::collections::BTreeMap;
use tracing::info;

const AMOUNT_EPS: f64 = 1e-9;

pub fn extract(model: &BuiltModel, solution: &Solution, attempts: u32) -> OptimizerOutput {
    let index = &model.index;
    let rel = &model.relations;
    let budget_count = index.budgets.len();

    let mut trace = FullTrace::new(index.budgets.names().to_vec());
    let mut allocations: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut allocated_amt: AllocatedAmounts = BTreeMap::new();
    let mut per_resource_score: BTreeMap<String, f64> = BTreeMap::new();
    let mut per_resource_budget_used: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();

    for &(r, a) in &rel.arcs {
        let r_name = index.resources.name(r);
        let a_name = index.activities.name(a);
        let allocated = solution.is_set(&VarKey::Allocated { r, a });
        let picked = solution.is_set(&VarKey::Picked { a });
        let selected = allocated && picked;
        let reward = index.reward(a);

        let mut budget_used = vec![0.0; budget_count];
        for (b, used) in budget_used.iter_mut().enumerate() {
            if !rel.has_arc_budget(r, a, b) {
                continue;
            }
            *used = match model.amount_mode {
                AmountMode::Variable => solution.value(&VarKey::Amount { r, a, b }),
                AmountMode::Implied if allocated => index.cost(a, b).unwrap_or(0.0),
                AmountMode::Implied => 0.0,
            };
            if used.abs() > AMOUNT_EPS {
                allocated_amt
                    .entry(r_name.to_string())
                    .or_default()
                    .entry(a_name.to_string())
                    .or_default()
                    .insert(index.budgets.name(b).to_string(), *used);
            }
        }

        if selected {
            allocations.entry(r_name.to_string()).or_default().push(a_name.to_string());
            *per_resource_score.entry(r_name.to_string()).or_default() += reward;
            let used_by_resource = per_resource_budget_used.entry(r_name.to_string()).or_default();
            for (b, used) in budget_used.iter().enumerate() {
                if rel.has_arc_budget(r, a, b) {
                    *used_by_resource.entry(index.budgets.name(b).to_string()).or_default() += used;
                }
            }
        }

        trace.push(r_name, a_name, budget_used, reward, selected, picked, allocated);
    }

    let objective_value = solution.objective.unwrap_or_else(|| {
        (0..index.activities.len())
            .filter(|&a| solution.is_set(&VarKey::Picked { a }))
            .map(|a| index.reward(a))
            .sum()
    });

    info!(
        objective = objective_value,
        selected = allocations.values().map(Vec::len).sum::<usize>(),
        trace_rows = trace.len(),
        "结果解码完成"
    );

    OptimizerOutput {
        objective_value,
        allocations,
        full_trace: trace,
        allocated_amt,
        per_resource_score,
        per_resource_budget_used,
        termination: solution.termination,
        formulation: model.formulation.to_string(),
        attempts,
    }
}
