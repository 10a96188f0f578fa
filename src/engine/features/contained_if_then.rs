// ==========================================
// 资源分配优化器 - Contained IF-THEN 层级使能约束
// ==========================================
// 终点分配 (r₂→a₂) 只有在某个起点分配 (r₁→a₁) 成立时才允许，
// 且 r₁ 与 r₂、a₁ 与 a₂ 分别在资源/活动两侧共享同一个共同祖先实例:
//   ALLOCATED[r₂,a₂] ≤ Σ ALLOCATED[r₁,a₁]
// 起止活动类中零奖励的活动，PICKED 与扇入满足情况严格相等，
// 使其分配出现在输出中而不影响目标值
// ==========================================

use crate::domain::types::{ConstraintKind, ContainmentSide};
use crate::engine::error::{BuildError, BuildResult};
use crate::engine::features::{ModelContext, ParsedConstraint};
use crate::engine::hierarchy::{end_to_start_map, nearest_common_ancestor};
use crate::engine::index::IdTable;
use crate::engine::milp::{Constraint, LinearExpr, MilpProblem, Sense, VarKey};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info};

pub fn apply(ctx: &ModelContext<'_>, problem: &mut MilpProblem) -> BuildResult<bool> {
    let declared: Vec<&ParsedConstraint> = ctx.constraints_of(ConstraintKind::ContainedIfThen).collect();
    if declared.is_empty() {
        info!("未声明 Contained IF-THEN 约束，跳过该约束族");
        return Ok(false);
    }

    let mut gated_classes: BTreeSet<&str> = BTreeSet::new();
    let mut emitted = 0usize;

    for c in declared {
        let start_link = ctx.link_id(&c.start)?;
        let end_link = ctx.link_id(&c.end)?;

        let containing = containing_allocations(ctx, c, start_link, end_link)?;
        for ((r, a), starts) in containing {
            let mut expr = LinearExpr::from_var(VarKey::Allocated { r, a }, 1.0);
            for (sr, sa) in starts {
                expr.add_term(VarKey::Allocated { r: sr, a: sa }, -1.0);
            }
            problem.add_constraint(Constraint::new(
                format!("ifthen{}_r{}_a{}", c.position, r, a),
                expr,
                Sense::Le,
                0.0,
            ));
            emitted += 1;
        }

        gated_classes.insert(c.start.activity_class.as_str());
        gated_classes.insert(c.end.activity_class.as_str());
    }

    // 零奖励活动：PICKED 严格跟踪扇入满足
    let index = ctx.index;
    let rel = ctx.relations;
    let mut zero_reward = 0usize;
    for a in 0..index.activities.len() {
        if index.reward(a) != 0.0 || rel.fan_in[a] == 0 {
            continue;
        }
        if !gated_classes.contains(index.activity_class(a)) {
            continue;
        }
        let mut expr = LinearExpr::sum(rel.total_reverse[a].iter().map(|&r| VarKey::Allocated { r, a }));
        expr.add_term(VarKey::Picked { a }, -(rel.fan_in[a] as f64));
        problem.add_constraint(Constraint::new(format!("zr_a{}", a), expr, Sense::Eq, 0.0));
        zero_reward += 1;
    }

    info!(constraints = emitted, zero_reward, "Contained IF-THEN 约束生成完成");
    Ok(true)
}

/// 终点弧 -> 可使能它的起点弧
fn containing_allocations(
    ctx: &ModelContext<'_>,
    c: &ParsedConstraint,
    start_link: usize,
    end_link: usize,
) -> BuildResult<BTreeMap<(usize, usize), Vec<(usize, usize)>>> {
    let graph = ctx.graph;
    let index = ctx.index;

    let res_common = nearest_common_ancestor(
        graph,
        ContainmentSide::Resource,
        &c.start.resource_class,
        &c.end.resource_class,
    )
    .ok_or_else(|| BuildError::MissingCommonAncestor {
        side: ContainmentSide::Resource,
        start: c.start.resource_class.clone(),
        end: c.end.resource_class.clone(),
    })?;
    let act_common = nearest_common_ancestor(
        graph,
        ContainmentSide::Activity,
        &c.start.activity_class,
        &c.end.activity_class,
    )
    .ok_or_else(|| BuildError::MissingCommonAncestor {
        side: ContainmentSide::Activity,
        start: c.start.activity_class.clone(),
        end: c.end.activity_class.clone(),
    })?;

    debug!(
        start = %c.start,
        end = %c.end,
        resource_ancestor = %res_common,
        activity_ancestor = %act_common,
        "找到共同祖先类"
    );

    let r_map = to_ids(
        &end_to_start_map(
            graph,
            ContainmentSide::Resource,
            &res_common,
            &c.start.resource_class,
            &c.end.resource_class,
        ),
        &index.resources,
    );
    let a_map = to_ids(
        &end_to_start_map(
            graph,
            ContainmentSide::Activity,
            &act_common,
            &c.start.activity_class,
            &c.end.activity_class,
        ),
        &index.activities,
    );

    let start_arcs: HashSet<(usize, usize)> = ctx.relations.link_arcs[start_link].iter().copied().collect();
    let mut result = BTreeMap::new();

    for &(r, a) in &ctx.relations.link_arcs[end_link] {
        let empty = Vec::new();
        let start_rs = r_map.get(&r).unwrap_or(&empty);
        let start_as = a_map.get(&a).unwrap_or(&empty);

        let mut starts = Vec::new();
        for &sr in start_rs {
            for &sa in start_as {
                if start_arcs.contains(&(sr, sa)) && !starts.contains(&(sr, sa)) {
                    starts.push((sr, sa));
                }
            }
        }
        result.insert((r, a), starts);
    }

    Ok(result)
}

fn to_ids(map: &BTreeMap<String, Vec<String>>, table: &IdTable) -> BTreeMap<usize, Vec<usize>> {
    map.iter()
        .filter_map(|(end, starts)| {
            let end_id = table.id(end)?;
            let start_ids = starts.iter().filter_map(|s| table.id(s)).collect();
            Some((end_id, start_ids))
        })
        .collect()
}
