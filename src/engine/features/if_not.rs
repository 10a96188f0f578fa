// ==========================================
// 资源分配优化器 - IF-NOT 互斥约束
// ==========================================
// 前提: 两条分配类链接引用同一资源类、不同活动类
// 对每个资源实例 r 与起点活动 a（及对称的终点活动）:
//   n × ALLOCATED[r,a] + Σ ALLOCATED[r,a'] ≤ n
// 其中 a' 为 r 在另一条链接上实际存在的弧，n 为其个数
// ==========================================

use crate::domain::types::ConstraintKind;
use crate::engine::error::{BuildError, BuildResult};
use crate::engine::features::ModelContext;
use crate::engine::milp::{Constraint, LinearExpr, MilpProblem, Sense, VarKey};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// (资源, 活动) -> 被禁止同时分配的活动
type PartnerMap = BTreeMap<(usize, usize), Vec<usize>>;

pub fn apply(ctx: &ModelContext<'_>, problem: &mut MilpProblem) -> BuildResult<bool> {
    let mut declared = ctx.constraints_of(ConstraintKind::IfNot).peekable();
    if declared.peek().is_none() {
        info!("未声明 IF-NOT 约束，跳过该约束族");
        return Ok(false);
    }

    let mut partners: PartnerMap = BTreeMap::new();
    for c in declared {
        if c.start.resource_class != c.end.resource_class {
            return Err(BuildError::IfNotResourceMismatch {
                start: c.start.resource_class.clone(),
                end: c.end.resource_class.clone(),
            });
        }
        if c.start.activity_class == c.end.activity_class {
            return Err(BuildError::IfNotSameActivityClass(c.start.activity_class.clone()));
        }

        let start_arcs = &ctx.relations.link_arcs[ctx.link_id(&c.start)?];
        let end_arcs = &ctx.relations.link_arcs[ctx.link_id(&c.end)?];
        link_partners(&mut partners, start_arcs, end_arcs);
        link_partners(&mut partners, end_arcs, start_arcs);

        debug!(start = %c.start, end = %c.end, "IF-NOT 约束已展开");
    }

    let mut emitted = 0usize;
    for (&(r, a), others) in &partners {
        if others.is_empty() {
            continue;
        }
        let n = others.len() as f64;
        let mut expr = LinearExpr::from_var(VarKey::Allocated { r, a }, n);
        for &other in others {
            expr.add_term(VarKey::Allocated { r, a: other }, 1.0);
        }
        problem.add_constraint(Constraint::new(format!("ifnot_r{}_a{}", r, a), expr, Sense::Le, n));
        emitted += 1;
    }

    info!(constraints = emitted, "IF-NOT 约束生成完成");
    Ok(true)
}

/// 对 from 中每条弧 (r,a)，收集 to 中同一资源的活动
fn link_partners(partners: &mut PartnerMap, from: &[(usize, usize)], to: &[(usize, usize)]) {
    for &(r, a) in from {
        let entry = partners.entry((r, a)).or_default();
        for &(r2, a2) in to {
            if r2 == r && a2 != a && !entry.contains(&a2) {
                entry.push(a2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_partners_symmetric() {
        let start = vec![(0, 0), (0, 1), (1, 0)];
        let end = vec![(0, 2), (1, 3)];
        let mut partners = BTreeMap::new();
        link_partners(&mut partners, &start, &end);
        link_partners(&mut partners, &end, &start);

        assert_eq!(partners[&(0, 0)], vec![2]);
        assert_eq!(partners[&(0, 1)], vec![2]);
        assert_eq!(partners[&(1, 0)], vec![3]);
        assert_eq!(partners[&(0, 2)], vec![0, 1]);
        assert_eq!(partners[&(1, 3)], vec![0]);
    }
}
