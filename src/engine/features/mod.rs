// ==========================================
// 资源分配优化器 - 约束生成器
// ==========================================
// 职责: 按输入图中实际存在的结构特性生成约束族
// - base:              基础分配（始终存在）
// - contained_reward:  包含奖励（存在不可分配的容器活动时）
// - if_not:            互斥约束（声明 IF-NOT 时）
// - contained_if_then: 层级使能约束（声明 Contained IF-THEN 时）
// 约定: 特性不存在返回 Ok(false)，真正的配置错误返回 Err
// ==========================================

pub mod base;
pub mod contained_if_then;
pub mod contained_reward;
pub mod if_not;

use crate::domain::graph::{AllocationGraph, LinkRef};
use crate::domain::types::ConstraintKind;
use crate::engine::error::{BuildError, BuildResult};
use crate::engine::index::GraphIndex;
use crate::engine::relations::Relations;

/// 分配数量的建模方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountMode {
    /// 显式连续变量 ALLOCATED_AMT = cost × ALLOCATED
    Variable,
    /// 不建连续变量，容量约束直接写在 ALLOCATED 上
    Implied,
}

/// 已解析的分配约束
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConstraint {
    /// 在输入中的序号（用于约束命名）
    pub position: usize,
    pub kind: ConstraintKind,
    pub start: LinkRef,
    pub end: LinkRef,
}

/// 解析全部分配约束类型；未知类型为配置错误
pub fn parse_constraints(graph: &AllocationGraph) -> BuildResult<Vec<ParsedConstraint>> {
    graph
        .allocation_constraints
        .iter()
        .enumerate()
        .map(|(position, c)| {
            let kind = c
                .allocation_constraint_type
                .parse::<ConstraintKind>()
                .map_err(|_| BuildError::UnknownConstraintType(c.allocation_constraint_type.clone()))?;
            Ok(ParsedConstraint {
                position,
                kind,
                start: c.allocation_start.clone(),
                end: c.allocation_end.clone(),
            })
        })
        .collect()
}

/// 约束生成共享上下文（构建期间只读）
pub struct ModelContext<'a> {
    pub graph: &'a AllocationGraph,
    pub index: &'a GraphIndex,
    pub relations: &'a Relations,
    pub constraints: &'a [ParsedConstraint],
    pub amount_mode: AmountMode,
}

impl<'a> ModelContext<'a> {
    pub fn constraints_of(&self, kind: ConstraintKind) -> impl Iterator<Item = &'a ParsedConstraint> {
        let constraints: &'a [ParsedConstraint] = self.constraints;
        constraints.iter().filter(move |c| c.kind == kind)
    }

    /// 按 (资源类, 活动类) 找到分配类链接 id
    pub fn link_id(&self, link: &LinkRef) -> BuildResult<usize> {
        self.index
            .link_id(link)
            .ok_or_else(|| BuildError::MissingAllocationLink(link.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::AllocationConstraint;

    #[test]
    fn test_parse_constraints() {
        let graph = AllocationGraph {
            allocation_constraints: vec![
                AllocationConstraint {
                    allocation_start: LinkRef::new("Bag", "Food"),
                    allocation_end: LinkRef::new("Bag", "Cleaner"),
                    allocation_constraint_type: "IF-NOT".to_string(),
                },
                AllocationConstraint {
                    allocation_start: LinkRef::new("Turret", "City"),
                    allocation_end: LinkRef::new("Missile", "VIP"),
                    allocation_constraint_type: "Contained IF-THEN".to_string(),
                },
            ],
            ..Default::default()
        };

        let parsed = parse_constraints(&graph).unwrap();
        assert_eq!(parsed[0].kind, ConstraintKind::IfNot);
        assert_eq!(parsed[1].kind, ConstraintKind::ContainedIfThen);
        assert_eq!(parsed[1].position, 1);
    }

    #[test]
    fn test_unknown_constraint_type() {
        let graph = AllocationGraph {
            allocation_constraints: vec![AllocationConstraint {
                allocation_start: LinkRef::new("Bag", "Food"),
                allocation_end: LinkRef::new("Bag", "Cleaner"),
                allocation_constraint_type: "IF-MAYBE".to_string(),
            }],
            ..Default::default()
        };

        let err = parse_constraints(&graph).unwrap_err();
        assert_eq!(err, BuildError::UnknownConstraintType("IF-MAYBE".to_string()));
    }
}
