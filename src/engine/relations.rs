// ==========================================
// 资源分配优化器 - 关系解析器
// ==========================================
// 职责: 展开分配类链接（含通配符 ALL）为具体的 资源-活动 弧，
//       并计算派生查找表
// 红线: 展开在任何约束生成之前一次性完成，不在约束生成中惰性展开
// ==========================================
// 输出:
// - arcs: (资源, 活动) 弧，按首次出现顺序
// - arc_budgets: (资源, 活动, 预算)，资源容量维度与活动需求维度的交集
// - possible / reverse / total_reverse: 正向/反向分配查找
// - fan_in: 每个活动被多少条不同分配类链接覆盖
// - containers: 参与包含奖励的容器活动 -> 子活动
// ==========================================

use crate::domain::graph::AllocationGraph;
use crate::domain::types::ContainmentSide;
use crate::engine::error::{BuildError, BuildResult};
use crate::engine::index::GraphIndex;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relations {
    pub arcs: Vec<(usize, usize)>,
    arc_set: HashSet<(usize, usize)>,

    pub arc_budgets: Vec<(usize, usize, usize)>,
    arc_budget_set: HashSet<(usize, usize, usize)>,

    /// 至少有一条带预算弧的 (资源, 预算)
    pub resource_budgets: Vec<(usize, usize)>,

    /// 资源 id -> 可能分配到的活动
    pub possible: Vec<Vec<usize>>,

    /// (链接 id, 活动 id) -> 可经该链接满足此活动的资源
    pub reverse: BTreeMap<(usize, usize), Vec<usize>>,

    /// 活动 id -> 全部可能的来源资源（各链接并集）
    pub total_reverse: Vec<Vec<usize>>,

    /// 活动 id -> 扇入度
    pub fan_in: Vec<usize>,

    /// 链接 id -> 该链接展开出的弧
    pub link_arcs: Vec<Vec<(usize, usize)>>,

    /// 不可直接分配的容器活动 -> 子活动
    pub containers: BTreeMap<usize, Vec<usize>>,
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

impl Relations {
    /// 解析全部关系
    ///
    /// # 参数
    /// - graph: 冻结的输入图快照
    /// - index: 同一快照上构建的索引
    pub fn resolve(graph: &AllocationGraph, index: &GraphIndex) -> BuildResult<Self> {
        info!("开始解析资源-活动关系");

        let mut rel = Relations {
            possible: vec![Vec::new(); index.resources.len()],
            total_reverse: vec![Vec::new(); index.activities.len()],
            fan_in: vec![0; index.activities.len()],
            link_arcs: vec![Vec::new(); index.links.len()],
            ..Default::default()
        };
        let mut resource_budget_set: HashSet<(usize, usize)> = HashSet::new();

        for (p, link) in graph.allocation_instances.iter().enumerate() {
            let link_name = link.link_name();
            if graph.resource_class(&link.resource_class_name).is_none() {
                return Err(BuildError::UnknownResourceClass(link.resource_class_name.clone()));
            }
            if graph.activity_class(&link.activity_class_name).is_none() {
                return Err(BuildError::UnknownActivityClass(link.activity_class_name.clone()));
            }
            let all_r = index.resources_of_class(&link.resource_class_name);
            let all_a = index.activities_of_class(&link.activity_class_name);
            let mut link_seen: HashSet<(usize, usize)> = HashSet::new();

            for row in &link.instance_table {
                let r_ids: Vec<usize> = if row.resource_is_wildcard() {
                    all_r.to_vec()
                } else {
                    let r = index.resources.id(&row.resource_instance_name).ok_or_else(|| {
                        BuildError::UnknownResourceInstance {
                            link: link_name.clone(),
                            name: row.resource_instance_name.clone(),
                        }
                    })?;
                    if index.resource_class(r) != link.resource_class_name {
                        return Err(BuildError::InstanceClassMismatch {
                            link: link_name.clone(),
                            class: link.resource_class_name.clone(),
                            name: row.resource_instance_name.clone(),
                        });
                    }
                    vec![r]
                };

                let a_ids: Vec<usize> = if row.activity_is_wildcard() {
                    all_a.to_vec()
                } else {
                    let a = index.activities.id(&row.activity_instance_name).ok_or_else(|| {
                        BuildError::UnknownActivityInstance {
                            link: link_name.clone(),
                            name: row.activity_instance_name.clone(),
                        }
                    })?;
                    if index.activity_class(a) != link.activity_class_name {
                        return Err(BuildError::InstanceClassMismatch {
                            link: link_name.clone(),
                            class: link.activity_class_name.clone(),
                            name: row.activity_instance_name.clone(),
                        });
                    }
                    vec![a]
                };

                for &r in &r_ids {
                    for &a in &a_ids {
                        if link_seen.insert((r, a)) {
                            rel.link_arcs[p].push((r, a));
                        }
                        if rel.arc_set.insert((r, a)) {
                            rel.arcs.push((r, a));
                        }
                        push_unique(&mut rel.possible[r], a);
                        push_unique(rel.reverse.entry((p, a)).or_default(), r);

                        for (b, _) in index.resource_budgets(r) {
                            if index.cost(a, b).is_none() {
                                continue;
                            }
                            if rel.arc_budget_set.insert((r, a, b)) {
                                rel.arc_budgets.push((r, a, b));
                            }
                            if resource_budget_set.insert((r, b)) {
                                rel.resource_budgets.push((r, b));
                            }
                        }
                    }
                }
            }
        }

        // 扇入度与反向并集
        for (&(_, a), r_ids) in &rel.reverse {
            rel.fan_in[a] += 1;
            for &r in r_ids {
                push_unique(&mut rel.total_reverse[a], r);
            }
        }

        rel.containers = resolve_containers(graph, index)?;

        debug!(
            arcs = rel.arcs.len(),
            arc_budgets = rel.arc_budgets.len(),
            resource_budgets = rel.resource_budgets.len(),
            link_activity_pairs = rel.reverse.len(),
            containers = rel.containers.len(),
            "关系解析完成"
        );

        Ok(rel)
    }

    pub fn has_arc(&self, r: usize, a: usize) -> bool {
        self.arc_set.contains(&(r, a))
    }

    /// 某 (资源, 预算) 上可能流出的弧
    pub fn arcs_on_budget(&self, r: usize, b: usize) -> impl Iterator<Item = usize> + '_ {
        self.possible[r]
            .iter()
            .copied()
            .filter(move |&a| self.has_arc_budget(r, a, b))
    }

    pub fn has_arc_budget(&self, r: usize, a: usize, b: usize) -> bool {
        self.arc_budget_set.contains(&(r, a, b))
    }

    pub fn is_container(&self, a: usize) -> bool {
        self.containers.contains_key(&a)
    }
}

/// 包含奖励的容器：父类为活动、且父类不出现在任何资源类的可分配列表中
fn resolve_containers(
    graph: &AllocationGraph,
    index: &GraphIndex,
) -> BuildResult<BTreeMap<usize, Vec<usize>>> {
    let mut containers: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    for link in &graph.contains_instances {
        if link.parent_type != ContainmentSide::Activity {
            continue;
        }
        if graph.is_activity_class_allocatable(&link.parent_class_name) {
            debug!(
                parent = %link.parent_class_name,
                child = %link.child_class_name,
                "容器活动类可被直接分配，不参与包含奖励"
            );
            continue;
        }

        for row in &link.instance_table {
            let lookup = |name: &str| {
                index
                    .activities
                    .id(name)
                    .ok_or_else(|| BuildError::UnknownContainedInstance {
                        side: ContainmentSide::Activity,
                        name: name.to_string(),
                    })
            };
            let parent = lookup(&row.parent_instance_name)?;
            let child = lookup(&row.child_instance_name)?;
            push_unique(containers.entry(parent).or_default(), child);
        }
    }

    Ok(containers)
}
