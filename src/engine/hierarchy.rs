// ==========================================
// 资源分配优化器 - 包含层级查询
// ==========================================
// 职责: 类层级向上广度优先追溯、最近共同祖先类、实例层级向下深度搜索
// 用途: Contained IF-THEN 约束的起止实例映射
// ==========================================

use crate::domain::graph::AllocationGraph;
use crate::domain::types::ContainmentSide;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// 从某类出发，沿包含关系向上的广度优先追溯（首元素为该类本身）
pub fn hierarchy_trace(graph: &AllocationGraph, side: ContainmentSide, class_name: &str) -> Vec<String> {
    let mut queue = VecDeque::from([class_name.to_string()]);
    let mut seen: HashSet<String> = HashSet::new();
    let mut trace = Vec::new();

    while let Some(class) = queue.pop_front() {
        if !seen.insert(class.clone()) {
            continue;
        }
        for link in graph
            .contains_instances
            .iter()
            .filter(|l| l.parent_type == side && l.child_class_name == class)
        {
            queue.push_back(link.parent_class_name.clone());
        }
        trace.push(class);
    }

    trace
}

/// 起止两类的最近共同祖先类：终点追溯序列中第一个也出现在起点追溯中的类
pub fn nearest_common_ancestor(
    graph: &AllocationGraph,
    side: ContainmentSide,
    start_class: &str,
    end_class: &str,
) -> Option<String> {
    let start_trace: HashSet<String> = hierarchy_trace(graph, side, start_class).into_iter().collect();
    hierarchy_trace(graph, side, end_class)
        .into_iter()
        .find(|class| start_trace.contains(class))
}

// ==========================================
// ChildAdjacency - 实例级父 -> 子邻接表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ChildAdjacency {
    children: HashMap<String, Vec<String>>,
}

impl ChildAdjacency {
    pub fn new(graph: &AllocationGraph, side: ContainmentSide) -> Self {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for link in graph.contains_instances.iter().filter(|l| l.parent_type == side) {
            for row in &link.instance_table {
                children
                    .entry(row.parent_instance_name.clone())
                    .or_default()
                    .push(row.child_instance_name.clone());
            }
        }
        Self { children }
    }

    /// 从 root 向下深度搜索，返回落在 candidates 中的实例（含 root 本身）
    pub fn descendants_in(&self, root: &str, candidates: &HashSet<&str>) -> Vec<String> {
        let mut stack = vec![root.to_string()];
        let mut visited: HashSet<String> = HashSet::new();
        let mut found = Vec::new();

        while let Some(vertex) = stack.pop() {
            if !visited.insert(vertex.clone()) {
                continue;
            }
            if candidates.contains(vertex.as_str()) {
                found.push(vertex.clone());
            }
            if let Some(next) = self.children.get(&vertex) {
                stack.extend(next.iter().cloned());
            }
        }

        found
    }
}

/// 终点实例 -> 与其共享共同祖先实例的起点实例集合
///
/// 对共同祖先类的每个实例，分别向下找出起点类与终点类的后代实例并两两关联；
/// 同一终点实例挂在多个祖先实例下时取并集
pub fn end_to_start_map(
    graph: &AllocationGraph,
    side: ContainmentSide,
    common_class: &str,
    start_class: &str,
    end_class: &str,
) -> BTreeMap<String, Vec<String>> {
    let names_of = |class: &str| -> Vec<&str> {
        match side {
            ContainmentSide::Resource => graph.resource_instance_names(class),
            ContainmentSide::Activity => graph.activity_instance_names(class),
        }
    };

    let start_set: HashSet<&str> = names_of(start_class).into_iter().collect();
    let end_set: HashSet<&str> = names_of(end_class).into_iter().collect();
    let adjacency = ChildAdjacency::new(graph, side);

    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for parent in names_of(common_class) {
        let starts = adjacency.descendants_in(parent, &start_set);
        let ends = adjacency.descendants_in(parent, &end_set);
        for end in ends {
            let entry = map.entry(end).or_default();
            for start in &starts {
                if !entry.contains(start) {
                    entry.push(start.clone());
                }
            }
        }
    }

    map
}
