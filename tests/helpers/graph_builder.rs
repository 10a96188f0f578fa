// ==========================================
// 输入图构建器 - 用于集成测试
// ==========================================

use allocation_optimizer::domain::graph::*;
use allocation_optimizer::domain::types::{ContainmentSide, WILDCARD};
use std::collections::BTreeMap;

fn amounts(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ==========================================
// GraphBuilder
// ==========================================

#[derive(Default)]
pub struct GraphBuilder {
    graph: AllocationGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 资源类：预算维度 + 可分配到的活动类
    pub fn resource_class(mut self, name: &str, budgets: &[&str], targets: &[&str]) -> Self {
        self.graph.resource_classes.push(ResourceClass {
            class_name: name.to_string(),
            budgets: strings(budgets),
            contains_classes: Vec::new(),
            can_be_allocated_to_classes: strings(targets),
        });
        self
    }

    /// 仅作为层级容器的资源类
    pub fn resource_container_class(mut self, name: &str, children: &[&str]) -> Self {
        self.graph.resource_classes.push(ResourceClass {
            class_name: name.to_string(),
            contains_classes: strings(children),
            ..Default::default()
        });
        self
    }

    pub fn activity_class(mut self, name: &str, costs: &[&str]) -> Self {
        self.graph.activity_classes.push(ActivityClass {
            class_name: name.to_string(),
            costs: strings(costs),
            rewards: strings(&["value"]),
            contains_classes: Vec::new(),
        });
        self
    }

    /// 包含其他活动类的活动类
    pub fn activity_container_class(mut self, name: &str, children: &[&str]) -> Self {
        self.graph.activity_classes.push(ActivityClass {
            class_name: name.to_string(),
            rewards: strings(&["value"]),
            contains_classes: strings(children),
            ..Default::default()
        });
        self
    }

    pub fn resource(mut self, class: &str, name: &str, budget: &[(&str, f64)]) -> Self {
        let instance = ResourceInstance {
            instance_name: name.to_string(),
            budget: amounts(budget),
        };
        match self.graph.resource_instances.iter_mut().find(|g| g.class_name == class) {
            Some(group) => group.instance_table.push(instance),
            None => self.graph.resource_instances.push(ResourceInstanceGroup {
                class_name: class.to_string(),
                instance_table: vec![instance],
            }),
        }
        self
    }

    pub fn activity(mut self, class: &str, name: &str, cost: &[(&str, f64)], reward: f64) -> Self {
        let instance = ActivityInstance {
            instance_name: name.to_string(),
            cost: amounts(cost),
            reward,
        };
        match self.graph.activity_instances.iter_mut().find(|g| g.class_name == class) {
            Some(group) => group.instance_table.push(instance),
            None => self.graph.activity_instances.push(ActivityInstanceGroup {
                class_name: class.to_string(),
                instance_table: vec![instance],
            }),
        }
        self
    }

    /// 分配链接（具体行，可含 ALL）
    pub fn link(mut self, resource_class: &str, activity_class: &str, rows: &[(&str, &str)]) -> Self {
        self.graph.allocation_instances.push(AllocationLink {
            resource_class_name: resource_class.to_string(),
            activity_class_name: activity_class.to_string(),
            instance_table: rows.iter().map(|(r, a)| AllocationRow::new(r, a)).collect(),
        });
        self
    }

    /// 无条件链接 (ALL, ALL)
    pub fn link_all(self, resource_class: &str, activity_class: &str) -> Self {
        self.link(resource_class, activity_class, &[(WILDCARD, WILDCARD)])
    }

    pub fn contains(
        mut self,
        side: ContainmentSide,
        parent_class: &str,
        child_class: &str,
        rows: &[(&str, &str)],
    ) -> Self {
        self.graph.contains_instances.push(ContainsLink {
            parent_class_name: parent_class.to_string(),
            child_class_name: child_class.to_string(),
            parent_type: side,
            instance_table: rows
                .iter()
                .map(|(p, c)| ContainsRow {
                    parent_instance_name: p.to_string(),
                    child_instance_name: c.to_string(),
                })
                .collect(),
        });
        self
    }

    pub fn if_not(self, start: (&str, &str), end: (&str, &str)) -> Self {
        self.constraint(start, end, "IF-NOT")
    }

    pub fn contained_if_then(self, start: (&str, &str), end: (&str, &str)) -> Self {
        self.constraint(start, end, "Contained IF-THEN")
    }

    fn constraint(mut self, start: (&str, &str), end: (&str, &str), kind: &str) -> Self {
        self.graph.allocation_constraints.push(AllocationConstraint {
            allocation_start: LinkRef::new(start.0, start.1),
            allocation_end: LinkRef::new(end.0, end.1),
            allocation_constraint_type: kind.to_string(),
        });
        self
    }

    pub fn build(self) -> AllocationGraph {
        self.graph
    }
}

// ==========================================
// 常用场景
// ==========================================

/// 一个资源 {money:1}、一个活动 {money:1} 奖励 1、一条无条件链接
pub fn single_pair_graph() -> AllocationGraph {
    GraphBuilder::new()
        .resource_class("Wallet", &["money"], &["Item"])
        .activity_class("Item", &["money"])
        .resource("Wallet", "wallet", &[("money", 1.0)])
        .activity("Item", "item", &[("money", 1.0)], 1.0)
        .link_all("Wallet", "Item")
        .build()
}

/// 两个资源各自经由一条链接满足活动的一个预算维度（扇入 2）
pub fn fan_in_graph(people_capacity: f64) -> AllocationGraph {
    GraphBuilder::new()
        .resource_class("Funding", &["money"], &["Startup"])
        .resource_class("Staff", &["people"], &["Startup"])
        .activity_class("Startup", &["money", "people"])
        .resource("Funding", "fund", &[("money", 1.0)])
        .resource("Staff", "team", &[("people", people_capacity)])
        .activity("Startup", "startup", &[("money", 1.0), ("people", 1.0)], 3.0)
        .link_all("Funding", "Startup")
        .link_all("Staff", "Startup")
        .build()
}
