// ==========================================
// 引擎单元测试共享输入图
// ==========================================

use crate::domain::graph::*;
use crate::domain::types::{ContainmentSide, WILDCARD};
use std::collections::BTreeMap;

pub fn amounts(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn resource_class(name: &str, budgets: &[&str], targets: &[&str]) -> ResourceClass {
    ResourceClass {
        class_name: name.to_string(),
        budgets: budgets.iter().map(|s| s.to_string()).collect(),
        can_be_allocated_to_classes: targets.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

fn activity_class(name: &str, costs: &[&str], contains: &[&str]) -> ActivityClass {
    ActivityClass {
        class_name: name.to_string(),
        costs: costs.iter().map(|s| s.to_string()).collect(),
        rewards: vec!["value".to_string()],
        contains_classes: contains.iter().map(|s| s.to_string()).collect(),
    }
}

fn resources(class: &str, rows: Vec<(&str, BTreeMap<String, f64>)>) -> ResourceInstanceGroup {
    ResourceInstanceGroup {
        class_name: class.to_string(),
        instance_table: rows
            .into_iter()
            .map(|(name, budget)| ResourceInstance {
                instance_name: name.to_string(),
                budget,
            })
            .collect(),
    }
}

fn activities(class: &str, rows: Vec<(&str, BTreeMap<String, f64>, f64)>) -> ActivityInstanceGroup {
    ActivityInstanceGroup {
        class_name: class.to_string(),
        instance_table: rows
            .into_iter()
            .map(|(name, cost, reward)| ActivityInstance {
                instance_name: name.to_string(),
                cost,
                reward,
            })
            .collect(),
    }
}

fn link_all(resource: &str, activity: &str) -> AllocationLink {
    AllocationLink {
        resource_class_name: resource.to_string(),
        activity_class_name: activity.to_string(),
        instance_table: vec![AllocationRow::new(WILDCARD, WILDCARD)],
    }
}

fn contains(side: ContainmentSide, parent: &str, child: &str, rows: &[(&str, &str)]) -> ContainsLink {
    ContainsLink {
        parent_class_name: parent.to_string(),
        child_class_name: child.to_string(),
        parent_type: side,
        instance_table: rows
            .iter()
            .map(|(p, c)| ContainsRow {
                parent_instance_name: p.to_string(),
                child_instance_name: c.to_string(),
            })
            .collect(),
    }
}

/// 一个资源 w0、一个活动 i0、一条无条件链接
pub fn single_pair_graph(capacity: f64, cost: f64, reward: f64) -> AllocationGraph {
    AllocationGraph {
        resource_classes: vec![resource_class("Wallet", &["money"], &["Item"])],
        activity_classes: vec![activity_class("Item", &["money"], &[])],
        resource_instances: vec![resources("Wallet", vec![("w0", amounts(&[("money", capacity)]))])],
        activity_instances: vec![activities("Item", vec![("i0", amounts(&[("money", cost)]), reward)])],
        allocation_instances: vec![link_all("Wallet", "Item")],
        ..Default::default()
    }
}

/// Funding 与 Staff 各自经由一条链接满足 st0 的一半需求（扇入 2）
pub fn fan_in_graph() -> AllocationGraph {
    AllocationGraph {
        resource_classes: vec![
            resource_class("Funding", &["money"], &["Startup"]),
            resource_class("Staff", &["people"], &["Startup"]),
        ],
        activity_classes: vec![activity_class("Startup", &["money", "people"], &[])],
        resource_instances: vec![
            resources("Funding", vec![("f0", amounts(&[("money", 1.0)]))]),
            resources("Staff", vec![("s0", amounts(&[("people", 1.0)]))]),
        ],
        activity_instances: vec![activities(
            "Startup",
            vec![("st0", amounts(&[("money", 1.0), ("people", 1.0)]), 3.0)],
        )],
        allocation_instances: vec![link_all("Funding", "Startup"), link_all("Staff", "Startup")],
        ..Default::default()
    }
}

/// 同一个包 bag0 不能同时装 Food 与 Cleaner
pub fn if_not_graph() -> AllocationGraph {
    AllocationGraph {
        resource_classes: vec![resource_class("Bag", &["slots"], &["Food", "Cleaner"])],
        activity_classes: vec![
            activity_class("Food", &["slots"], &[]),
            activity_class("Cleaner", &["slots"], &[]),
        ],
        resource_instances: vec![resources("Bag", vec![("bag0", amounts(&[("slots", 2.0)]))])],
        activity_instances: vec![
            activities("Food", vec![("food0", amounts(&[("slots", 1.0)]), 2.0)]),
            activities("Cleaner", vec![("clean0", amounts(&[("slots", 1.0)]), 3.0)]),
        ],
        allocation_instances: vec![link_all("Bag", "Food"), link_all("Bag", "Cleaner")],
        allocation_constraints: vec![AllocationConstraint {
            allocation_start: LinkRef::new("Bag", "Food"),
            allocation_end: LinkRef::new("Bag", "Cleaner"),
            allocation_constraint_type: "IF-NOT".to_string(),
        }],
        ..Default::default()
    }
}

/// Ship ⊃ {Turret, Missile}，Region ⊃ {City, VIP}
///
/// ship0 有炮塔 t0 与导弹 m0；ship1 只有导弹 m1。
/// 只有同船炮塔守住同区城市时，导弹才允许打击该区 VIP
pub fn contained_if_then_graph() -> AllocationGraph {
    AllocationGraph {
        resource_classes: vec![
            ResourceClass {
                class_name: "Ship".to_string(),
                contains_classes: vec!["Turret".to_string(), "Missile".to_string()],
                ..Default::default()
            },
            resource_class("Turret", &["ammo"], &["City"]),
            resource_class("Missile", &["warhead"], &["VIP"]),
        ],
        activity_classes: vec![
            activity_class("Region", &[], &["City", "VIP"]),
            activity_class("City", &["ammo"], &[]),
            activity_class("VIP", &["warhead"], &[]),
        ],
        resource_instances: vec![
            resources("Ship", vec![("ship0", amounts(&[])), ("ship1", amounts(&[]))]),
            resources("Turret", vec![("t0", amounts(&[("ammo", 1.0)]))]),
            resources(
                "Missile",
                vec![("m0", amounts(&[("warhead", 1.0)])), ("m1", amounts(&[("warhead", 1.0)]))],
            ),
        ],
        activity_instances: vec![
            activities("Region", vec![("region0", amounts(&[]), 0.0)]),
            activities("City", vec![("city0", amounts(&[("ammo", 1.0)]), 0.0)]),
            activities("VIP", vec![("vip0", amounts(&[("warhead", 1.0)]), 5.0)]),
        ],
        allocation_instances: vec![link_all("Turret", "City"), link_all("Missile", "VIP")],
        contains_instances: vec![
            contains(ContainmentSide::Resource, "Ship", "Turret", &[("ship0", "t0")]),
            contains(ContainmentSide::Resource, "Ship", "Missile", &[("ship0", "m0"), ("ship1", "m1")]),
            contains(ContainmentSide::Activity, "Region", "City", &[("region0", "city0")]),
            contains(ContainmentSide::Activity, "Region", "VIP", &[("region0", "vip0")]),
        ],
        allocation_constraints: vec![AllocationConstraint {
            allocation_start: LinkRef::new("Turret", "City"),
            allocation_end: LinkRef::new("Missile", "VIP"),
            allocation_constraint_type: "Contained IF-THEN".to_string(),
        }],
    }
}
