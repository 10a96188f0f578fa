// ==========================================
// 资源分配优化器 - 图索引构建器
// ==========================================
// 职责: 为资源实例、活动实例、预算维度、分配类链接分配稠密 id
// 约束: 按声明顺序单遍分配，同一输入重复构建得到相同 id
// 输出: 名称 <-> id 映射，以及按 id 组织的容量/需求/奖励参数
// ==========================================

use crate::domain::graph::{AllocationGraph, LinkRef};
use crate::engine::error::{BuildError, BuildResult};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

// ==========================================
// IdTable - 名称 <-> 稠密 id
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdTable {
    names: Vec<String>,
    ids: HashMap<String, usize>,
}

impl IdTable {
    /// 插入新名称；已存在时返回 None
    fn insert(&mut self, name: &str) -> Option<usize> {
        if self.ids.contains_key(name) {
            return None;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        Some(id)
    }

    fn get_or_insert(&mut self, name: &str) -> usize {
        match self.ids.get(name) {
            Some(id) => *id,
            None => {
                let id = self.names.len();
                self.names.push(name.to_string());
                self.ids.insert(name.to_string(), id);
                id
            }
        }
    }

    pub fn id(&self, name: &str) -> Option<usize> {
        self.ids.get(name).copied()
    }

    /// id 由本表分配，调用方保证不越界
    pub fn name(&self, id: usize) -> &str {
        &self.names[id]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ==========================================
// GraphIndex - 图索引
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct GraphIndex {
    pub resources: IdTable,
    pub activities: IdTable,
    pub budgets: IdTable,
    pub links: IdTable,

    resource_class: Vec<String>,
    activity_class: Vec<String>,
    link_refs: Vec<LinkRef>,
    class_resources: HashMap<String, Vec<usize>>,
    class_activities: HashMap<String, Vec<usize>>,

    /// (资源 id, 预算 id) -> 容量
    capacity: BTreeMap<(usize, usize), f64>,
    /// (活动 id, 预算 id) -> 需求
    cost: BTreeMap<(usize, usize), f64>,
    reward: Vec<f64>,
}

impl GraphIndex {
    /// 构建索引
    ///
    /// # 返回
    /// - Err(DuplicateInstance): 同一命名空间内实例名重复
    /// - Err(UnknownBudget): 容量/需求引用了未声明的预算维度
    pub fn build(graph: &AllocationGraph) -> BuildResult<Self> {
        // 预算维度：按资源类声明顺序去重
        let mut budgets = IdTable::default();
        for rc in &graph.resource_classes {
            for b in &rc.budgets {
                budgets.get_or_insert(b);
            }
        }

        // 资源实例
        let mut resources = IdTable::default();
        let mut resource_class = Vec::new();
        let mut class_resources: HashMap<String, Vec<usize>> = HashMap::new();
        let mut capacity = BTreeMap::new();
        for group in &graph.resource_instances {
            if graph.resource_class(&group.class_name).is_none() {
                return Err(BuildError::UnknownResourceClass(group.class_name.clone()));
            }
            for inst in &group.instance_table {
                let r = resources.insert(&inst.instance_name).ok_or_else(|| {
                    BuildError::DuplicateInstance {
                        class: group.class_name.clone(),
                        name: inst.instance_name.clone(),
                    }
                })?;
                resource_class.push(group.class_name.clone());
                class_resources
                    .entry(group.class_name.clone())
                    .or_default()
                    .push(r);

                for (b_name, amount) in &inst.budget {
                    let b = budgets.id(b_name).ok_or_else(|| BuildError::UnknownBudget {
                        instance: inst.instance_name.clone(),
                        budget: b_name.clone(),
                    })?;
                    capacity.insert((r, b), *amount);
                }
            }
        }

        // 活动实例
        let mut activities = IdTable::default();
        let mut activity_class = Vec::new();
        let mut class_activities: HashMap<String, Vec<usize>> = HashMap::new();
        let mut cost = BTreeMap::new();
        let mut reward = Vec::new();
        for group in &graph.activity_instances {
            if graph.activity_class(&group.class_name).is_none() {
                return Err(BuildError::UnknownActivityClass(group.class_name.clone()));
            }
            for inst in &group.instance_table {
                let a = activities.insert(&inst.instance_name).ok_or_else(|| {
                    BuildError::DuplicateInstance {
                        class: group.class_name.clone(),
                        name: inst.instance_name.clone(),
                    }
                })?;
                activity_class.push(group.class_name.clone());
                class_activities
                    .entry(group.class_name.clone())
                    .or_default()
                    .push(a);
                reward.push(inst.reward);

                for (b_name, amount) in &inst.cost {
                    let b = budgets.id(b_name).ok_or_else(|| BuildError::UnknownBudget {
                        instance: inst.instance_name.clone(),
                        budget: b_name.clone(),
                    })?;
                    cost.insert((a, b), *amount);
                }
            }
        }

        // 分配类链接
        let mut links = IdTable::default();
        let mut link_refs = Vec::new();
        for link in &graph.allocation_instances {
            let name = link.link_name();
            if links.insert(&name).is_none() {
                return Err(BuildError::DuplicateLink(name));
            }
            link_refs.push(LinkRef::new(
                &link.resource_class_name,
                &link.activity_class_name,
            ));
        }

        debug!(
            resources = resources.len(),
            activities = activities.len(),
            budgets = budgets.len(),
            links = links.len(),
            "索引构建完成"
        );

        Ok(Self {
            resources,
            activities,
            budgets,
            links,
            resource_class,
            activity_class,
            link_refs,
            class_resources,
            class_activities,
            capacity,
            cost,
            reward,
        })
    }

    pub fn resource_class(&self, r: usize) -> &str {
        &self.resource_class[r]
    }

    pub fn activity_class(&self, a: usize) -> &str {
        &self.activity_class[a]
    }

    pub fn resources_of_class(&self, class_name: &str) -> &[usize] {
        self.class_resources
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn activities_of_class(&self, class_name: &str) -> &[usize] {
        self.class_activities
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn link_ref(&self, p: usize) -> &LinkRef {
        &self.link_refs[p]
    }

    pub fn link_id(&self, link: &LinkRef) -> Option<usize> {
        self.links.id(&link.to_string())
    }

    pub fn capacity(&self, r: usize, b: usize) -> Option<f64> {
        self.capacity.get(&(r, b)).copied()
    }

    pub fn cost(&self, a: usize, b: usize) -> Option<f64> {
        self.cost.get(&(a, b)).copied()
    }

    /// 某资源声明的全部预算维度（按预算 id 升序）
    pub fn resource_budgets(&self, r: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.capacity
            .range((r, 0)..(r + 1, 0))
            .map(|((_, b), v)| (*b, *v))
    }

    pub fn reward(&self, a: usize) -> f64 {
        self.reward[a]
    }
}
