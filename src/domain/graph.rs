// ==========================================
// 资源分配优化器 - 分配图（标准化输入）
// ==========================================
// 职责: 描述资源类/活动类、实例、分配链接、包含关系与分配约束
// 格式: 与上游可视化工具导出的 camelCase JSON 一致
// 红线: 本模块只描述数据，不做一致性校验（见 importer::validator）
// ==========================================

use crate::domain::types::{ContainmentSide, WILDCARD};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ==========================================
// AllocationGraph - 分配图
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationGraph {
    #[serde(default)]
    pub resource_classes: Vec<ResourceClass>,

    #[serde(default)]
    pub activity_classes: Vec<ActivityClass>,

    #[serde(default)]
    pub resource_instances: Vec<ResourceInstanceGroup>,

    #[serde(default)]
    pub activity_instances: Vec<ActivityInstanceGroup>,

    #[serde(default)]
    pub allocation_instances: Vec<AllocationLink>,

    #[serde(default)]
    pub contains_instances: Vec<ContainsLink>,

    #[serde(default)]
    pub allocation_constraints: Vec<AllocationConstraint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceClass {
    pub class_name: String,

    /// 该类声明的预算维度
    #[serde(default)]
    pub budgets: Vec<String>,

    #[serde(default)]
    pub contains_classes: Vec<String>,

    /// 可被分配到的活动类
    #[serde(default)]
    pub can_be_allocated_to_classes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityClass {
    pub class_name: String,

    #[serde(default)]
    pub costs: Vec<String>,

    #[serde(default)]
    pub rewards: Vec<String>,

    #[serde(default)]
    pub contains_classes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInstanceGroup {
    pub class_name: String,

    #[serde(default)]
    pub instance_table: Vec<ResourceInstance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInstance {
    pub instance_name: String,

    /// 预算维度 -> 可用容量
    #[serde(default, deserialize_with = "lenient_amounts")]
    pub budget: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInstanceGroup {
    pub class_name: String,

    #[serde(default)]
    pub instance_table: Vec<ActivityInstance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInstance {
    pub instance_name: String,

    /// 预算维度 -> 需求量；为空表示该活动不可直接分配
    #[serde(default, deserialize_with = "lenient_amounts")]
    pub cost: BTreeMap<String, f64>,

    /// 奖励值；0 表示仅用于使能其他活动
    #[serde(default, deserialize_with = "lenient_reward")]
    pub reward: f64,
}

// ==========================================
// AllocationLink - 分配类链接
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationLink {
    pub resource_class_name: String,
    pub activity_class_name: String,

    #[serde(default)]
    pub instance_table: Vec<AllocationRow>,
}

impl AllocationLink {
    /// 链接名称（日志/错误信息使用）
    pub fn link_name(&self) -> String {
        format!("{}->{}", self.resource_class_name, self.activity_class_name)
    }

    pub fn matches(&self, resource_class: &str, activity_class: &str) -> bool {
        self.resource_class_name == resource_class && self.activity_class_name == activity_class
    }
}

/// 分配表行；任一字段可为通配符 "ALL"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRow {
    pub resource_instance_name: String,
    pub activity_instance_name: String,
}

impl AllocationRow {
    pub fn new(resource: &str, activity: &str) -> Self {
        Self {
            resource_instance_name: resource.to_string(),
            activity_instance_name: activity.to_string(),
        }
    }

    pub fn resource_is_wildcard(&self) -> bool {
        self.resource_instance_name == WILDCARD
    }

    pub fn activity_is_wildcard(&self) -> bool {
        self.activity_instance_name == WILDCARD
    }
}

// ==========================================
// ContainsLink - 包含关系
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainsLink {
    pub parent_class_name: String,
    pub child_class_name: String,
    pub parent_type: ContainmentSide,

    #[serde(default)]
    pub instance_table: Vec<ContainsRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainsRow {
    pub parent_instance_name: String,
    pub child_instance_name: String,
}

// ==========================================
// AllocationConstraint - 分配约束
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationConstraint {
    pub allocation_start: LinkRef,
    pub allocation_end: LinkRef,

    /// "IF-NOT" 或 "Contained IF-THEN"；其余取值在建模时报错
    pub allocation_constraint_type: String,
}

/// 按 (资源类, 活动类) 引用一条分配类链接
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRef {
    pub resource_class: String,
    pub activity_class: String,
}

impl LinkRef {
    pub fn new(resource_class: &str, activity_class: &str) -> Self {
        Self {
            resource_class: resource_class.to_string(),
            activity_class: activity_class.to_string(),
        }
    }
}

impl std::fmt::Display for LinkRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.resource_class, self.activity_class)
    }
}

// ==========================================
// 查询辅助
// ==========================================
impl AllocationGraph {
    /// 从 JSON 文本解析
    ///
    /// 同时接受两种外层格式：
    /// - 直接的图对象
    /// - 上游数据集信封 `{"datasetName": .., "files": [{"fileContents": {...}}]}`
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let inner = value
            .get("files")
            .and_then(|files| files.get(0))
            .and_then(|file| file.get("fileContents"))
            .cloned();

        match inner {
            Some(contents) => serde_json::from_value(contents),
            None => serde_json::from_value(value),
        }
    }

    pub fn resource_class(&self, name: &str) -> Option<&ResourceClass> {
        self.resource_classes.iter().find(|c| c.class_name == name)
    }

    pub fn activity_class(&self, name: &str) -> Option<&ActivityClass> {
        self.activity_classes.iter().find(|c| c.class_name == name)
    }

    /// 某资源类的全部实例名（声明顺序）
    pub fn resource_instance_names(&self, class_name: &str) -> Vec<&str> {
        self.resource_instances
            .iter()
            .filter(|g| g.class_name == class_name)
            .flat_map(|g| g.instance_table.iter().map(|i| i.instance_name.as_str()))
            .collect()
    }

    /// 某活动类的全部实例名（声明顺序）
    pub fn activity_instance_names(&self, class_name: &str) -> Vec<&str> {
        self.activity_instances
            .iter()
            .filter(|g| g.class_name == class_name)
            .flat_map(|g| g.instance_table.iter().map(|i| i.instance_name.as_str()))
            .collect()
    }

    /// 按 (资源类, 活动类) 查找第一条匹配的分配类链接
    pub fn find_link(&self, link: &LinkRef) -> Option<(usize, &AllocationLink)> {
        self.allocation_instances
            .iter()
            .enumerate()
            .find(|(_, l)| l.matches(&link.resource_class, &link.activity_class))
    }

    /// 活动类是否出现在任一资源类的可分配列表中
    pub fn is_activity_class_allocatable(&self, class_name: &str) -> bool {
        self.resource_classes
            .iter()
            .any(|rc| rc.can_be_allocated_to_classes.iter().any(|a| a == class_name))
    }

    /// 全部活动实例（可变），供奖励更新使用
    pub fn activity_instances_mut(&mut self) -> impl Iterator<Item = &mut ActivityInstance> {
        self.activity_instances
            .iter_mut()
            .flat_map(|g| g.instance_table.iter_mut())
    }

    /// 所有容量/需求值是否均为 1（单位容量图）
    pub fn is_unit_capacity(&self) -> bool {
        let budgets_unit = self
            .resource_instances
            .iter()
            .flat_map(|g| g.instance_table.iter())
            .flat_map(|i| i.budget.values())
            .all(|v| (*v - 1.0).abs() < 1e-9);
        let costs_unit = self
            .activity_instances
            .iter()
            .flat_map(|g| g.instance_table.iter())
            .flat_map(|i| i.cost.values())
            .all(|v| (*v - 1.0).abs() < 1e-9);
        budgets_unit && costs_unit
    }
}

// ==========================================
// 宽松反序列化
// ==========================================
// 上游对无预算的容器资源会导出 "budget": ""，对无奖励活动导出 "reward": ""

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountsOrBlank {
    Amounts(BTreeMap<String, f64>),
    Blank(String),
    Scalar(f64),
}

fn lenient_amounts<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<AmountsOrBlank>::deserialize(deserializer)? {
        Some(AmountsOrBlank::Amounts(map)) => Ok(map),
        Some(AmountsOrBlank::Blank(s)) if s.trim().is_empty() => Ok(BTreeMap::new()),
        Some(AmountsOrBlank::Blank(s)) => Err(serde::de::Error::custom(format!(
            "预算/需求字段必须是对象: {}",
            s
        ))),
        Some(AmountsOrBlank::Scalar(v)) => Err(serde::de::Error::custom(format!(
            "预算/需求字段必须是对象，实际为数值: {}",
            v
        ))),
        None => Ok(BTreeMap::new()),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RewardOrBlank {
    Value(f64),
    Text(String),
}

fn lenient_reward<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RewardOrBlank>::deserialize(deserializer)? {
        Some(RewardOrBlank::Value(v)) => Ok(v),
        Some(RewardOrBlank::Text(s)) if s.trim().is_empty() => Ok(0.0),
        Some(RewardOrBlank::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("奖励值无法解析: {}", s))),
        None => Ok(0.0),
    }
}
