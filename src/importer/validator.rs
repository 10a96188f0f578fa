// ==========================================
// 资源分配优化器 - 输入图结构校验
// ==========================================
// 职责: 导入时检查数据模型不变式，输出 {code, text, offender, fixable} 记录
// 致命: 未知类、未声明预算维度、实例缺少预算值、链接引用未知类、负数量、实例重名、未知约束类型
// 可修复: 链接未在资源类中声明、类无实例
// ==========================================

use crate::domain::graph::AllocationGraph;
use crate::domain::types::{ConstraintKind, ContainmentSide, WILDCARD};
use crate::domain::validation::ValidationIssue;
use std::collections::HashSet;

pub mod codes {
    pub const UNKNOWN_CLASS: &str = "UNKNOWN_CLASS";
    pub const UNDECLARED_BUDGET: &str = "UNDECLARED_BUDGET";
    pub const UNKNOWN_LINK_CLASS: &str = "UNKNOWN_LINK_CLASS";
    pub const NEGATIVE_AMOUNT: &str = "NEGATIVE_AMOUNT";
    pub const DUPLICATE_INSTANCE: &str = "DUPLICATE_INSTANCE";
    pub const UNKNOWN_CONSTRAINT_TYPE: &str = "UNKNOWN_CONSTRAINT_TYPE";
    pub const LINK_NOT_DECLARED: &str = "LINK_NOT_DECLARED";
    pub const MISSING_BUDGET_VALUE: &str = "MISSING_BUDGET_VALUE";
    pub const EMPTY_CLASS: &str = "EMPTY_CLASS";
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphValidator;

impl GraphValidator {
    pub fn new() -> Self {
        Self
    }

    /// 执行全部结构校验
    pub fn validate(&self, graph: &AllocationGraph) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        issues.extend(self.validate_instances(graph));
        issues.extend(self.validate_links(graph));
        issues.extend(self.validate_constraints(graph));
        issues
    }

    /// 实例：所属类存在、预算维度已声明、数量非负、名称唯一
    fn validate_instances(&self, graph: &AllocationGraph) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let mut seen = HashSet::new();
        for group in &graph.resource_instances {
            let Some(class) = graph.resource_class(&group.class_name) else {
                issues.push(ValidationIssue::fatal(
                    codes::UNKNOWN_CLASS,
                    &group.class_name,
                    "资源实例所属的资源类未声明",
                ));
                continue;
            };

            for instance in &group.instance_table {
                if !seen.insert(instance.instance_name.as_str()) {
                    issues.push(ValidationIssue::fatal(
                        codes::DUPLICATE_INSTANCE,
                        &instance.instance_name,
                        "资源实例重名",
                    ));
                }
                for (budget, value) in &instance.budget {
                    if !class.budgets.contains(budget) {
                        issues.push(ValidationIssue::fatal(
                            codes::UNDECLARED_BUDGET,
                            &instance.instance_name,
                            format!("预算维度 {} 未在资源类 {} 中声明", budget, class.class_name),
                        ));
                    }
                    if *value < 0.0 {
                        issues.push(ValidationIssue::fatal(
                            codes::NEGATIVE_AMOUNT,
                            &instance.instance_name,
                            format!("预算 {} 为负数: {}", budget, value),
                        ));
                    }
                }
                for budget in &class.budgets {
                    if !instance.budget.contains_key(budget) {
                        issues.push(ValidationIssue::fatal(
                            codes::MISSING_BUDGET_VALUE,
                            &instance.instance_name,
                            format!("缺少资源类 {} 声明的预算 {} 的取值", class.class_name, budget),
                        ));
                    }
                }
            }
        }

        // 需求维度必须是某个资源类声明过的预算
        let declared: HashSet<&str> = graph
            .resource_classes
            .iter()
            .flat_map(|c| c.budgets.iter().map(String::as_str))
            .collect();

        let mut seen = HashSet::new();
        for group in &graph.activity_instances {
            let Some(class) = graph.activity_class(&group.class_name) else {
                issues.push(ValidationIssue::fatal(
                    codes::UNKNOWN_CLASS,
                    &group.class_name,
                    "活动实例所属的活动类未声明",
                ));
                continue;
            };

            for instance in &group.instance_table {
                if !seen.insert(instance.instance_name.as_str()) {
                    issues.push(ValidationIssue::fatal(
                        codes::DUPLICATE_INSTANCE,
                        &instance.instance_name,
                        "活动实例重名",
                    ));
                }
                for (budget, value) in &instance.cost {
                    if !class.costs.contains(budget) {
                        issues.push(ValidationIssue::fatal(
                            codes::UNDECLARED_BUDGET,
                            &instance.instance_name,
                            format!("需求维度 {} 未在活动类 {} 中声明", budget, class.class_name),
                        ));
                    } else if !declared.contains(budget.as_str()) {
                        issues.push(ValidationIssue::fatal(
                            codes::UNDECLARED_BUDGET,
                            &instance.instance_name,
                            format!("需求维度 {} 没有任何资源类提供", budget),
                        ));
                    }
                    if *value < 0.0 {
                        issues.push(ValidationIssue::fatal(
                            codes::NEGATIVE_AMOUNT,
                            &instance.instance_name,
                            format!("需求 {} 为负数: {}", budget, value),
                        ));
                    }
                }
            }
        }

        for class in &graph.resource_classes {
            if graph.resource_instance_names(&class.class_name).is_empty() {
                issues.push(ValidationIssue::warning(codes::EMPTY_CLASS, &class.class_name, "资源类没有实例"));
            }
        }
        for class in &graph.activity_classes {
            if graph.activity_instance_names(&class.class_name).is_empty() {
                issues.push(ValidationIssue::warning(codes::EMPTY_CLASS, &class.class_name, "活动类没有实例"));
            }
        }

        issues
    }

    /// 分配链接与包含链接引用的类必须存在
    fn validate_links(&self, graph: &AllocationGraph) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for link in &graph.allocation_instances {
            let resource_class = graph.resource_class(&link.resource_class_name);
            if resource_class.is_none() {
                issues.push(ValidationIssue::fatal(
                    codes::UNKNOWN_LINK_CLASS,
                    link.link_name(),
                    format!("分配链接引用了未知资源类 {}", link.resource_class_name),
                ));
            }
            if graph.activity_class(&link.activity_class_name).is_none() {
                issues.push(ValidationIssue::fatal(
                    codes::UNKNOWN_LINK_CLASS,
                    link.link_name(),
                    format!("分配链接引用了未知活动类 {}", link.activity_class_name),
                ));
            }
            if let Some(rc) = resource_class {
                if !rc.can_be_allocated_to_classes.contains(&link.activity_class_name) {
                    issues.push(ValidationIssue::warning(
                        codes::LINK_NOT_DECLARED,
                        link.link_name(),
                        "资源类未声明可分配到该活动类",
                    ));
                }
            }
            for row in &link.instance_table {
                let resource_ok = row.resource_instance_name == WILDCARD
                    || graph
                        .resource_instance_names(&link.resource_class_name)
                        .contains(&row.resource_instance_name.as_str());
                let activity_ok = row.activity_instance_name == WILDCARD
                    || graph
                        .activity_instance_names(&link.activity_class_name)
                        .contains(&row.activity_instance_name.as_str());
                if !resource_ok || !activity_ok {
                    issues.push(ValidationIssue::fatal(
                        codes::UNKNOWN_CLASS,
                        format!("{}->{}", row.resource_instance_name, row.activity_instance_name),
                        format!("分配行引用的实例不属于链接 {} 的类", link.link_name()),
                    ));
                }
            }
        }

        for link in &graph.contains_instances {
            let known = |name: &str| match link.parent_type {
                ContainmentSide::Resource => graph.resource_class(name).is_some(),
                ContainmentSide::Activity => graph.activity_class(name).is_some(),
            };
            for class in [&link.parent_class_name, &link.child_class_name] {
                if !known(class) {
                    issues.push(ValidationIssue::fatal(
                        codes::UNKNOWN_LINK_CLASS,
                        class,
                        format!("包含链接引用了未知{}类", link.parent_type),
                    ));
                }
            }
        }

        issues
    }

    fn validate_constraints(&self, graph: &AllocationGraph) -> Vec<ValidationIssue> {
        graph
            .allocation_constraints
            .iter()
            .filter(|c| c.allocation_constraint_type.parse::<ConstraintKind>().is_err())
            .map(|c| {
                ValidationIssue::fatal(
                    codes::UNKNOWN_CONSTRAINT_TYPE,
                    &c.allocation_constraint_type,
                    format!("分配约束 {} / {} 的类型未知", c.allocation_start, c.allocation_end),
                )
            })
            .collect()
    }
}
