// ==========================================
// 资源分配优化器 - 求解输出
// ==========================================
// 职责: 分配结果、资源得分/预算使用统计、全量审计轨迹
// ==========================================

use crate::domain::types::TerminationCondition;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// 资源 -> 活动 -> 预算维度 -> 数量
pub type AllocatedAmounts = BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>;

// ==========================================
// OptimizerOutput - 解码后的求解结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct OptimizerOutput {
    /// 目标值（被选中活动的奖励之和）
    pub objective_value: f64,

    /// 资源名 -> 被分配的活动名列表
    pub allocations: BTreeMap<String, Vec<String>>,

    /// 全量轨迹（每个候选资源/活动配对一行）
    pub full_trace: FullTrace,

    pub allocated_amt: AllocatedAmounts,

    /// 资源名 -> 该资源被选中分配的奖励之和
    pub per_resource_score: BTreeMap<String, f64>,

    /// 资源名 -> 预算维度 -> 已用数量
    pub per_resource_budget_used: BTreeMap<String, BTreeMap<String, f64>>,

    /// 求解终止条件
    pub termination: TerminationCondition,

    /// 使用的模型形式
    pub formulation: String,

    /// 实际求解尝试次数
    pub attempts: u32,
}

impl OptimizerOutput {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 按 (selected 降序, value 降序) 排列的轨迹
    pub fn trace_sorted(&self) -> Vec<TraceRow<'_>> {
        self.full_trace.sorted_rows()
    }
}

// ==========================================
// FullTrace - 列式审计轨迹
// ==========================================
#[derive(Debug, Clone, Default, Serialize)]
pub struct FullTrace {
    /// budget_used 各分量对应的预算维度名（按预算 id 顺序）
    pub budget_names: Vec<String>,
    pub resource: Vec<String>,
    pub activity: Vec<String>,
    pub budget_used: Vec<Vec<f64>>,
    pub value: Vec<f64>,
    pub selected: Vec<bool>,
    pub picked: Vec<bool>,
    pub allocated: Vec<bool>,
}

/// 轨迹中的一行（借用视图）
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRow<'a> {
    pub resource: &'a str,
    pub activity: &'a str,
    pub budget_used: &'a [f64],
    pub value: f64,
    pub selected: bool,
    pub picked: bool,
    pub allocated: bool,
}

impl FullTrace {
    pub fn new(budget_names: Vec<String>) -> Self {
        Self {
            budget_names,
            ..Default::default()
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn push(
        &mut self,
        resource: &str,
        activity: &str,
        budget_used: Vec<f64>,
        value: f64,
        selected: bool,
        picked: bool,
        allocated: bool,
    ) {
        self.resource.push(resource.to_string());
        self.activity.push(activity.to_string());
        self.budget_used.push(budget_used);
        self.value.push(value);
        self.selected.push(selected);
        self.picked.push(picked);
        self.allocated.push(allocated);
    }

    pub fn len(&self) -> usize {
        self.resource.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource.is_empty()
    }

    pub fn row(&self, i: usize) -> Option<TraceRow<'_>> {
        if i >= self.len() {
            return None;
        }
        Some(TraceRow {
            resource: &self.resource[i],
            activity: &self.activity[i],
            budget_used: &self.budget_used[i],
            value: self.value[i],
            selected: self.selected[i],
            picked: self.picked[i],
            allocated: self.allocated[i],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = TraceRow<'_>> {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    /// 选中的在前，同组内奖励高的在前；相等时保持声明顺序
    pub fn sorted_rows(&self) -> Vec<TraceRow<'_>> {
        let mut rows: Vec<TraceRow<'_>> = self.rows().collect();
        rows.sort_by(|a, b| {
            b.selected
                .cmp(&a.selected)
                .then_with(|| b.value.total_cmp(&a.value))
        });
        rows
    }

    /// 导出为 CSV（排序后）
    ///
    /// 列: resource, activity, budget_used:<维度>..., value, selected, picked, allocated
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = vec!["resource".to_string(), "activity".to_string()];
        header.extend(self.budget_names.iter().map(|b| format!("budget_used:{}", b)));
        header.extend(
            ["value", "selected", "picked", "allocated"]
                .iter()
                .map(|s| s.to_string()),
        );
        wtr.write_record(&header)?;

        for row in self.sorted_rows() {
            let mut record = vec![row.resource.to_string(), row.activity.to_string()];
            record.extend(row.budget_used.iter().map(|v| v.to_string()));
            record.push(row.value.to_string());
            record.push(u8::from(row.selected).to_string());
            record.push(u8::from(row.picked).to_string());
            record.push(u8::from(row.allocated).to_string());
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }
}
