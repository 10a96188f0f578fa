// ==========================================
// 资源分配优化器 - 模型形式
// ==========================================
// 职责: 目标函数与变量模型，以及候选模型形式的能力判定
// 目标: max Σ PICKED[a] × reward[a]
// 候选顺序: [UnitCapacity, General]，由 selector 取第一个可用者
// ==========================================

use crate::domain::graph::AllocationGraph;
use crate::engine::error::BuildResult;
use crate::engine::features::{
    self, base, contained_if_then, contained_reward, if_not, AmountMode, ModelContext,
};
use crate::engine::index::GraphIndex;
use crate::engine::milp::{MilpProblem, VarKey};
use crate::engine::relations::Relations;
use tracing::info;

// ==========================================
// Formulation Trait
// ==========================================

/// 模型形式：能力判定 + 编译
pub trait Formulation: Send + Sync {
    /// 模型形式名称（写入输出与日志）
    fn name(&self) -> &'static str;

    /// 该形式能否求解给定输入
    fn can_solve(&self, graph: &AllocationGraph) -> bool;

    /// 编译为 MILP 问题
    fn build(&self, graph: &AllocationGraph) -> BuildResult<BuiltModel>;
}

/// 已编译模型：id 映射、派生关系与 MILP 问题
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub formulation: &'static str,
    pub amount_mode: AmountMode,
    pub index: GraphIndex,
    pub relations: Relations,
    pub problem: MilpProblem,
    /// 实际生成的约束族名称（按生成顺序）
    pub features: Vec<&'static str>,
}

// ==========================================
// 具体模型形式
// ==========================================

/// 单位容量形式：全部容量/需求均为 1 时不建 ALLOCATED_AMT
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitCapacityFormulation;

impl Formulation for UnitCapacityFormulation {
    fn name(&self) -> &'static str {
        "unit_capacity"
    }

    fn can_solve(&self, graph: &AllocationGraph) -> bool {
        graph.is_unit_capacity()
    }

    fn build(&self, graph: &AllocationGraph) -> BuildResult<BuiltModel> {
        compile(graph, AmountMode::Implied, self.name())
    }
}

/// 通用形式：任意非负容量/需求
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralFormulation;

impl Formulation for GeneralFormulation {
    fn name(&self) -> &'static str {
        "general"
    }

    fn can_solve(&self, _graph: &AllocationGraph) -> bool {
        true
    }

    fn build(&self, graph: &AllocationGraph) -> BuildResult<BuiltModel> {
        compile(graph, AmountMode::Variable, self.name())
    }
}

/// 默认候选列表（顺序即优先级）
pub fn default_formulations() -> Vec<Box<dyn Formulation>> {
    vec![Box::new(UnitCapacityFormulation), Box::new(GeneralFormulation)]
}

// ==========================================
// 编译流程（各形式共享）
// ==========================================

/// 索引 -> 关系 -> 约束族 -> 目标函数
///
/// # 参数
/// - graph: 已校验的输入图
/// - amount_mode: 分配数量建模方式
/// - name: 模型形式名称
pub fn compile(graph: &AllocationGraph, amount_mode: AmountMode, name: &'static str) -> BuildResult<BuiltModel> {
    let index = GraphIndex::build(graph)?;
    let relations = Relations::resolve(graph, &index)?;
    let constraints = features::parse_constraints(graph)?;

    let mut problem = MilpProblem::new();
    let mut applied = Vec::new();

    {
        let ctx = ModelContext {
            graph,
            index: &index,
            relations: &relations,
            constraints: &constraints,
            amount_mode,
        };

        let steps: [(&'static str, fn(&ModelContext<'_>, &mut MilpProblem) -> BuildResult<bool>); 4] = [
            ("base", base::apply),
            ("contained_reward", contained_reward::apply),
            ("if_not", if_not::apply),
            ("contained_if_then", contained_if_then::apply),
        ];
        for (feature, apply) in steps {
            if apply(&ctx, &mut problem)? {
                applied.push(feature);
            }
        }
    }

    for a in 0..index.activities.len() {
        let reward = index.reward(a);
        if reward != 0.0 {
            problem.objective.add_term(VarKey::Picked { a }, reward);
        }
    }

    info!(
        formulation = name,
        variables = problem.num_variables(),
        constraints = problem.constraints.len(),
        features = ?applied,
        "模型编译完成"
    );

    Ok(BuiltModel {
        formulation: name,
        amount_mode,
        index,
        relations,
        problem,
        features: applied,
    })
}
