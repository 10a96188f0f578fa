// ==========================================
// 资源分配优化器 - 生命周期编排器
// ==========================================

use crate::config::OptimizerConfig;
use crate::domain::graph::AllocationGraph;
use crate::domain::output::OptimizerOutput;
use crate::domain::types::OptimizerState;
use crate::domain::validation::{has_fatal, ValidationIssue};
use crate::engine::extractor::extract;
use crate::engine::formulation::{default_formulations, BuiltModel, Formulation};
use crate::engine::selector::select;
use crate::importer::graph_source::GraphSource;
use crate::importer::validator::GraphValidator;
use crate::perf::{HistoryEntry, OperationHistory, PerfGuard};
use crate::solver::{solve_with_retries, GlpkSolver, SolverBackend};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::error::{OptimizerError, OptimizerResult};

// ==========================================
// Optimizer - 生命周期编排器
// ==========================================
// 状态由已持有的数据决定：
// graph -> INGESTED，model -> BUILT，output -> SOLVED
pub struct Optimizer {
    config: OptimizerConfig,
    backend: Arc<dyn SolverBackend>,
    formulations: Vec<Box<dyn Formulation>>,
    validator: GraphValidator,

    graph: Option<AllocationGraph>,
    model: Option<BuiltModel>,
    output: Option<OptimizerOutput>,

    history: OperationHistory,
}

impl Optimizer {
    /// 使用 glpsol 后端创建编排器
    ///
    /// # 参数
    /// - config: 优化器配置（会先做合法性校验）
    pub fn new(config: OptimizerConfig) -> OptimizerResult<Self> {
        let backend = GlpkSolver::new(
            config.solver_path.clone(),
            config.workspace(),
            config.watch_settings(),
        );
        Self::with_backend(config, Arc::new(backend))
    }

    /// 使用指定求解后端创建编排器
    pub fn with_backend(config: OptimizerConfig, backend: Arc<dyn SolverBackend>) -> OptimizerResult<Self> {
        config.validate()?;
        info!(backend = backend.name(), max_attempts = config.max_attempts, "优化器已创建");

        Ok(Self {
            config,
            backend,
            formulations: default_formulations(),
            validator: GraphValidator::new(),
            graph: None,
            model: None,
            output: None,
            history: OperationHistory::new(),
        })
    }

    /// 替换候选模型形式列表（顺序即优先级）
    pub fn with_formulations(mut self, formulations: Vec<Box<dyn Formulation>>) -> Self {
        self.formulations = formulations;
        self
    }

    // ==========================================
    // 状态查询
    // ==========================================

    pub fn state(&self) -> OptimizerState {
        if self.output.is_some() {
            OptimizerState::Solved
        } else if self.model.is_some() {
            OptimizerState::Built
        } else if self.graph.is_some() {
            OptimizerState::Ingested
        } else {
            OptimizerState::Uningested
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn graph(&self) -> Option<&AllocationGraph> {
        self.graph.as_ref()
    }

    pub fn model(&self) -> Option<&BuiltModel> {
        self.model.as_ref()
    }

    pub fn output(&self) -> Option<&OptimizerOutput> {
        self.output.as_ref()
    }

    /// 各步骤耗时历史
    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 导入输入图（无上游校验记录）
    pub fn ingest(&mut self, graph: AllocationGraph) -> OptimizerResult<Vec<ValidationIssue>> {
        self.ingest_with_issues(graph, Vec::new())
    }

    /// 导入输入图，并合并上游导入层的校验记录
    ///
    /// # 返回
    /// 全部非致命问题；存在致命问题时返回 ValidationFailed，已有状态保持不变
    pub fn ingest_with_issues(
        &mut self,
        graph: AllocationGraph,
        upstream: Vec<ValidationIssue>,
    ) -> OptimizerResult<Vec<ValidationIssue>> {
        let perf = PerfGuard::new("ingest");

        let mut issues = upstream;
        issues.extend(self.validator.validate(&graph));

        if has_fatal(&issues) {
            for issue in issues.iter().filter(|i| i.is_fatal()) {
                error!(code = %issue.code, offender = %issue.offender, "{}", issue.text);
            }
            return Err(OptimizerError::ValidationFailed(issues));
        }
        for issue in &issues {
            warn!(code = %issue.code, offender = %issue.offender, "{}", issue.text);
        }

        info!(
            resources = graph.resource_instances.iter().map(|g| g.instance_table.len()).sum::<usize>(),
            activities = graph.activity_instances.iter().map(|g| g.instance_table.len()).sum::<usize>(),
            links = graph.allocation_instances.len(),
            constraints = graph.allocation_constraints.len(),
            warnings = issues.len(),
            "输入图已导入"
        );

        self.graph = Some(graph);
        self.model = None;
        self.output = None;
        self.history.push(perf.finish());
        Ok(issues)
    }

    /// 从输入图来源加载并导入
    pub fn ingest_from(&mut self, source: &dyn GraphSource) -> OptimizerResult<Vec<ValidationIssue>> {
        debug!(source = %source.describe(), "加载输入图");
        let graph = source.load()?;
        self.ingest(graph)
    }

    /// 更新活动奖励；输入图变化后需重新建模
    ///
    /// # 参数
    /// - rewards: 活动实例名 -> 新奖励值（任一名称未知时不做任何修改）
    pub fn update_rewards(&mut self, rewards: &HashMap<String, f64>) -> OptimizerResult<()> {
        let graph = self.graph.as_mut().ok_or(OptimizerError::NotIngested)?;

        let known: Vec<String> = graph
            .activity_instances
            .iter()
            .flat_map(|g| g.instance_table.iter().map(|i| i.instance_name.clone()))
            .collect();
        if let Some(unknown) = rewards.keys().find(|name| !known.contains(*name)) {
            return Err(OptimizerError::UnknownActivity(unknown.clone()));
        }

        for instance in graph.activity_instances_mut() {
            if let Some(reward) = rewards.get(&instance.instance_name) {
                instance.reward = *reward;
            }
        }

        self.model = None;
        self.output = None;
        info!(updated = rewards.len(), "活动奖励已更新，需重新建模");
        Ok(())
    }

    // ==========================================
    // 建模
    // ==========================================

    pub fn build(&mut self) -> OptimizerResult<&BuiltModel> {
        let graph = self.graph.as_ref().ok_or(OptimizerError::NotIngested)?;

        let perf = PerfGuard::new("select");
        let formulation = select(&self.formulations, graph)?;
        self.history.push(perf.finish());

        let perf = PerfGuard::new("build");
        let model = formulation.build(graph)?;
        self.history.push(perf.finish());

        info!(
            formulation = model.formulation,
            resources = model.index.resources.len(),
            activities = model.index.activities.len(),
            budgets = model.index.budgets.len(),
            arcs = model.relations.arcs.len(),
            constraints = model.problem.constraints.len(),
            "模型已构建"
        );

        self.output = None;
        let model: &BuiltModel = self.model.insert(model);
        Ok(model)
    }

    // ==========================================
    // 求解
    // ==========================================

    /// 求解；未建模时先自动建模
    ///
    /// # 参数
    /// - max_attempts: 最大尝试次数（为空取配置）
    /// - initial_timeout: 首次时限（为空取配置）
    /// - mip_gap: 相对 MIP gap（为空取配置）
    pub async fn solve(
        &mut self,
        max_attempts: Option<u32>,
        initial_timeout: Option<Duration>,
        mip_gap: Option<f64>,
    ) -> OptimizerResult<&OptimizerOutput> {
        if self.model.is_none() {
            debug!("尚未建模，自动执行 build");
            self.build()?;
        }
        let model = self.model.as_ref().ok_or(OptimizerError::NotIngested)?;
        let policy = self.config.retry_policy(max_attempts, initial_timeout, mip_gap);

        let perf = PerfGuard::new("solve");
        let outcome = match solve_with_retries(self.backend.as_ref(), &model.problem, &policy).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "求解失败");
                return Err(e.into());
            }
        };
        self.history.push(perf.finish());

        let perf = PerfGuard::new("extract");
        let output = extract(model, &outcome.solution, outcome.attempts);
        self.history.push(perf.finish());

        let output: &OptimizerOutput = self.output.insert(output);
        Ok(output)
    }

    /// 按配置默认值求解
    pub async fn solve_with_defaults(&mut self) -> OptimizerResult<&OptimizerOutput> {
        self.solve(None, None, None).await
    }

    /// 读取结果；尚未求解时自动补齐建模与求解
    pub async fn get_output(&mut self) -> OptimizerResult<&OptimizerOutput> {
        if self.output.is_none() {
            debug!(state = %self.state(), "尚未求解，自动补齐前置步骤");
            return self.solve_with_defaults().await;
        }
        self.output.as_ref().ok_or(OptimizerError::NotIngested)
    }
}
