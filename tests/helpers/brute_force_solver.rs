// ==========================================
// 穷举求解器 - 用于集成测试
// ==========================================
// 枚举全部二元变量取值；连续变量由“只含一个连续变量的等式约束”
// （即需求量约束 amt - cost·x = 0）直接解出。只适用于小模型
// ==========================================

use allocation_optimizer::domain::types::TerminationCondition;
use allocation_optimizer::engine::milp::{MilpProblem, Sense, VarKey};
use allocation_optimizer::solver::{AttemptLimits, Solution, SolverBackend, SolverError, SolverResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

const MAX_BINARIES: usize = 22;
const TOL: f64 = 1e-6;

#[derive(Default)]
pub struct BruteForceSolver {
    calls: AtomicU32,
}

impl BruteForceSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// 每个连续变量的定义式: value = (rhs - Σ c·binary) / coef
struct Definition {
    var: VarKey,
    coef: f64,
    rhs: f64,
    binary_terms: Vec<(VarKey, f64)>,
}

fn definitions(problem: &MilpProblem) -> SolverResult<Vec<Definition>> {
    let mut defs = Vec::new();
    for var in &problem.continuous {
        let row = problem
            .constraints
            .iter()
            .find(|c| {
                c.sense == Sense::Eq
                    && c.expr.terms.contains_key(var)
                    && c.expr.terms.keys().filter(|k| !k.is_binary()).count() == 1
            })
            .ok_or_else(|| SolverError::Report(format!("连续变量 {} 没有定义式", var)))?;

        defs.push(Definition {
            var: *var,
            coef: row.expr.terms[var],
            rhs: row.rhs,
            binary_terms: row
                .expr
                .terms
                .iter()
                .filter(|(k, _)| k.is_binary())
                .map(|(k, c)| (*k, *c))
                .collect(),
        });
    }
    Ok(defs)
}

/// 穷举求最优解；并列时取枚举顺序中的第一个
pub fn solve_exhaustive(problem: &MilpProblem) -> SolverResult<Solution> {
    let binaries: Vec<VarKey> = problem.binaries.iter().copied().collect();
    if binaries.len() > MAX_BINARIES {
        return Err(SolverError::Report(format!("二元变量过多: {}", binaries.len())));
    }
    let defs = definitions(problem)?;

    let mut best: Option<(f64, HashMap<VarKey, f64>)> = None;
    for mask in 0u64..(1u64 << binaries.len()) {
        let mut values: HashMap<VarKey, f64> = binaries
            .iter()
            .enumerate()
            .map(|(i, v)| (*v, ((mask >> i) & 1) as f64))
            .collect();
        for def in &defs {
            let fixed: f64 = def.binary_terms.iter().map(|(k, c)| c * values[k]).sum();
            values.insert(def.var, (def.rhs - fixed) / def.coef);
        }

        let value_of = |k: &VarKey| values.get(k).copied().unwrap_or(0.0);
        let continuous_ok = problem.continuous.iter().all(|v| value_of(v) >= -TOL);
        if !continuous_ok || !problem.constraints.iter().all(|c| c.is_satisfied(value_of, TOL)) {
            continue;
        }

        let objective = problem.objective.evaluate(value_of);
        if best.as_ref().map_or(true, |(b, _)| objective > b + TOL) {
            best = Some((objective, values));
        }
    }

    Ok(match best {
        Some((objective, values)) => Solution {
            termination: TerminationCondition::Optimal,
            objective: Some(objective),
            values: values.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        },
        None => Solution {
            termination: TerminationCondition::Infeasible,
            objective: None,
            values: HashMap::new(),
        },
    })
}

#[async_trait]
impl SolverBackend for BruteForceSolver {
    fn name(&self) -> &str {
        "brute_force"
    }

    async fn solve(&self, problem: &MilpProblem, _limits: &AttemptLimits) -> SolverResult<Solution> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        solve_exhaustive(problem)
    }
}
