// ==========================================
// 资源分配优化器 - MILP 问题表示
// ==========================================
// 职责: 决策变量键、线性表达式、约束、问题对象，及 CPLEX LP 文本输出
// 变量:
// - ALLOCATED(r,a)        二元  x_r{r}_a{a}
// - ALLOCATED_AMT(r,a,b)  连续≥0 amt_r{r}_a{a}_b{b}
// - PICKED(a)             二元  pick_a{a}
// ==========================================

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

const EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VarKey {
    Allocated { r: usize, a: usize },
    Amount { r: usize, a: usize, b: usize },
    Picked { a: usize },
}

impl VarKey {
    pub fn is_binary(&self) -> bool {
        !matches!(self, VarKey::Amount { .. })
    }
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarKey::Allocated { r, a } => write!(f, "x_r{}_a{}", r, a),
            VarKey::Amount { r, a, b } => write!(f, "amt_r{}_a{}_b{}", r, a, b),
            VarKey::Picked { a } => write!(f, "pick_a{}", a),
        }
    }
}

// ==========================================
// LinearExpr - 线性表达式
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    pub terms: BTreeMap<VarKey, f64>,
}

impl LinearExpr {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_var(v: VarKey, c: f64) -> Self {
        let mut e = Self::zero();
        e.add_term(v, c);
        e
    }

    pub fn add_term(&mut self, v: VarKey, c: f64) {
        let entry = self.terms.entry(v).or_insert(0.0);
        *entry += c;
        if entry.abs() <= EPS {
            self.terms.remove(&v);
        }
    }

    /// Σ vars（系数均为 1）
    pub fn sum<I: IntoIterator<Item = VarKey>>(vars: I) -> Self {
        let mut e = Self::zero();
        for v in vars {
            e.add_term(v, 1.0);
        }
        e
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// 按给定取值求值（缺失变量视为 0）
    pub fn evaluate(&self, value_of: impl Fn(&VarKey) -> f64) -> f64 {
        self.terms.iter().map(|(k, c)| c * value_of(k)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    /// 左端（右端常数移入 rhs）
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    pub fn new(name: impl Into<String>, expr: LinearExpr, sense: Sense, rhs: f64) -> Self {
        Self {
            name: name.into(),
            expr,
            sense,
            rhs,
        }
    }

    /// 在给定取值下是否满足（容差 tol）
    pub fn is_satisfied(&self, value_of: impl Fn(&VarKey) -> f64, tol: f64) -> bool {
        let lhs = self.expr.evaluate(value_of);
        match self.sense {
            Sense::Le => lhs <= self.rhs + tol,
            Sense::Ge => lhs >= self.rhs - tol,
            Sense::Eq => (lhs - self.rhs).abs() <= tol,
        }
    }
}

// ==========================================
// MilpProblem - 最大化问题
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilpProblem {
    pub objective: LinearExpr,
    pub constraints: Vec<Constraint>,
    pub binaries: BTreeSet<VarKey>,
    pub continuous: BTreeSet<VarKey>,
}

impl MilpProblem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, v: VarKey) {
        if v.is_binary() {
            self.binaries.insert(v);
        } else {
            self.continuous.insert(v);
        }
    }

    /// 添加约束；左端为空的约束没有意义，直接丢弃
    pub fn add_constraint(&mut self, c: Constraint) {
        if c.expr.is_empty() {
            tracing::trace!(name = %c.name, "丢弃空约束");
            return;
        }
        self.constraints.push(c);
    }

    pub fn num_variables(&self) -> usize {
        self.binaries.len() + self.continuous.len()
    }

    /// 以某个名称前缀开头的约束数（按约束族统计）
    pub fn count_family(&self, prefix: &str) -> usize {
        self.constraints
            .iter()
            .filter(|c| c.name.starts_with(prefix))
            .count()
    }

    /// 输出 CPLEX LP 格式文本
    pub fn to_lp(&self) -> String {
        let mut out = String::new();
        out.push_str("\\ allocation model\n");
        out.push_str("Maximize\n obj: ");
        out.push_str(&fmt_objective(&self.objective, self.binaries.iter().next()));
        out.push('\n');
        out.push_str("Subject To\n");
        for c in &self.constraints {
            out.push_str(&format!(
                " {}: {} {} {}\n",
                c.name,
                fmt_lin(&c.expr),
                fmt_sense(c.sense),
                fmt_num(c.rhs)
            ));
        }
        if !self.binaries.is_empty() {
            out.push_str("Binary\n");
            for b in &self.binaries {
                out.push_str(&format!(" {}\n", b));
            }
        }
        out.push_str("End\n");
        out
    }
}

fn fmt_sense(s: Sense) -> &'static str {
    match s {
        Sense::Le => "<=",
        Sense::Ge => ">=",
        Sense::Eq => "=",
    }
}

/// 整数值按整数写出；超出 i64 精度范围的保持浮点写法
fn fmt_num(v: f64) -> String {
    if v.abs() < 1e15 && (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{}", v)
    }
}

fn fmt_coef(c: f64) -> String {
    if c >= 0.0 {
        format!("+{}", fmt_num(c))
    } else {
        fmt_num(c)
    }
}

fn fmt_lin(e: &LinearExpr) -> String {
    let mut parts: Vec<String> = vec![];
    for (n, c) in &e.terms {
        parts.push(format!("{} {}", fmt_coef(*c), n));
    }
    if parts.is_empty() {
        parts.push("0".to_string());
    }
    parts.join(" ")
}

/// 目标全为零系数时仍需引用一个变量，保证 LP 文本合法
fn fmt_objective(e: &LinearExpr, fallback: Option<&VarKey>) -> String {
    match (e.is_empty(), fallback) {
        (true, Some(v)) => format!("0 {}", v),
        _ => fmt_lin(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num_int() {
        assert_eq!(fmt_num(3.0), "3");
        assert_eq!(fmt_num(-2.0), "-2");
        assert_eq!(fmt_num(1.5), "1.5");
        assert_eq!(fmt_num(1e19), "10000000000000000000");
        assert_eq!(fmt_num(-3e20), "-300000000000000000000");
        assert_eq!(fmt_coef(2.0), "+2");
        assert_eq!(fmt_coef(-0.25), "-0.25");
    }

    #[test]
    fn test_var_names() {
        assert_eq!(VarKey::Allocated { r: 1, a: 2 }.to_string(), "x_r1_a2");
        assert_eq!(VarKey::Amount { r: 0, a: 3, b: 1 }.to_string(), "amt_r0_a3_b1");
        assert_eq!(VarKey::Picked { a: 7 }.to_string(), "pick_a7");
    }

    #[test]
    fn test_opposite_terms_cancel() {
        let x = VarKey::Allocated { r: 0, a: 0 };
        let y = VarKey::Picked { a: 0 };
        let mut e = LinearExpr::from_var(x, 1.0);
        e.add_term(y, -2.0);
        e.add_term(x, -1.0);

        assert!(!e.terms.contains_key(&x));
        assert_eq!(e.terms[&y], -2.0);
    }

    #[test]
    fn test_constraint_satisfied() {
        let x = VarKey::Allocated { r: 0, a: 0 };
        let c = Constraint::new("c", LinearExpr::from_var(x, 2.0), Sense::Le, 1.0);
        assert!(c.is_satisfied(|_| 0.0, 1e-9));
        assert!(!c.is_satisfied(|_| 1.0, 1e-9));
    }

    #[test]
    fn test_emit_lp() {
        let x = VarKey::Allocated { r: 0, a: 0 };
        let amt = VarKey::Amount { r: 0, a: 0, b: 0 };
        let pick = VarKey::Picked { a: 0 };

        let mut problem = MilpProblem::new();
        for v in [x, amt, pick] {
            problem.declare(v);
        }
        problem.objective = LinearExpr::from_var(pick, 3.0);
        let mut req = LinearExpr::from_var(amt, 1.0);
        req.add_term(x, -2.5);
        problem.add_constraint(Constraint::new("req_r0_a0_b0", req, Sense::Eq, 0.0));

        let lp = problem.to_lp();
        assert!(lp.contains("Maximize\n obj: +3 pick_a0\n"));
        assert!(lp.contains(" req_r0_a0_b0: -2.5 x_r0_a0 +1 amt_r0_a0_b0 = 0\n"));
        assert!(lp.contains("Binary\n x_r0_a0\n pick_a0\n"));
        assert!(lp.ends_with("End\n"));
        assert_eq!(problem.num_variables(), 3);
        assert_eq!(problem.count_family("req_"), 1);
    }

    #[test]
    fn test_empty_objective_references_variable() {
        let pick = VarKey::Picked { a: 0 };
        let mut problem = MilpProblem::new();
        problem.declare(pick);
        assert!(problem.to_lp().contains(" obj: 0 pick_a0\n"));
    }
}
