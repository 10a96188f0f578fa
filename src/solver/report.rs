// ==========================================
// 资源分配优化器 - glpsol 输出解析
// ==========================================
// 职责:
// - 解析 `glpsol -o` 的可打印报告（状态、目标值、列取值）
// - 识别进度日志中的新最优解行（`+ ... >>>>> 值`）
// ==========================================

use crate::domain::types::TerminationCondition;
use crate::solver::backend::Solution;
use crate::solver::error::{SolverError, SolverResult};
use std::collections::HashMap;

/// 列表中出现在名称与取值之间的非数值标记
const STATUS_TOKENS: [&str; 6] = ["*", "B", "NL", "NU", "NF", "NS"];

/// 报告中 `Status:` 行的取值映射为终止条件
pub fn parse_status(status: &str) -> TerminationCondition {
    let status = status.trim().to_ascii_uppercase();
    if status.contains("NON-OPTIMAL") || status == "FEASIBLE" {
        TerminationCondition::Feasible
    } else if status.contains("OPTIMAL") {
        TerminationCondition::Optimal
    } else if status.contains("EMPTY") || status.starts_with("INFEASIBLE") || status.starts_with("NO PRIMAL") {
        TerminationCondition::Infeasible
    } else {
        TerminationCondition::Error
    }
}

/// 解析可打印报告
pub fn parse_report(text: &str) -> SolverResult<Solution> {
    let mut termination = None;
    let mut objective = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("Status:") {
            termination = Some(parse_status(rest));
        } else if let Some(rest) = trimmed.strip_prefix("Objective:") {
            objective = parse_objective(rest);
        }
        if termination.is_some() && objective.is_some() {
            break;
        }
    }

    let termination = termination.ok_or_else(|| SolverError::Report("缺少 Status 行".to_string()))?;
    let values = if termination.is_success() {
        parse_columns(text)?
    } else {
        HashMap::new()
    };

    Ok(Solution {
        termination,
        objective,
        values,
    })
}

/// `obj = 5 (MAXimum)` -> 5
fn parse_objective(rest: &str) -> Option<f64> {
    let (_, value) = rest.split_once('=')?;
    value.split_whitespace().next()?.parse().ok()
}

/// 列取值表：表头 `Column name` 之后的虚线行开始，空行结束
///
/// 名称过长时 glpsol 会把取值折到下一行
fn parse_columns(text: &str) -> SolverResult<HashMap<String, f64>> {
    let mut lines = text.lines();
    lines
        .by_ref()
        .find(|l| l.contains("Column name"))
        .ok_or_else(|| SolverError::Report("缺少列取值表".to_string()))?;
    lines.next(); // 虚线

    let mut values = HashMap::new();
    let mut pending: Option<String> = None;

    for line in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            break;
        }

        let (name, rest) = match pending.take() {
            Some(name) => (name, &tokens[..]),
            None => {
                if tokens.len() < 2 || tokens[0].parse::<usize>().is_err() {
                    return Err(SolverError::Report(format!("无法识别的列行: {}", line.trim())));
                }
                (tokens[1].to_string(), &tokens[2..])
            }
        };

        if rest.is_empty() {
            pending = Some(name);
            continue;
        }

        let value = rest
            .iter()
            .filter(|t| !STATUS_TOKENS.contains(*t))
            .find_map(|t| t.parse::<f64>().ok())
            .ok_or_else(|| SolverError::Report(format!("列 {} 缺少取值", name)))?;
        values.insert(name, value);
    }

    Ok(values)
}

/// 进度日志中的新最优解行: `+ 1234: >>>>>   5.000000000e+00 <= ...`
pub fn parse_best_line(line: &str) -> Option<f64> {
    if !line.starts_with('+') {
        return None;
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let marker = tokens.iter().take(3).position(|t| *t == ">>>>>")?;
    tokens.get(marker + 1)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTIMAL_REPORT: &str = "\
Problem:    
Rows:       4
Columns:    3 (2 integer, 2 binary)
Non-zeros:  6
Status:     INTEGER OPTIMAL
Objective:  obj = 3 (MAXimum)

   No.   Row name        Activity     Lower bound   Upper bound
------ ------------    ------------- ------------- -------------
     1 req_r0_a0_b0                0            -0             =
     2 cap_r0_b0                   2                           5

   No. Column name       Activity     Lower bound   Upper bound
------ ------------    ------------- ------------- -------------
     1 x_r0_a0      *              1             0             1
     2 amt_r0_a0_b0
                                   2             0               
     3 pick_a0      *              1             0             1

Integer feasibility conditions:

KKT.PE: max.abs.err = 0.00e+00 on row 0

End of output
";

    #[test]
    fn test_parse_optimal_report() {
        let solution = parse_report(OPTIMAL_REPORT).unwrap();
        assert_eq!(solution.termination, TerminationCondition::Optimal);
        assert_eq!(solution.objective, Some(3.0));
        assert_eq!(solution.values.len(), 3);
        assert_eq!(solution.values["x_r0_a0"], 1.0);
        assert_eq!(solution.values["amt_r0_a0_b0"], 2.0);
        assert_eq!(solution.values["pick_a0"], 1.0);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(parse_status("INTEGER OPTIMAL"), TerminationCondition::Optimal);
        assert_eq!(parse_status(" OPTIMAL"), TerminationCondition::Optimal);
        assert_eq!(parse_status("INTEGER NON-OPTIMAL"), TerminationCondition::Feasible);
        assert_eq!(parse_status("FEASIBLE"), TerminationCondition::Feasible);
        assert_eq!(parse_status("INTEGER EMPTY"), TerminationCondition::Infeasible);
        assert_eq!(parse_status("INFEASIBLE (FINAL)"), TerminationCondition::Infeasible);
        assert_eq!(parse_status("INTEGER UNDEFINED"), TerminationCondition::Error);
    }

    #[test]
    fn test_infeasible_report_has_no_values() {
        let report = "Status:     INTEGER EMPTY\nObjective:  obj = 0 (MAXimum)\n";
        let solution = parse_report(report).unwrap();
        assert_eq!(solution.termination, TerminationCondition::Infeasible);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_missing_status() {
        assert!(matches!(parse_report("garbage"), Err(SolverError::Report(_))));
    }

    #[test]
    fn test_lp_column_status_tokens() {
        let report = "\
Status:     OPTIMAL
Objective:  obj = 1 (MAXimum)

   No. Column name    St   Activity     Lower bound   Upper bound    Marginal
------ ------------    -- ------------- ------------- ------------- -------------
     1 pick_a0      NU             1             0             1             1

";
        let solution = parse_report(report).unwrap();
        assert_eq!(solution.values["pick_a0"], 1.0);
    }

    #[test]
    fn test_parse_best_line() {
        assert_eq!(
            parse_best_line("+   123: >>>>>   5.000000000e+00 <=   6.000000000e+00  16.7% (2; 0)"),
            Some(5.0)
        );
        assert_eq!(
            parse_best_line("+   123: mip =   5.000000000e+00 <=     tree is empty   0.0% (0; 1)"),
            None
        );
        assert_eq!(parse_best_line("Integer optimization begins..."), None);
    }
}
