use colored::{ColoredString, Colorize};
use std::fmt::Write as _;

use crate::rating::{ConfidenceLevel, RatingsReport};

/// Human-readable leaderboard, equipment table and solver diagnostics
pub fn render_table(report: &RatingsReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", "Athlete ratings".bold());
    let _ = writeln!(
        out,
        "{:>4}  {:<24} {:>10} {:>10} {:>23}  {}",
        "#", "athlete", "strength", "std err", "95% interval", "confidence"
    );

    for entry in &report.leaderboard {
        let interval = report
            .athletes
            .iter()
            .find(|a| a.id == entry.athlete_id)
            .map(|a| format!("[{:.3}, {:.3}]", a.confidence_interval.0, a.confidence_interval.1))
            .unwrap_or_default();

        let _ = writeln!(
            out,
            "{:>4}  {:<24} {:>10.4} {:>10.4} {:>23}  {}",
            entry.rank,
            entry.athlete_id,
            entry.strength,
            entry.standard_error,
            interval,
            paint_confidence(entry.confidence_level)
        );
    }

    if !report.equipment.is_empty() {
        let _ = writeln!(out, "\n{}", "Equipment speed".bold());
        for shell in &report.equipment {
            let _ = writeln!(
                out,
                "      {:<24} {:>10.4}  ({} comparisons)",
                shell.id, shell.speed_parameter, shell.comparisons_in_shell
            );
        }
    }

    let _ = writeln!(out, "\n{}", convergence_line(report));
    for warning in &report.convergence.warnings {
        let _ = writeln!(out, "  {} {}", "warning:".yellow(), warning);
    }

    out
}

fn paint_confidence(level: ConfidenceLevel) -> ColoredString {
    match level {
        ConfidenceLevel::Unranked => level.as_str().red(),
        ConfidenceLevel::Provisional => level.as_str().yellow(),
        ConfidenceLevel::Established => level.as_str().green(),
    }
}

fn convergence_line(report: &RatingsReport) -> String {
    let convergence = &report.convergence;
    let status = if convergence.converged {
        "converged".green()
    } else {
        "not converged".red()
    };

    format!(
        "Solver {} after {} iterations (log-likelihood {:.4})",
        status, convergence.iterations, convergence.final_log_likelihood
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{Comparison, FitOptions, fit_model};

    #[test]
    fn test_table_lists_every_athlete_and_shell() {
        colored::control::set_override(false);
        let comparisons = vec![
            Comparison::new("ana", "ben", true).with_equipment("fast", "slow"),
            Comparison::new("ana", "ben", false).with_equipment("fast", "slow"),
            Comparison::new("ben", "cara", true),
        ];
        let result = fit_model(&comparisons, &FitOptions::with_equipment_bias()).unwrap();
        let table = render_table(&RatingsReport::build(result));

        assert!(table.contains("Athlete ratings"));
        for name in ["ana", "ben", "cara", "fast", "slow"] {
            assert!(table.contains(name), "missing {name}");
        }
        assert!(table.contains("Solver"));
    }

    #[test]
    fn test_table_reports_warnings() {
        colored::control::set_override(false);
        let comparisons = vec![Comparison::new("ana", "ana", true)];
        let result = fit_model(&comparisons, &FitOptions::default()).unwrap();
        let table = render_table(&RatingsReport::build(result));

        assert!(table.contains("warning: no contests between distinct athletes"));
    }
}
