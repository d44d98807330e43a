use log::{debug, info, warn};
use ndarray::{Array1, Zip};

use super::convergence::{has_converged, max_relative_change, should_continue};
use super::graph::ComparisonGraph;
use super::normalization::normalize_geometric_mean;
use super::types::{
    AthleteNode, Comparison, ConfidenceLevel, ConvergenceInfo, DegenerateInputWarning,
    EquipmentNode, FitOptions, FitResult,
};
use super::uncertainty::{self, ParameterErrors};
use crate::config::settings::RatingSettings;
use crate::errors::RatingError;

const INITIAL_STRENGTH: f64 = 1.0;

/// Fits athlete strengths (and equipment speeds when requested) with the
/// default rating settings.
pub fn fit_model(
    comparisons: &[Comparison],
    options: &FitOptions,
) -> Result<FitResult, RatingError> {
    fit_model_with_settings(comparisons, options, &RatingSettings::default())
}

pub fn fit_model_with_settings(
    comparisons: &[Comparison],
    options: &FitOptions,
    settings: &RatingSettings,
) -> Result<FitResult, RatingError> {
    info!("Fitting Bradley-Terry model to {} comparisons", comparisons.len());

    // 1. Index athletes, equipment and head-to-head tallies
    let graph = ComparisonGraph::build(comparisons)?;
    info!(
        "Found {} unique athletes and {} equipment units ({} self-comparisons ignored)",
        graph.athlete_count(),
        graph.equipment_count(),
        graph.self_comparisons()
    );

    // 2. Equipment is only estimated when some contest pairs two named units
    let estimate_equipment = options.include_equipment_bias && graph.has_paired_equipment();
    if options.include_equipment_bias && !estimate_equipment {
        info!("No paired equipment data, fitting athlete strengths only");
    }

    // 3. Run the MM solver, or short-circuit when there is nothing to contrast
    let fit = if graph.contests().is_empty() {
        StrengthFit::neutral(graph.athlete_count())
    } else {
        estimate_strengths(&graph, estimate_equipment, settings)
    };

    // 4. Collect non-fatal diagnostics
    let warnings = detect_warnings(&graph, &fit);
    for warning in &warnings {
        warn!("Degenerate input: {}", warning);
    }

    // 5. Standard errors from the observed information matrix
    let errors = uncertainty::estimate_errors(&graph, &fit, settings);

    Ok(build_fit_result(&graph, &fit, &errors, warnings, settings))
}

/// Fitted ratio-scale parameters. `speeds` is empty when equipment is not estimated.
#[derive(Debug, Clone)]
pub struct StrengthFit {
    pub strengths: Array1<f64>,
    pub speeds: Array1<f64>,
    pub iterations: usize,
    pub converged: bool,
}

impl StrengthFit {
    fn neutral(n_athletes: usize) -> Self {
        Self {
            strengths: Array1::from_elem(n_athletes, INITIAL_STRENGTH),
            speeds: Array1::zeros(0),
            iterations: 0,
            converged: true,
        }
    }

    pub fn estimates_equipment(&self) -> bool {
        !self.speeds.is_empty()
    }

    /// Speed multiplier for one side of a contest; neutral when absent
    pub fn side_speed(&self, equipment: Option<usize>) -> f64 {
        match equipment {
            Some(handle) if self.estimates_equipment() => self.speeds[handle],
            _ => INITIAL_STRENGTH,
        }
    }

    /// Athlete strengths followed by equipment speeds
    pub fn solution(&self) -> Vec<f64> {
        self.strengths.iter().chain(self.speeds.iter()).copied().collect()
    }
}

/// Block-alternating MM (Zermelo) iteration over athletes, then equipment.
///
/// Every parameter also plays `virtual_games_weight` games against a ghost
/// of strength 1.0, winning half, which keeps undefeated and winless
/// athletes finite.
pub fn estimate_strengths(
    graph: &ComparisonGraph,
    estimate_equipment: bool,
    settings: &RatingSettings,
) -> StrengthFit {
    let n_equipment = if estimate_equipment { graph.equipment_count() } else { 0 };
    let mut fit = StrengthFit {
        strengths: Array1::from_elem(graph.athlete_count(), INITIAL_STRENGTH),
        speeds: Array1::from_elem(n_equipment, INITIAL_STRENGTH),
        iterations: 0,
        converged: false,
    };

    let mut iteration = 0;
    while should_continue(iteration, settings.max_iterations) {
        let updated = update_athletes(graph, &fit, settings.virtual_games_weight);
        let previous = std::mem::replace(&mut fit.strengths, updated);
        let mut max_change = max_relative_change(&previous, &fit.strengths);

        if fit.estimates_equipment() {
            let updated = update_equipment(graph, &fit, settings.virtual_games_weight);
            let previous = std::mem::replace(&mut fit.speeds, updated);
            max_change = max_change.max(max_relative_change(&previous, &fit.speeds));
        }

        iteration += 1;
        debug!("Iteration {}: max relative change {:.3e}", iteration, max_change);

        if has_converged(max_change, settings.convergence_tolerance) {
            fit.converged = true;
            break;
        }
    }

    fit.iterations = iteration;
    if fit.converged {
        info!("MM algorithm converged in {} iterations", iteration);
    }
    fit
}

fn update_athletes(
    graph: &ComparisonGraph,
    fit: &StrengthFit,
    virtual_games: f64,
) -> Array1<f64> {
    let strengths = &fit.strengths;
    let mut wins = Array1::from_elem(strengths.len(), 0.5 * virtual_games);
    let mut denominators = strengths.mapv(|s| virtual_games / (s + 1.0));

    for contest in graph.contests() {
        let winner_speed = fit.side_speed(contest.winner_equipment);
        let loser_speed = fit.side_speed(contest.loser_equipment);
        let total =
            strengths[contest.winner] * winner_speed + strengths[contest.loser] * loser_speed;

        wins[contest.winner] += 1.0;
        denominators[contest.winner] += winner_speed / total;
        denominators[contest.loser] += loser_speed / total;
    }

    let mut updated = apply_update(&wins, &denominators, strengths);
    normalize_geometric_mean(&mut updated);
    updated
}

fn update_equipment(
    graph: &ComparisonGraph,
    fit: &StrengthFit,
    virtual_games: f64,
) -> Array1<f64> {
    let strengths = &fit.strengths;
    let speeds = &fit.speeds;
    let mut wins = Array1::from_elem(speeds.len(), 0.5 * virtual_games);
    let mut denominators = speeds.mapv(|e| virtual_games / (e + 1.0));

    for contest in graph.contests() {
        let winner_strength = strengths[contest.winner];
        let loser_strength = strengths[contest.loser];
        let total = winner_strength * fit.side_speed(contest.winner_equipment)
            + loser_strength * fit.side_speed(contest.loser_equipment);

        if let Some(handle) = contest.winner_equipment {
            wins[handle] += 1.0;
            denominators[handle] += winner_strength / total;
        }
        if let Some(handle) = contest.loser_equipment {
            denominators[handle] += loser_strength / total;
        }
    }

    let mut updated = apply_update(&wins, &denominators, speeds);
    normalize_geometric_mean(&mut updated);
    updated
}

fn apply_update(
    wins: &Array1<f64>,
    denominators: &Array1<f64>,
    current: &Array1<f64>,
) -> Array1<f64> {
    Zip::from(wins)
        .and(denominators)
        .and(current)
        .map_collect(|&w, &d, &old| {
            let value = w / d;
            if d > 0.0 && value.is_finite() && value > 0.0 {
                value
            } else {
                // Parameter with no information keeps its previous value
                old
            }
        })
}

/// Unregularized log-likelihood of the observed contests
pub fn log_likelihood(graph: &ComparisonGraph, fit: &StrengthFit) -> f64 {
    graph
        .contests()
        .iter()
        .map(|contest| {
            let winner = fit.strengths[contest.winner] * fit.side_speed(contest.winner_equipment);
            let loser = fit.strengths[contest.loser] * fit.side_speed(contest.loser_equipment);
            (winner / (winner + loser)).ln()
        })
        .sum()
}

fn detect_warnings(graph: &ComparisonGraph, fit: &StrengthFit) -> Vec<DegenerateInputWarning> {
    let mut warnings = Vec::new();

    if graph.contests().is_empty() {
        warnings.push(DegenerateInputWarning::NoContrasts);
        return warnings;
    }

    for (idx, athlete) in graph.athletes().iter().enumerate() {
        let contests = graph.contests_for(idx);
        if contests == 0 {
            continue;
        }
        let undefeated = graph.wins_for(idx) == contests;
        if undefeated || graph.losses_for(idx) == contests {
            warnings.push(DegenerateInputWarning::CompleteSeparation {
                athlete: athlete.clone(),
                undefeated,
            });
        }
    }

    let components = graph.component_count();
    if components > 1 {
        warnings.push(DegenerateInputWarning::DisconnectedGraph { components });
    }

    if !fit.converged {
        warnings.push(DegenerateInputWarning::NotConverged {
            iterations: fit.iterations,
        });
    }

    warnings
}

fn build_fit_result(
    graph: &ComparisonGraph,
    fit: &StrengthFit,
    errors: &ParameterErrors,
    warnings: Vec<DegenerateInputWarning>,
    settings: &RatingSettings,
) -> FitResult {
    let athletes = graph
        .athletes()
        .iter()
        .enumerate()
        .map(|(idx, id)| build_athlete_node(graph, fit, errors, settings, idx, id))
        .collect();

    let equipment = if fit.estimates_equipment() {
        graph
            .equipment()
            .iter()
            .enumerate()
            .map(|(idx, id)| EquipmentNode {
                id: id.clone(),
                speed_parameter: fit.speeds[idx],
                comparisons_in_shell: graph.equipment_comparisons(idx),
            })
            .collect()
    } else {
        Vec::new()
    };

    FitResult {
        athletes,
        equipment,
        convergence: ConvergenceInfo {
            iterations: fit.iterations,
            converged: fit.converged,
            final_log_likelihood: log_likelihood(graph, fit),
            warnings,
        },
    }
}

fn build_athlete_node(
    graph: &ComparisonGraph,
    fit: &StrengthFit,
    errors: &ParameterErrors,
    settings: &RatingSettings,
    idx: usize,
    id: &str,
) -> AthleteNode {
    let strength = fit.strengths[idx];
    let comparisons = graph.contests_for(idx);

    AthleteNode {
        id: id.to_string(),
        strength,
        standard_error: errors.ratio_scale[idx],
        confidence_interval: uncertainty::confidence_interval(
            strength,
            errors.log_scale[idx],
            settings.confidence_z,
        ),
        comparisons,
        confidence_level: ConfidenceLevel::from_comparisons(comparisons),
    }
}
