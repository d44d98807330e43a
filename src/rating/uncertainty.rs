use log::debug;
use nalgebra::DMatrix;

use super::bradley_terry::StrengthFit;
use super::graph::{ComparisonGraph, Contest};
use crate::config::settings::RatingSettings;
use crate::errors::RatingError;

/// Singular values below this are treated as zero by the pseudo-inverse
const PSEUDO_INVERSE_EPS: f64 = 1e-12;

/// Standard errors for every free parameter (athletes first, then equipment)
#[derive(Debug, Clone)]
pub struct ParameterErrors {
    /// Errors of the log-parameters
    pub log_scale: Vec<f64>,
    /// Delta-method errors on the ratio scale
    pub ratio_scale: Vec<f64>,
}

pub fn estimate_errors(
    graph: &ComparisonGraph,
    fit: &StrengthFit,
    settings: &RatingSettings,
) -> ParameterErrors {
    let information = information_matrix(graph, fit, settings.virtual_games_weight);
    let log_scale = log_scale_errors(&information, settings.information_ridge);
    let ratio_scale = to_ratio_scale(&log_scale, &fit.solution());

    ParameterErrors {
        log_scale,
        ratio_scale,
    }
}

/// Observed information (negative Hessian of the regularized log-likelihood)
/// with respect to the log-strengths followed by the log-speeds.
pub fn information_matrix(
    graph: &ComparisonGraph,
    fit: &StrengthFit,
    virtual_games: f64,
) -> DMatrix<f64> {
    let n_athletes = fit.strengths.len();
    let size = n_athletes + fit.speeds.len();
    let mut information = DMatrix::<f64>::zeros(size, size);

    for contest in graph.contests() {
        let winner = fit.strengths[contest.winner] * fit.side_speed(contest.winner_equipment);
        let loser = fit.strengths[contest.loser] * fit.side_speed(contest.loser_equipment);
        let p = winner / (winner + loser);
        let weight = p * (1.0 - p);

        let (entries, len) = design_entries(contest, n_athletes, fit.estimates_equipment());
        for &(i, xi) in &entries[..len] {
            for &(j, xj) in &entries[..len] {
                information[(i, j)] += weight * xi * xj;
            }
        }
    }

    // Ghost games against a neutral opponent of strength 1.0
    for (k, &value) in fit.solution().iter().enumerate() {
        let q = value / (value + 1.0);
        information[(k, k)] += virtual_games * q * (1.0 - q);
    }

    information
}

/// Signed parameter indices of one contest: +1 on the winner's side, -1 on
/// the loser's. Only the first `len` entries are meaningful.
fn design_entries(
    contest: &Contest,
    n_athletes: usize,
    with_equipment: bool,
) -> ([(usize, f64); 4], usize) {
    let mut entries = [(contest.winner, 1.0), (contest.loser, -1.0), (0, 0.0), (0, 0.0)];
    let mut len = 2;

    if with_equipment {
        if let Some(handle) = contest.winner_equipment {
            entries[len] = (n_athletes + handle, 1.0);
            len += 1;
        }
        if let Some(handle) = contest.loser_equipment {
            entries[len] = (n_athletes + handle, -1.0);
            len += 1;
        }
    }

    (entries, len)
}

/// Standard errors from an information matrix: `sqrt(inverse(hessian)[k][k])`.
///
/// `solution` is the fitted parameter vector the matrix was evaluated at; it
/// fixes the expected dimension. Every returned error is finite and positive.
pub fn compute_standard_errors(
    hessian: &[Vec<f64>],
    solution: &[f64],
) -> Result<Vec<f64>, RatingError> {
    let size = solution.len();
    if hessian.len() != size || hessian.iter().any(|row| row.len() != size) {
        return Err(RatingError::DimensionMismatch {
            rows: hessian.len(),
            cols: hessian.first().map_or(0, Vec::len),
            expected: size,
        });
    }

    let matrix = DMatrix::from_fn(size, size, |i, j| hessian[i][j]);
    Ok(log_scale_errors(&matrix, RatingSettings::default().information_ridge))
}

pub fn log_scale_errors(information: &DMatrix<f64>, ridge: f64) -> Vec<f64> {
    let size = information.nrows();
    if size == 0 {
        return Vec::new();
    }

    let sanitized = information.map(|v| if v.is_finite() { v } else { 0.0 });
    let ridge = effective_ridge(&sanitized, ridge);
    let regularized = &sanitized + DMatrix::<f64>::identity(size, size) * ridge;
    let covariance = invert(regularized);

    (0..size)
        .map(|k| {
            let variance = covariance.as_ref().map_or(f64::NAN, |c| c[(k, k)]);
            variance_to_error(variance, sanitized[(k, k)], ridge)
        })
        .collect()
}

/// Ridge scaled to the magnitude of the diagonal, never below `ridge` itself
fn effective_ridge(matrix: &DMatrix<f64>, ridge: f64) -> f64 {
    let scale = matrix.diagonal().iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
    (ridge * scale).max(f64::EPSILON)
}

fn invert(matrix: DMatrix<f64>) -> Option<DMatrix<f64>> {
    if let Some(cholesky) = matrix.clone().cholesky() {
        return Some(cholesky.inverse());
    }

    debug!("Information matrix is not positive definite, using pseudo-inverse");
    matrix.pseudo_inverse(PSEUDO_INVERSE_EPS).ok()
}

fn variance_to_error(variance: f64, diagonal: f64, ridge: f64) -> f64 {
    if variance.is_finite() && variance > 0.0 {
        variance.sqrt()
    } else {
        // Fall back to the marginal information of the parameter alone
        (1.0 / diagonal.max(0.0).max(ridge)).sqrt()
    }
}

fn to_ratio_scale(log_scale: &[f64], solution: &[f64]) -> Vec<f64> {
    log_scale
        .iter()
        .zip(solution)
        .map(|(&se, &value)| {
            if value.is_finite() && value > 0.0 {
                value * se
            } else {
                se
            }
        })
        .collect()
}

/// Symmetric interval on the log scale, mapped back to the ratio scale
pub fn confidence_interval(strength: f64, log_error: f64, z: f64) -> (f64, f64) {
    let log_strength = strength.ln();
    let half_width = z * log_error;
    ((log_strength - half_width).exp(), (log_strength + half_width).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::Comparison;
    use crate::rating::bradley_terry::estimate_strengths;

    #[test]
    fn test_diagonal_matrix_inverts_exactly() {
        let hessian = vec![vec![4.0, 0.0], vec![0.0, 0.25]];
        let errors = compute_standard_errors(&hessian, &[1.0, 1.0]).unwrap();

        assert!((errors[0] - 0.5).abs() < 1e-6);
        assert!((errors[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_errors_ignore_solution_scale() {
        let hessian = vec![vec![4.0, 0.0], vec![0.0, 4.0]];
        let errors = compute_standard_errors(&hessian, &[2.0, 0.5]).unwrap();

        assert!((errors[0] - 0.5).abs() < 1e-6);
        assert!((errors[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ratio_scale_errors_use_delta_method() {
        let comparisons = vec![
            Comparison::new("ana", "ben", true),
            Comparison::new("ana", "ben", true),
            Comparison::new("ana", "ben", false),
        ];
        let graph = ComparisonGraph::build(&comparisons).unwrap();
        let settings = RatingSettings::default();
        let fit = estimate_strengths(&graph, false, &settings);
        let errors = estimate_errors(&graph, &fit, &settings);

        for k in 0..2 {
            let expected = fit.strengths[k] * errors.log_scale[k];
            assert!((errors.ratio_scale[k] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_shared_shell_cancels_in_information() {
        let comparisons = vec![
            Comparison::new("ana", "ben", true).with_equipment("fast", "fast"),
            Comparison::new("ana", "ben", false).with_equipment("fast", "slow"),
        ];
        let graph = ComparisonGraph::build(&comparisons).unwrap();
        let settings = RatingSettings::default();
        let fit = estimate_strengths(&graph, true, &settings);
        let information = information_matrix(&graph, &fit, 0.0);

        // Only the second contest informs the shells
        let p = {
            let winner = fit.strengths[1] * fit.speeds[1];
            let loser = fit.strengths[0] * fit.speeds[0];
            winner / (winner + loser)
        };
        assert!((information[(2, 2)] - p * (1.0 - p)).abs() < 1e-12);
        assert!((information[(2, 3)] + p * (1.0 - p)).abs() < 1e-12);
    }

    #[test]
    fn test_singular_matrix_gives_finite_errors() {
        // Information of a single contest without any prior: rank one
        let hessian = vec![vec![0.25, -0.25], vec![-0.25, 0.25]];
        let errors = compute_standard_errors(&hessian, &[1.0, 1.0]).unwrap();

        assert!(errors.iter().all(|e| e.is_finite() && *e > 0.0));
    }

    #[test]
    fn test_zero_matrix_gives_finite_errors() {
        let hessian = vec![vec![0.0; 3]; 3];
        let errors = compute_standard_errors(&hessian, &[1.0, 1.0, 1.0]).unwrap();

        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.is_finite() && *e > 0.0));
    }

    #[test]
    fn test_non_finite_entries_are_tolerated() {
        let hessian = vec![vec![f64::NAN, 0.0], vec![0.0, f64::INFINITY]];
        let errors = compute_standard_errors(&hessian, &[1.0, 1.0]).unwrap();

        assert!(errors.iter().all(|e| e.is_finite() && *e > 0.0));
    }

    #[test]
    fn test_dimension_mismatch() {
        let hessian = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let err = compute_standard_errors(&hessian, &[1.0]).unwrap_err();

        assert_eq!(
            err,
            RatingError::DimensionMismatch {
                rows: 2,
                cols: 2,
                expected: 1
            }
        );
    }

    #[test]
    fn test_empty_matrix_gives_no_errors() {
        assert_eq!(compute_standard_errors(&[], &[]).unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn test_confidence_interval_stays_positive() {
        let (low, high) = confidence_interval(0.2, 3.0, 1.96);

        assert!(low > 0.0);
        assert!(low < 0.2 && high > 0.2);
        assert!((low * high - 0.04).abs() < 1e-12);
    }
}
