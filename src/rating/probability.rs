use ndarray::Array2;

use super::types::AthleteNode;

/// Probability reported for an athlete against themselves
const SELF_PROBABILITY: f64 = 0.5;

/// Dense `n x n` matrix where `[i][j]` is the fitted probability that
/// athlete `i` beats athlete `j`.
pub fn compute_probability_matrix(athletes: &[AthleteNode]) -> Vec<Vec<f64>> {
    let strengths: Vec<f64> = athletes.iter().map(|a| a.strength).collect();

    probability_array(&strengths)
        .outer_iter()
        .map(|row| row.to_vec())
        .collect()
}

pub fn probability_array(strengths: &[f64]) -> Array2<f64> {
    let n = strengths.len();
    Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            SELF_PROBABILITY
        } else {
            win_probability(strengths[i], strengths[j])
        }
    })
}

pub fn win_probability(strength: f64, opponent: f64) -> f64 {
    let total = strength + opponent;
    if total > 0.0 && total.is_finite() {
        strength / total
    } else {
        SELF_PROBABILITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::types::ConfidenceLevel;

    fn node(id: &str, strength: f64) -> AthleteNode {
        AthleteNode {
            id: id.to_string(),
            strength,
            standard_error: 0.1,
            confidence_interval: (strength * 0.9, strength * 1.1),
            comparisons: 4,
            confidence_level: ConfidenceLevel::Provisional,
        }
    }

    #[test]
    fn test_empty_input_gives_empty_matrix() {
        assert!(compute_probability_matrix(&[]).is_empty());
    }

    #[test]
    fn test_entries_and_diagonal() {
        let matrix = compute_probability_matrix(&[node("ana", 3.0), node("ben", 1.0)]);

        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0][0], 0.5);
        assert_eq!(matrix[1][1], 0.5);
        assert!((matrix[0][1] - 0.75).abs() < 1e-12);
        assert!((matrix[1][0] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_complementary_entries_sum_to_one() {
        let matrix = compute_probability_matrix(&[node("a", 0.3), node("b", 2.0), node("c", 7.5)]);

        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    assert!((matrix[i][j] + matrix[j][i] - 1.0).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_invariant_to_common_scale() {
        let base = compute_probability_matrix(&[node("a", 0.4), node("b", 1.3), node("c", 2.2)]);
        let scaled =
            compute_probability_matrix(&[node("a", 40.0), node("b", 130.0), node("c", 220.0)]);

        for (row, scaled_row) in base.iter().zip(&scaled) {
            for (p, q) in row.iter().zip(scaled_row) {
                assert!((p - q).abs() < 1e-12);
            }
        }
    }
}
