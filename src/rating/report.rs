use serde::{Deserialize, Serialize};

use super::probability::compute_probability_matrix;
use super::types::{
    AthleteId, AthleteNode, ConfidenceLevel, ConvergenceInfo, EquipmentNode, FitResult,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub athlete_id: AthleteId,
    pub strength: f64,
    pub standard_error: f64,
    pub confidence_level: ConfidenceLevel,
}

/// Final ratings report handed to the caller.
///
/// `athletes` keeps first-seen order so that row/column `i` of
/// `probability_matrix` refers to `athletes[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingsReport {
    pub athletes: Vec<AthleteNode>,
    pub equipment: Vec<EquipmentNode>,
    pub convergence: ConvergenceInfo,
    pub probability_matrix: Vec<Vec<f64>>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl RatingsReport {
    pub fn build(result: FitResult) -> Self {
        let probability_matrix = compute_probability_matrix(&result.athletes);
        let leaderboard = build_leaderboard(&result.athletes);

        Self {
            athletes: result.athletes,
            equipment: result.equipment,
            convergence: result.convergence,
            probability_matrix,
            leaderboard,
        }
    }

    /// Fitted probability that `athlete` beats `opponent`
    pub fn win_probability(&self, athlete: &str, opponent: &str) -> Option<f64> {
        let i = self.position(athlete)?;
        let j = self.position(opponent)?;
        Some(self.probability_matrix[i][j])
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.athletes.iter().position(|a| a.id == id)
    }
}

/// Ranks by descending strength; ties keep first-seen order
fn build_leaderboard(athletes: &[AthleteNode]) -> Vec<LeaderboardEntry> {
    let mut order: Vec<&AthleteNode> = athletes.iter().collect();
    order.sort_by(|a, b| b.strength.total_cmp(&a.strength));

    order
        .into_iter()
        .enumerate()
        .map(|(idx, athlete)| LeaderboardEntry {
            rank: idx + 1,
            athlete_id: athlete.id.clone(),
            strength: athlete.strength,
            standard_error: athlete.standard_error,
            confidence_level: athlete.confidence_level,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{Comparison, FitOptions, fit_model};

    fn sample_report() -> RatingsReport {
        let comparisons = vec![
            Comparison::new("ana", "ben", false),
            Comparison::new("ana", "ben", false),
            Comparison::new("ana", "ben", true),
            Comparison::new("cara", "ben", true),
            Comparison::new("cara", "ana", true),
            Comparison::new("ana", "cara", true),
        ];
        let result = fit_model(&comparisons, &FitOptions::default()).unwrap();
        RatingsReport::build(result)
    }

    #[test]
    fn test_matrix_matches_athlete_order() {
        let report = sample_report();

        assert_eq!(report.probability_matrix.len(), report.athletes.len());
        let ab = report.win_probability("ana", "ben").unwrap();
        assert_eq!(ab, report.probability_matrix[0][1]);
        assert!(ab < 0.5);
        assert_eq!(report.win_probability("ana", "nobody"), None);
    }

    #[test]
    fn test_leaderboard_is_sorted_by_strength() {
        let report = sample_report();
        let ranks: Vec<usize> = report.leaderboard.iter().map(|e| e.rank).collect();

        assert_eq!(ranks, vec![1, 2, 3]);
        assert!(report
            .leaderboard
            .windows(2)
            .all(|pair| pair[0].strength >= pair[1].strength));
        assert_eq!(report.leaderboard[2].athlete_id, "ana");
    }

    #[test]
    fn test_leaderboard_ties_keep_input_order() {
        let comparisons = vec![
            Comparison::new("ben", "ana", true),
            Comparison::new("ben", "ana", false),
        ];
        let report = RatingsReport::build(fit_model(&comparisons, &FitOptions::default()).unwrap());
        let ids: Vec<&str> = report.leaderboard.iter().map(|e| e.athlete_id.as_str()).collect();

        assert_eq!(ids, vec!["ben", "ana"]);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let json = serde_json::to_value(sample_report()).unwrap();

        assert!(json["probabilityMatrix"].is_array());
        assert!(json["convergence"]["finalLogLikelihood"].is_number());
        assert!(json["athletes"][0]["standardError"].is_number());
    }
}
