pub mod bradley_terry;
mod convergence;
pub mod graph;
mod normalization;
pub mod probability;
pub mod report;
pub mod types;
pub mod uncertainty;

pub use bradley_terry::{fit_model, fit_model_with_settings};
pub use graph::ComparisonGraph;
pub use probability::compute_probability_matrix;
pub use report::{LeaderboardEntry, RatingsReport};
pub use types::{
    AthleteNode, Comparison, ConfidenceLevel, ConvergenceInfo, DegenerateInputWarning,
    EquipmentNode, FitOptions, FitResult,
};
pub use uncertainty::compute_standard_errors;
