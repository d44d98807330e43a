#[derive(Debug, Clone, PartialEq)]
pub struct RatingSettings {
    /// Pseudo-games each athlete (and equipment unit) plays against a neutral
    /// ghost of strength 1.0, split evenly between wins and losses
    pub virtual_games_weight: f64,
    pub convergence_tolerance: f64,
    pub max_iterations: usize,
    /// Diagonal ridge added to the information matrix before inversion
    pub information_ridge: f64,
    /// Normal quantile used for confidence intervals
    pub confidence_z: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            virtual_games_weight: 0.1,
            convergence_tolerance: 1e-6,
            max_iterations: 1000,
            information_ridge: 1e-9,
            confidence_z: 1.96,
        }
    }
}

impl RatingSettings {
    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        if let Some(value) = max_iterations {
            self.max_iterations = value.max(1);
        }
        self
    }

    pub fn with_tolerance(mut self, tolerance: Option<f64>) -> Self {
        if let Some(value) = tolerance.filter(|t| t.is_finite() && *t > 0.0) {
            self.convergence_tolerance = value;
        }
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub rating: RatingSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
