use ndarray::Array1;

/// Rescale a block of ratio-scale parameters so their geometric mean is 1.
///
/// Bradley-Terry likelihoods are invariant to a common factor on every
/// parameter in a block; this pins that free scale after each update.
pub fn normalize_geometric_mean(values: &mut Array1<f64>) {
    let geo_mean = calculate_geometric_mean(values);

    if geo_mean.is_finite() && geo_mean > 0.0 {
        apply_normalization(values, geo_mean);
    }
}

fn calculate_geometric_mean(values: &Array1<f64>) -> f64 {
    let positive: Vec<f64> = values.iter().copied().filter(|&v| v > 0.0).collect();
    if positive.is_empty() {
        return 1.0;
    }

    let log_sum: f64 = positive.iter().map(|v| v.ln()).sum();
    (log_sum / positive.len() as f64).exp()
}

fn apply_normalization(values: &mut Array1<f64>, geo_mean: f64) {
    values.mapv_inplace(|v| v / geo_mean);
}
