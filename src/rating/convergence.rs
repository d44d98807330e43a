use ndarray::Array1;

/// Largest relative change `|new / old - 1|` across a parameter block
pub fn max_relative_change(old_values: &Array1<f64>, new_values: &Array1<f64>) -> f64 {
    old_values
        .iter()
        .zip(new_values.iter())
        .map(|(&old_val, &new_val)| compute_change(old_val, new_val))
        .fold(0.0, f64::max)
}

fn compute_change(old_val: f64, new_val: f64) -> f64 {
    if old_val > 0.0 {
        (new_val / old_val - 1.0).abs()
    } else {
        (new_val - old_val).abs()
    }
}

pub fn has_converged(max_change: f64, tolerance: f64) -> bool {
    max_change < tolerance
}

pub fn should_continue(iteration: usize, max_iterations: usize) -> bool {
    iteration < max_iterations
}
