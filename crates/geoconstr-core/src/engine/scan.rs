use super::error::ConstraintError;

/// `steps` evenly spaced values from `start` to `stop`, both included.
///
/// One step gives `[start]`; zero steps give an empty vector. The last value is set to
/// `stop` exactly rather than accumulated.
pub fn linspace(start: f64, stop: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let delta = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + i as f64 * delta).collect();
            values[n - 1] = stop;
            values
        }
    }
}

/// Interpolates linearly between two value vectors.
///
/// Returns `steps` vectors of `initial.len()` components each: the outer index is the
/// step, the inner index the component. Step `0` equals `initial` and step
/// `steps - 1` equals `final_values` exactly when `steps >= 2`.
///
/// # Errors
///
/// Returns [`ConstraintError::DimensionMismatch`] if the two vectors differ in length.
pub fn one_dimensional_scan(
    initial: &[f64],
    final_values: &[f64],
    steps: usize,
) -> Result<Vec<Vec<f64>>, ConstraintError> {
    if initial.len() != final_values.len() {
        return Err(ConstraintError::DimensionMismatch {
            initial: initial.len(),
            final_len: final_values.len(),
        });
    }
    let per_component: Vec<Vec<f64>> = initial
        .iter()
        .zip(final_values)
        .map(|(&a, &b)| linspace(a, b, steps))
        .collect();
    Ok((0..steps)
        .map(|step| per_component.iter().map(|c| c[step]).collect())
        .collect())
}
