//! Small descriptive statistics over `f64` slices.

#[allow(clippy::cast_precision_loss)]
fn len_f64(values: &[f64]) -> f64 {
    values.len() as f64
}

/// Arithmetic mean, or `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / len_f64(values))
}

/// Sample standard deviation (`n - 1` denominator). `0.0` with fewer than
/// two values.
#[must_use]
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values).unwrap_or(0.0);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (len_f64(values) - 1.0)).sqrt()
}

/// Population standard deviation (`n` denominator). `0.0` for an empty slice.
#[must_use]
pub fn population_std(values: &[f64]) -> f64 {
    let Some(m) = mean(values) else {
        return 0.0;
    };
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / len_f64(values)).sqrt()
}

#[must_use]
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
