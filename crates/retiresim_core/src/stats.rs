//! Small statistical helpers shared by aggregation and metrics

use std::cmp::Ordering;

/// Sort a sample slice in ascending order, treating incomparable values as equal.
pub fn sort_samples(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
}

/// Interpolated percentile over a pre-sorted slice, `p` in [0, 1].
///
/// Uses linear interpolation between adjacent order statistics, so quantile
/// series stay smooth when the sample count does not divide cleanly.
#[must_use]
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            if lo == hi {
                sorted[lo]
            } else {
                let weight = rank - lo as f64;
                sorted[lo] * (1.0 - weight) + sorted[hi] * weight
            }
        }
    }
}

/// Median of an unsorted sample, by copy.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sort_samples(&mut sorted);
    percentile_sorted(&sorted, 0.5)
}

#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pearson correlation coefficient; 0.0 when either series has no variance.
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let xs = &xs[..n];
    let ys = &ys[..n];
    let mean_x = mean(xs);
    let mean_y = mean(ys);

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }
    covariance / (var_x.sqrt() * var_y.sqrt())
}
