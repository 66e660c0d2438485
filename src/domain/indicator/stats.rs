//! Whole-series statistics feeding the adaptive strategy defaults.

/// Mean of |C[i] / C[i-1] - 1| over the series; 0 for fewer than two
/// usable closes. Pairs with a non-positive or non-finite previous close are
/// skipped.
pub fn mean_abs_daily_return(closes: &[f64]) -> f64 {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0].is_finite() && w[0] > 0.0 && w[1].is_finite())
        .map(|w| (w[1] / w[0] - 1.0).abs())
        .collect();
    if returns.is_empty() {
        return 0.0;
    }
    returns.iter().sum::<f64>() / returns.len() as f64
}

/// Mean of the finite values; NaN when there are none.
pub fn mean_finite(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
