//! Rolling extremes over a strictly-prior window.
//!
//! MAX(n)[i] = max(P[max(0, i-n)] .. P[i-1])
//! The current bar is never part of its own window, so a breakout compares
//! today's close against history only. An empty window (i == 0) yields
//! -inf for the max and +inf for the min.

fn prior_window(series: &[f64], window: usize, i: usize) -> &[f64] {
    let end = i.min(series.len());
    let start = i.saturating_sub(window).min(end);
    &series[start..end]
}

pub fn rolling_max(series: &[f64], window: usize, i: usize) -> f64 {
    prior_window(series, window, i)
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max)
}

pub fn rolling_min(series: &[f64], window: usize, i: usize) -> f64 {
    prior_window(series, window, i)
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min)
}
