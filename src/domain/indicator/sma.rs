//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(P[max(0, i-n+1)] .. P[i]), current bar included.
//! Near the start of the series the window is truncated rather than invalid.

pub fn sma(series: &[f64], window: usize, i: usize) -> f64 {
    if series.is_empty() {
        return f64::NAN;
    }
    let end = i.min(series.len() - 1);
    let start = (end + 1).saturating_sub(window.max(1));
    let slice = &series[start..=end];
    slice.iter().sum::<f64>() / slice.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_empty_series_is_nan() {
        assert!(sma(&[], 3, 0).is_nan());
    }

    #[test]
    fn sma_full_window() {
        let closes = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert!((sma(&closes, 3, 2) - 20.0).abs() < 1e-12);
        assert!((sma(&closes, 3, 4) - 40.0).abs() < 1e-12);
    }

    #[test]
    fn sma_truncated_window_at_start() {
        let closes = [10.0, 20.0, 30.0];
        assert!((sma(&closes, 5, 0) - 10.0).abs() < 1e-12);
        assert!((sma(&closes, 5, 1) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn sma_flat_series_equals_price() {
        let closes = [7.5; 10];
        for i in 0..closes.len() {
            assert!((sma(&closes, 4, i) - 7.5).abs() < 1e-12);
        }
    }
}
