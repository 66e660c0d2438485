//! Average True Range, Wilder smoothing.
//!
//! TR[0] uses the bar's own close as prev close. Seed ATR is the mean of the
//! first n true ranges (at index n-1), then
//! ATR[i] = (ATR[i-1] * (n-1) + TR[i]) / n.
//! Indices before the seed are NaN.

use crate::domain::ohlcv::Bar;

pub fn atr_wilder(bars: &[Bar], period: usize) -> Vec<f64> {
    let mut results = vec![f64::NAN; bars.len()];
    if period == 0 || bars.len() < period {
        return results;
    }

    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let prev_close = if i == 0 { bar.close } else { bars[i - 1].close };
            bar.true_range(prev_close)
        })
        .collect();

    let n = period as f64;
    let seed = tr_values[..period].iter().sum::<f64>() / n;
    results[period - 1] = seed;

    let mut prev_atr = seed;
    for i in period..bars.len() {
        let atr = (prev_atr * (n - 1.0) + tr_values[i]) / n;
        results[i] = atr;
        prev_atr = atr;
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(day: u32, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high,
            low,
            close,
        }
    }

    fn rising_bars() -> Vec<Bar> {
        vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 115.0, 105.0, 110.0),
            make_bar(3, 120.0, 110.0, 115.0),
            make_bar(4, 125.0, 115.0, 120.0),
        ]
    }

    #[test]
    fn atr_warmup_is_nan() {
        let atr = atr_wilder(&rising_bars(), 3);
        assert_eq!(atr.len(), 4);
        assert!(atr[0].is_nan());
        assert!(atr[1].is_nan());
        assert!(atr[2].is_finite());
        assert!(atr[3].is_finite());
    }

    #[test]
    fn atr_seed_is_average() {
        let atr = atr_wilder(&rising_bars(), 3);
        // TR: bar0 uses own close → 10; bars 1,2 → max(10, 10, 0) = 10
        assert!((atr[2] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn atr_wilder_smoothing() {
        let atr = atr_wilder(&rising_bars(), 3);
        let expected = (10.0 * 2.0 + 10.0) / 3.0;
        assert!((atr[3] - expected).abs() < 1e-9);
    }

    #[test]
    fn atr_first_bar_uses_own_close() {
        // Gap would matter only if a previous close existed.
        let bars = vec![make_bar(1, 130.0, 120.0, 80.0)];
        let atr = atr_wilder(&bars, 1);
        // max(10, |130-80|, |120-80|) = 50
        assert!((atr[0] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn atr_handles_gaps() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 130.0, 120.0, 125.0),
            make_bar(3, 120.0, 110.0, 115.0),
        ];
        let atr = atr_wilder(&bars, 2);
        // TR[0]=10, TR[1]=max(10, 25, 15)=25 → seed 17.5
        assert!(atr[0].is_nan());
        assert!((atr[1] - 17.5).abs() < 1e-9);
        // TR[2]=max(10, |120-125|, |110-125|)=15 → (17.5 + 15) / 2
        assert!((atr[2] - 16.25).abs() < 1e-9);
    }

    #[test]
    fn atr_insufficient_bars_all_nan() {
        let atr = atr_wilder(&rising_bars()[..2], 5);
        assert_eq!(atr.len(), 2);
        assert!(atr.iter().all(|v| v.is_nan()));
    }
}
