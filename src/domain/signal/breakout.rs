//! Channel breakout generators.
//!
//! Both variants compare today's close with the extremes of the prior
//! `lookback` closes. They differ only in the breakout margin: a fraction of
//! the extreme (percent) or a multiple of Wilder's ATR.

use super::{SideFilter, SignalGenerator, tradable_close};
use crate::domain::indicator::{atr_wilder, mean_abs_daily_return, mean_finite, rolling_max, rolling_min};
use crate::domain::position::Side;
use crate::domain::price_series::PriceSeries;

/// Calmer series get a tighter trigger so trade density stays comparable
/// across symbols.
pub fn adaptive_threshold_pct(closes: &[f64]) -> f64 {
    (0.6 * mean_abs_daily_return(closes)).clamp(0.001, 0.02)
}

/// ATR multiple normalised against a reference ATR of 1% of price.
pub fn adaptive_atr_k(avg_atr: f64, avg_close: f64) -> f64 {
    let ratio = (avg_atr / avg_close) / 0.01;
    let scaled = if ratio.is_finite() {
        ratio.clamp(0.3, 0.8)
    } else {
        0.3
    };
    0.5 * scaled
}

/// Prior-window extremes at `i`, or `None` until a full window exists.
fn channel(closes: &[f64], lookback: usize, i: usize) -> Option<(f64, f64)> {
    if lookback == 0 || i < lookback {
        return None;
    }
    let up = rolling_max(closes, lookback, i);
    let dn = rolling_min(closes, lookback, i);
    (up.is_finite() && dn.is_finite()).then_some((up, dn))
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakoutPercent {
    lookback: usize,
    threshold_pct: f64,
    sides: SideFilter,
}

impl BreakoutPercent {
    pub fn new(
        series: &PriceSeries,
        lookback: usize,
        threshold_pct: Option<f64>,
        sides: SideFilter,
    ) -> Self {
        let threshold_pct =
            threshold_pct.unwrap_or_else(|| adaptive_threshold_pct(series.closes()));
        Self {
            lookback,
            threshold_pct,
            sides,
        }
    }

    pub fn threshold_pct(&self) -> f64 {
        self.threshold_pct
    }
}

impl SignalGenerator for BreakoutPercent {
    fn entry(&self, series: &PriceSeries, i: usize, position_open: bool) -> Option<Side> {
        if position_open || !self.threshold_pct.is_finite() {
            return None;
        }
        let close = tradable_close(series, i)?;
        let (up, dn) = channel(series.closes(), self.lookback, i)?;
        let long_hit = close > up * (1.0 + self.threshold_pct);
        let short_hit = close < dn * (1.0 - self.threshold_pct);
        self.sides.pick(long_hit, short_hit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakoutAtr {
    lookback: usize,
    atr_k: f64,
    atr: Vec<f64>,
    sides: SideFilter,
}

impl BreakoutAtr {
    pub fn new(
        series: &PriceSeries,
        lookback: usize,
        atr_k: Option<f64>,
        atr_period: usize,
        sides: SideFilter,
    ) -> Self {
        let atr = atr_wilder(series.bars(), atr_period);
        let atr_k = atr_k
            .unwrap_or_else(|| adaptive_atr_k(mean_finite(&atr), mean_finite(series.closes())));
        Self {
            lookback,
            atr_k,
            atr,
            sides,
        }
    }

    pub fn atr_k(&self) -> f64 {
        self.atr_k
    }
}

impl SignalGenerator for BreakoutAtr {
    fn entry(&self, series: &PriceSeries, i: usize, position_open: bool) -> Option<Side> {
        if position_open || !self.atr_k.is_finite() {
            return None;
        }
        let close = tradable_close(series, i)?;
        let (up, dn) = channel(series.closes(), self.lookback, i)?;
        let margin = self.atr_k * self.atr.get(i).copied().unwrap_or(f64::NAN);
        if !margin.is_finite() {
            return None;
        }
        self.sides.pick(close > up + margin, close < dn - margin)
    }
}
