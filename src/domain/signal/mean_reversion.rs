//! Mean reversion against a simple moving average.
//!
//! Long when the close sits at least `drop_pct` below SMA(lookback), short
//! when it sits that far above. An open position exits as soon as the close
//! touches the mean again.

use super::{SideFilter, SignalGenerator, tradable_close};
use crate::domain::indicator::{mean_abs_daily_return, sma};
use crate::domain::position::{Position, Side};
use crate::domain::price_series::PriceSeries;

pub fn adaptive_drop_pct(closes: &[f64]) -> f64 {
    (0.8 * mean_abs_daily_return(closes)).clamp(0.003, 0.025)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversion {
    lookback: usize,
    drop_pct: f64,
    sides: SideFilter,
}

impl MeanReversion {
    pub fn new(
        series: &PriceSeries,
        lookback: usize,
        drop_pct: Option<f64>,
        sides: SideFilter,
    ) -> Self {
        let drop_pct = drop_pct.unwrap_or_else(|| adaptive_drop_pct(series.closes()));
        Self {
            lookback,
            drop_pct,
            sides,
        }
    }

    pub fn drop_pct(&self) -> f64 {
        self.drop_pct
    }

    /// SMA at `i`, or `None` until a full window exists.
    fn mean_at(&self, series: &PriceSeries, i: usize) -> Option<f64> {
        if self.lookback == 0 || i + 1 < self.lookback {
            return None;
        }
        Some(sma(series.closes(), self.lookback, i)).filter(|m| m.is_finite())
    }
}

impl SignalGenerator for MeanReversion {
    fn entry(&self, series: &PriceSeries, i: usize, position_open: bool) -> Option<Side> {
        if position_open || !self.drop_pct.is_finite() {
            return None;
        }
        let close = tradable_close(series, i)?;
        let m = self.mean_at(series, i)?;
        let long_hit = close <= m * (1.0 - self.drop_pct);
        let short_hit = close >= m * (1.0 + self.drop_pct);
        self.sides.pick(long_hit, short_hit)
    }

    fn should_exit(&self, series: &PriceSeries, position: &Position, i: usize) -> bool {
        let (Some(close), Some(m)) = (tradable_close(series, i), self.mean_at(series, i)) else {
            return false;
        };
        match position.side {
            Side::Long => close >= m,
            Side::Short => close <= m,
        }
    }
}
