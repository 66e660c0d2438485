//! Absolute threshold cross.
//!
//! Long when the close crosses the threshold from below:
//! C[i-1] < threshold <= C[i]. The exit is a fixed holding period handled
//! by the lifecycle.

use super::{SignalGenerator, tradable_close};
use crate::domain::position::Side;
use crate::domain::price_series::PriceSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyAbsolute {
    threshold: f64,
}

impl LegacyAbsolute {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl SignalGenerator for LegacyAbsolute {
    fn entry(&self, series: &PriceSeries, i: usize, position_open: bool) -> Option<Side> {
        if position_open || i == 0 || !self.threshold.is_finite() {
            return None;
        }
        let close = tradable_close(series, i)?;
        let prev = series.closes()[i - 1];
        (prev < self.threshold && self.threshold <= close).then_some(Side::Long)
    }
}
