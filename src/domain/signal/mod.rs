//! Entry signal generators.
//!
//! Each strategy is a [`SignalGenerator`] built once per run from the price
//! series and its parameters. Adaptive defaults (triggers left unset in the
//! parameters) are resolved at construction, from the whole series, so a
//! run never consults anything but its own inputs.
//!
//! Generators only propose entries. Exits belong to the lifecycle state
//! machine, except for strategy-specific exits such as mean touch, which a
//! generator reports through [`SignalGenerator::should_exit`].

pub mod breakout;
pub mod legacy;
pub mod mean_reversion;

use crate::domain::position::{Position, Side};
use crate::domain::price_series::PriceSeries;
use crate::domain::strategy::StrategyParams;

pub use breakout::{BreakoutAtr, BreakoutPercent};
pub use legacy::LegacyAbsolute;
pub use mean_reversion::MeanReversion;

pub trait SignalGenerator: Send + Sync {
    /// Proposed entry side at bar `i`, or `None`. Always `None` while a
    /// position is open.
    fn entry(&self, series: &PriceSeries, i: usize, position_open: bool) -> Option<Side>;

    /// Strategy-specific exit for an open position at bar `i`.
    fn should_exit(&self, _series: &PriceSeries, _position: &Position, _i: usize) -> bool {
        false
    }
}

/// Which sides a generator may propose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideFilter {
    pub allow_long: bool,
    pub allow_short: bool,
}

impl SideFilter {
    pub const LONG_ONLY: SideFilter = SideFilter {
        allow_long: true,
        allow_short: false,
    };

    /// Long is checked first, so it wins if both conditions ever hold.
    pub fn pick(self, long_hit: bool, short_hit: bool) -> Option<Side> {
        if self.allow_long && long_hit {
            Some(Side::Long)
        } else if self.allow_short && short_hit {
            Some(Side::Short)
        } else {
            None
        }
    }
}

/// Maps a parameter variant to its signal generator.
pub fn generator_for(params: &StrategyParams, series: &PriceSeries) -> Box<dyn SignalGenerator> {
    match params {
        StrategyParams::LegacyAbsolute { threshold, .. } => {
            Box::new(LegacyAbsolute::new(*threshold))
        }
        StrategyParams::BreakoutPercent {
            lookback,
            threshold_pct,
            exits,
        } => Box::new(BreakoutPercent::new(
            series,
            *lookback,
            *threshold_pct,
            SideFilter {
                allow_long: exits.allow_long,
                allow_short: exits.allow_short,
            },
        )),
        StrategyParams::BreakoutAtr {
            lookback,
            atr_k,
            atr_period,
            exits,
        } => Box::new(BreakoutAtr::new(
            series,
            *lookback,
            *atr_k,
            *atr_period,
            SideFilter {
                allow_long: exits.allow_long,
                allow_short: exits.allow_short,
            },
        )),
        StrategyParams::MeanReversion {
            lookback,
            drop_pct,
            exits,
        } => Box::new(MeanReversion::new(
            series,
            *lookback,
            *drop_pct,
            SideFilter {
                allow_long: exits.allow_long,
                allow_short: exits.allow_short,
            },
        )),
    }
}

/// Usable closing price at `i`, or `None` if the bar cannot be traded.
pub(crate) fn tradable_close(series: &PriceSeries, i: usize) -> Option<f64> {
    series
        .closes()
        .get(i)
        .copied()
        .filter(|c| c.is_finite() && *c > 0.0)
}
