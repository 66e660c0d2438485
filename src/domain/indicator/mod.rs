//! Technical indicators used by the signal generators.
//!
//! All functions are pure over a numeric slice. Values that are not yet
//! available are reported as non-finite (`NaN` or `±inf`); callers treat
//! any non-finite value as "indicator not ready".

pub mod atr;
pub mod rolling;
pub mod sma;
pub mod stats;

pub use atr::atr_wilder;
pub use rolling::{rolling_max, rolling_min};
pub use sma::sma;
pub use stats::{mean_abs_daily_return, mean_finite};
