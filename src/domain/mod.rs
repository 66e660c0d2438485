//! Core domain types and logic. Nothing here performs I/O.

pub mod ohlcv;
pub mod price_series;
pub mod position;
pub mod indicator;
pub mod signal;
pub mod strategy;
pub mod lifecycle;
pub mod backtest;
pub mod metrics;
pub mod optimizer;
pub mod config_validation;
pub mod error;
