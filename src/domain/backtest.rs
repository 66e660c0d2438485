//! Backtest engine: one pass over the series, one position at a time.
//!
//! The engine is a pure function of its inputs. It performs no I/O and keeps
//! no state between calls, so concurrent runs need no coordination.

use serde::Serialize;
use tracing::debug;

use super::error::SwingtestError;
use super::lifecycle::{Lifecycle, PositionState};
use super::metrics::{DEFAULT_INITIAL_EQUITY, EquityPoint, Metrics, TradeStats, build_equity_curve};
use super::ohlcv::Bar;
use super::position::Trade;
use super::price_series::PriceSeries;
use super::signal::generator_for;
use super::strategy::StrategyParams;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_equity: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_equity: DEFAULT_INITIAL_EQUITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub metrics: Metrics,
    pub stats: TradeStats,
}

pub fn run_backtest(
    series: &PriceSeries,
    params: &StrategyParams,
    config: &BacktestConfig,
) -> BacktestResult {
    let trades = simulate(series, params);
    summarize(series, trades, config.initial_equity)
}

/// Validates bar ordering, then runs the backtest.
pub fn backtest_bars(
    bars: Vec<Bar>,
    params: &StrategyParams,
    config: &BacktestConfig,
) -> Result<BacktestResult, SwingtestError> {
    let series = PriceSeries::new(bars)?;
    Ok(run_backtest(&series, params, config))
}

/// Drives the lifecycle state machine over every bar and collects the
/// closed trades in order.
pub fn simulate(series: &PriceSeries, params: &StrategyParams) -> Vec<Trade> {
    let generator = generator_for(params, series);
    let rules = params.exit_rules();
    let lifecycle = Lifecycle::new(series, &rules, generator.as_ref());

    let mut state = PositionState::flat();
    let mut trades = Vec::new();
    for i in 0..series.len() {
        let (next, closed) = lifecycle.step(state, i);
        state = next;
        if let Some(trade) = closed {
            debug!(
                side = ?trade.side,
                entry = %trade.entry_date,
                exit = %trade.exit_date,
                reason = ?trade.exit_reason,
                pnl = trade.pnl,
                "trade closed"
            );
            trades.push(trade);
        }
    }
    if let Some(trade) = lifecycle.finish(state) {
        debug!(exit = %trade.exit_date, pnl = trade.pnl, "position closed at end of data");
        trades.push(trade);
    }
    trades
}

fn summarize(series: &PriceSeries, trades: Vec<Trade>, initial_equity: f64) -> BacktestResult {
    let equity_curve = build_equity_curve(&trades, series.first_date(), initial_equity);
    let metrics = Metrics::compute(
        &trades,
        &equity_curve,
        series.calendar_span_days(),
        initial_equity,
    );
    let stats = TradeStats::compute(&trades);
    BacktestResult {
        trades,
        equity_curve,
        metrics,
        stats,
    }
}
