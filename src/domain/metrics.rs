//! Equity curve and performance metrics.
//!
//! Accounting is cash-only: equity changes on trade exit dates and nowhere
//! else, compounding each trade's return on the full balance.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use super::position::Trade;

pub const DEFAULT_INITIAL_EQUITY: f64 = 1000.0;

const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    /// `None` only for the seed point of an empty series.
    #[serde(serialize_with = "date_or_empty")]
    pub date: Option<NaiveDate>,
    pub equity: f64,
}

fn date_or_empty<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => s.collect_str(&d.format("%Y-%m-%d")),
        None => s.serialize_str(""),
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Seeds the curve at the first bar's date and appends one point per trade
/// at its exit date.
pub fn build_equity_curve(
    trades: &[Trade],
    first_date: Option<NaiveDate>,
    initial_equity: f64,
) -> Vec<EquityPoint> {
    let mut curve = Vec::with_capacity(trades.len() + 1);
    curve.push(EquityPoint {
        date: first_date,
        equity: initial_equity,
    });

    let mut equity = initial_equity;
    for trade in trades {
        equity = round_cents(equity * (1.0 + trade.return_pct));
        curve.push(EquityPoint {
            date: Some(trade.exit_date),
            equity,
        });
    }
    curve
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_pnl: f64,
    pub win_rate: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub final_equity: f64,
    pub initial_equity: f64,
    pub trade_count: usize,
    pub avg_trade_return: f64,
}

impl Metrics {
    /// `span_days` is the calendar span of the price series.
    pub fn compute(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        span_days: i64,
        initial_equity: f64,
    ) -> Self {
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_equity);

        let wins = trades.iter().filter(|t| t.pnl > 0.0).count();
        let win_rate = if trades.is_empty() {
            0.0
        } else {
            wins as f64 / trades.len() as f64
        };

        let avg_trade_return = if trades.is_empty() {
            0.0
        } else {
            trades.iter().map(|t| t.return_pct).sum::<f64>() / trades.len() as f64
        };

        Metrics {
            total_pnl: final_equity - initial_equity,
            win_rate,
            annualized_return: annualized_return(initial_equity, final_equity, span_days),
            max_drawdown: compute_drawdown(equity_curve),
            final_equity,
            initial_equity,
            trade_count: trades.len(),
            avg_trade_return,
        }
    }
}

fn annualized_return(initial_equity: f64, final_equity: f64, span_days: i64) -> f64 {
    if span_days <= 0 || initial_equity <= 0.0 {
        return 0.0;
    }
    let growth = final_equity / initial_equity;
    let annualized = growth.powf(DAYS_PER_YEAR / span_days as f64) - 1.0;
    if annualized.is_finite() { annualized } else { 0.0 }
}

/// Largest peak-to-trough decline as a positive fraction.
fn compute_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut worst = 0.0_f64;
    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            worst = worst.min((point.equity - peak) / peak);
        }
    }
    worst.abs()
}

/// Trade-level statistics used to rank optimizer candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeStats {
    pub wins: usize,
    pub losses: usize,
    pub avg_win: f64,
    /// Absolute value.
    pub avg_loss: f64,
    pub profit_factor: f64,
    pub expectancy: f64,
}

impl TradeStats {
    pub fn compute(trades: &[Trade]) -> Self {
        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;

        for trade in trades {
            if trade.pnl > 0.0 {
                wins += 1;
                gross_profit += trade.pnl;
            } else if trade.pnl < 0.0 {
                losses += 1;
                gross_loss += trade.pnl.abs();
            }
        }

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if wins > 0 {
            gross_profit / wins as f64
        } else {
            0.0
        };
        let avg_loss = if losses > 0 {
            gross_loss / losses as f64
        } else {
            0.0
        };

        let expectancy = if trades.is_empty() {
            0.0
        } else {
            let hit_rate = wins as f64 / trades.len() as f64;
            avg_win * hit_rate - avg_loss * (1.0 - hit_rate)
        };

        TradeStats {
            wins,
            losses,
            avg_win,
            avg_loss,
            profit_factor,
            expectancy,
        }
    }
}
