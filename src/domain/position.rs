//! Open position and completed trade records.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Strategy-specific exit, e.g. mean touch.
    StrategyExit,
    MaxHold,
    TakeProfit,
    StopLoss,
    EndOfData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub side: Side,
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
}

impl Position {
    /// Signed P&L in price units for one unit closed at `price`.
    pub fn pnl_at(&self, price: f64) -> f64 {
        match self.side {
            Side::Long => price - self.entry_price,
            Side::Short => self.entry_price - price,
        }
    }

    /// Direction-adjusted return fraction relative to the entry price.
    pub fn return_at(&self, price: f64) -> f64 {
        self.pnl_at(price) / self.entry_price
    }

    pub fn bars_held(&self, index: usize) -> usize {
        index.saturating_sub(self.entry_index)
    }

    pub fn should_take_profit(&self, price: f64, take_profit_pct: Option<f64>) -> bool {
        match take_profit_pct {
            Some(tp) if tp > 0.0 => self.return_at(price) >= tp,
            _ => false,
        }
    }

    pub fn should_stop_loss(&self, price: f64, stop_loss_pct: Option<f64>) -> bool {
        match stop_loss_pct {
            Some(sl) if sl > 0.0 => self.return_at(price) <= -sl,
            _ => false,
        }
    }

    pub fn close(self, index: usize, date: NaiveDate, price: f64, reason: ExitReason) -> Trade {
        Trade {
            side: self.side,
            entry_index: self.entry_index,
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            exit_index: index,
            exit_date: date,
            exit_price: price,
            pnl: self.pnl_at(price),
            return_pct: self.return_at(price),
            exit_reason: reason,
        }
    }
}

/// A completed round trip. Never mutated after it is emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub side: Side,
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_index: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub pnl: f64,
    /// Signed return fraction; positive for a short that fell.
    pub return_pct: f64,
    pub exit_reason: ExitReason,
}
