//! Single-slot position lifecycle.
//!
//! Two states, `Flat` and `Open`. [`Lifecycle::step`] is the transition
//! function for one bar: it applies exits to an open position first, then,
//! if flat, asks the signal generator for an entry. Exit priority is fixed:
//! strategy exit, max hold, take profit, stop loss.

use super::position::{ExitReason, Position, Trade};
use super::price_series::PriceSeries;
use super::signal::{SignalGenerator, tradable_close};
use super::strategy::ExitRules;

#[derive(Debug, Clone, PartialEq)]
pub enum PositionState {
    Flat { last_exit: Option<usize> },
    Open(Position),
}

impl PositionState {
    pub fn flat() -> Self {
        PositionState::Flat { last_exit: None }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            PositionState::Open(pos) => Some(pos),
            PositionState::Flat { .. } => None,
        }
    }
}

pub struct Lifecycle<'a> {
    series: &'a PriceSeries,
    rules: &'a ExitRules,
    generator: &'a dyn SignalGenerator,
}

impl<'a> Lifecycle<'a> {
    pub fn new(
        series: &'a PriceSeries,
        rules: &'a ExitRules,
        generator: &'a dyn SignalGenerator,
    ) -> Self {
        Self {
            series,
            rules,
            generator,
        }
    }

    /// Advance one bar. Returns the new state and the trade closed on this
    /// bar, if any. A position closed here may be replaced on the same bar
    /// when the re-entry policy allows it.
    pub fn step(&self, state: PositionState, i: usize) -> (PositionState, Option<Trade>) {
        let (last_exit, trade) = match state {
            PositionState::Open(pos) => match self.exit_reason(&pos, i) {
                Some(reason) => {
                    let bar = self.series.bar(i);
                    (Some(i), Some(pos.close(i, bar.date, bar.close, reason)))
                }
                None => return (PositionState::Open(pos), None),
            },
            PositionState::Flat { last_exit } => (last_exit, None),
        };
        (self.try_enter(last_exit, i), trade)
    }

    /// Closes a position still open after the final bar, at the latest
    /// tradable close after entry. A position with no such bar is dropped.
    pub fn finish(&self, state: PositionState) -> Option<Trade> {
        let PositionState::Open(pos) = state else {
            return None;
        };
        let (exit, close) = (pos.entry_index + 1..self.series.len())
            .rev()
            .find_map(|i| tradable_close(self.series, i).map(|close| (i, close)))?;
        let date = self.series.bar(exit).date;
        Some(pos.close(exit, date, close, ExitReason::EndOfData))
    }

    pub fn exit_reason(&self, pos: &Position, i: usize) -> Option<ExitReason> {
        let close = tradable_close(self.series, i)?;
        if self.generator.should_exit(self.series, pos, i) {
            Some(ExitReason::StrategyExit)
        } else if pos.bars_held(i) >= self.rules.max_hold_days {
            Some(ExitReason::MaxHold)
        } else if pos.should_take_profit(close, self.rules.take_profit_pct) {
            Some(ExitReason::TakeProfit)
        } else if pos.should_stop_loss(close, self.rules.stop_loss_pct) {
            Some(ExitReason::StopLoss)
        } else {
            None
        }
    }

    pub fn entry_permitted(&self, last_exit: Option<usize>, i: usize) -> bool {
        let Some(last) = last_exit else {
            return true;
        };
        let reentry_ok = self.rules.allow_immediate_reentry || i > last;
        let cooldown_ok = self.rules.cooldown_days == 0 || i > last + self.rules.cooldown_days;
        reentry_ok && cooldown_ok
    }

    fn try_enter(&self, last_exit: Option<usize>, i: usize) -> PositionState {
        let flat = PositionState::Flat { last_exit };
        // Nothing left to hold a position on the final bar.
        if i + 1 >= self.series.len() || !self.entry_permitted(last_exit, i) {
            return flat;
        }
        let Some(side) = self.generator.entry(self.series, i, false) else {
            return flat;
        };
        let Some(entry_price) = tradable_close(self.series, i) else {
            return flat;
        };
        PositionState::Open(Position {
            side,
            entry_index: i,
            entry_date: self.series.bar(i).date,
            entry_price,
        })
    }
}
