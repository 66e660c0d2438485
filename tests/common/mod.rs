#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use swingtest::domain::backtest::BacktestResult;
use swingtest::domain::error::SwingtestError;
pub use swingtest::domain::ohlcv::Bar;
use swingtest::domain::optimizer::RankedRun;
use swingtest::domain::price_series::PriceSeries;
use swingtest::domain::strategy::StrategyParams;
use swingtest::ports::data_port::DataPort;
use swingtest::ports::report_port::ReportPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, SwingtestError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SwingtestError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| start_date.is_none_or(|s| b.date >= s))
            .filter(|b| end_date.is_none_or(|e| b.date <= e))
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, SwingtestError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SwingtestError> {
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct MockReportPort {
    pub backtests: RefCell<Vec<(String, StrategyParams, BacktestResult)>>,
    pub rankings: RefCell<Vec<(String, Vec<RankedRun>)>>,
}

impl ReportPort for MockReportPort {
    fn write(
        &self,
        symbol: &str,
        params: &StrategyParams,
        result: &BacktestResult,
    ) -> Result<(), SwingtestError> {
        self.backtests
            .borrow_mut()
            .push((symbol.to_string(), params.clone(), result.clone()));
        Ok(())
    }

    fn write_ranking(&self, symbol: &str, runs: &[RankedRun]) -> Result<(), SwingtestError> {
        self.rankings
            .borrow_mut()
            .push((symbol.to_string(), runs.to_vec()));
        Ok(())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_bar(date_str: &str, close: f64) -> Bar {
    Bar {
        date: date(date_str),
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
    }
}

/// Consecutive calendar days starting 2024-01-01, one bar per close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let start = date("2024-01-01");
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::from_close(start + chrono::Duration::days(i as i64), c))
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(bars_from_closes(closes)).unwrap()
}

/// Deterministic zig-zag with drift, long enough for every lookback floor.
pub fn generate_bars(n: usize) -> Vec<Bar> {
    let start = date("2023-01-02");
    (0..n)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + 0.05 * t + 4.0 * (t / 3.0).sin() + 2.0 * (t / 11.0).cos();
            Bar {
                date: start + chrono::Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.2,
                low: close - 1.4,
                close,
            }
        })
        .collect()
}
