//! Parameter grid search over one price series.
//!
//! Every candidate is an independent backtest, so candidates run in
//! parallel. Results are collected in candidate order before ranking, which
//! keeps the output independent of scheduling.

use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use super::backtest::{BacktestConfig, run_backtest};
use super::metrics::{Metrics, TradeStats};
use super::price_series::PriceSeries;
use super::strategy::StrategyParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    Expectancy,
    ProfitFactor,
    TotalPnl,
}

impl Objective {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "expectancy" => Some(Objective::Expectancy),
            "profit_factor" | "pf" => Some(Objective::ProfitFactor),
            "total_pnl" | "pnl" => Some(Objective::TotalPnl),
            _ => None,
        }
    }

    pub fn score(self, metrics: &Metrics, stats: &TradeStats) -> f64 {
        match self {
            Objective::Expectancy => stats.expectancy,
            Objective::ProfitFactor => stats.profit_factor,
            Objective::TotalPnl => metrics.total_pnl,
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Objective::Expectancy => "expectancy",
            Objective::ProfitFactor => "profit_factor",
            Objective::TotalPnl => "total_pnl",
        };
        f.write_str(name)
    }
}

/// Two sweep axes. `lookbacks` maps to the lookback (hold days for the
/// legacy rule); `triggers` maps to the entry trigger of each strategy.
/// An empty axis keeps the base value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamGrid {
    pub lookbacks: Vec<usize>,
    pub triggers: Vec<f64>,
}

impl ParamGrid {
    pub fn expand(&self, base: &StrategyParams) -> Vec<StrategyParams> {
        let lookbacks: Vec<Option<usize>> = if self.lookbacks.is_empty() {
            vec![None]
        } else {
            self.lookbacks.iter().copied().map(Some).collect()
        };
        let triggers: Vec<Option<f64>> = if self.triggers.is_empty() {
            vec![None]
        } else {
            self.triggers.iter().copied().map(Some).collect()
        };

        let mut candidates = Vec::with_capacity(lookbacks.len() * triggers.len());
        for &lookback in &lookbacks {
            for &trigger in &triggers {
                candidates.push(with_axes(base, lookback, trigger));
            }
        }
        candidates
    }
}

fn with_axes(base: &StrategyParams, lookback: Option<usize>, trigger: Option<f64>) -> StrategyParams {
    let mut params = base.clone();
    match &mut params {
        StrategyParams::LegacyAbsolute {
            threshold,
            hold_days,
        } => {
            if let Some(l) = lookback {
                *hold_days = l;
            }
            if let Some(t) = trigger {
                *threshold = t;
            }
        }
        StrategyParams::BreakoutPercent {
            lookback: lb,
            threshold_pct: tr,
            ..
        }
        | StrategyParams::MeanReversion {
            lookback: lb,
            drop_pct: tr,
            ..
        }
        | StrategyParams::BreakoutAtr {
            lookback: lb,
            atr_k: tr,
            ..
        } => {
            if let Some(l) = lookback {
                *lb = l;
            }
            if let Some(t) = trigger {
                *tr = Some(t);
            }
        }
    }
    params
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRun {
    pub rank: usize,
    pub params: StrategyParams,
    pub score: f64,
    pub metrics: Metrics,
    pub stats: TradeStats,
}

/// Runs every candidate and returns them best first. Ties keep candidate
/// order; NaN scores sort last.
pub fn optimize(
    series: &PriceSeries,
    candidates: &[StrategyParams],
    objective: Objective,
    config: &BacktestConfig,
) -> Vec<RankedRun> {
    let mut runs: Vec<RankedRun> = candidates
        .par_iter()
        .map(|params| {
            let result = run_backtest(series, params, config);
            RankedRun {
                rank: 0,
                params: params.clone(),
                score: objective.score(&result.metrics, &result.stats),
                metrics: result.metrics,
                stats: result.stats,
            }
        })
        .collect();

    runs.sort_by(|a, b| compare_scores(b.score, a.score));
    for (i, run) in runs.iter_mut().enumerate() {
        run.rank = i + 1;
    }
    runs
}

fn compare_scores(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.total_cmp(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::Bar;
    use crate::domain::strategy::ExitRules;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::from_close(start + chrono::Duration::days(i as i64), c))
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    fn breakout() -> StrategyParams {
        StrategyParams::BreakoutPercent {
            lookback: 20,
            threshold_pct: None,
            exits: ExitRules::breakout_default(),
        }
    }

    #[test]
    fn grid_expands_cartesian_product() {
        let grid = ParamGrid {
            lookbacks: vec![5, 10],
            triggers: vec![0.01, 0.02, 0.03],
        };
        let candidates = grid.expand(&breakout());
        assert_eq!(candidates.len(), 6);
        assert_eq!(candidates[0].lookback(), Some(5));
        match &candidates[5] {
            StrategyParams::BreakoutPercent {
                lookback,
                threshold_pct,
                ..
            } => {
                assert_eq!(*lookback, 10);
                assert_eq!(*threshold_pct, Some(0.03));
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn empty_axes_keep_base() {
        let candidates = ParamGrid::default().expand(&breakout());
        assert_eq!(candidates, vec![breakout()]);
    }

    #[test]
    fn legacy_axes_map_to_hold_and_threshold() {
        let base = StrategyParams::LegacyAbsolute {
            threshold: 1.0,
            hold_days: 1,
        };
        let grid = ParamGrid {
            lookbacks: vec![3],
            triggers: vec![50.0],
        };
        assert_eq!(
            grid.expand(&base),
            vec![StrategyParams::LegacyAbsolute {
                threshold: 50.0,
                hold_days: 3,
            }]
        );
    }

    #[test]
    fn ranks_best_first() {
        // Cross of 10 wins (+1), cross of 12 loses (13 → 8).
        let s = series(&[9.0, 11.0, 12.0, 11.0, 13.0, 8.0, 8.0]);
        let base = StrategyParams::LegacyAbsolute {
            threshold: 10.0,
            hold_days: 1,
        };
        let grid = ParamGrid {
            lookbacks: vec![],
            triggers: vec![12.5, 10.0],
        };
        let ranked = optimize(
            &s,
            &grid.expand(&base),
            Objective::TotalPnl,
            &BacktestConfig::default(),
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
        assert!(ranked[0].score > ranked[1].score);
        match ranked[0].params {
            StrategyParams::LegacyAbsolute { threshold, .. } => assert_eq!(threshold, 10.0),
            _ => panic!("unexpected variant"),
        }
    }

    #[test]
    fn ties_keep_candidate_order() {
        let s = series(&[10.0; 10]);
        let grid = ParamGrid {
            lookbacks: vec![5, 6, 7],
            triggers: vec![],
        };
        let ranked = optimize(
            &s,
            &grid.expand(&breakout()),
            Objective::Expectancy,
            &BacktestConfig::default(),
        );
        let lookbacks: Vec<_> = ranked.iter().map(|r| r.params.lookback()).collect();
        assert_eq!(lookbacks, vec![Some(5), Some(6), Some(7)]);
    }

    #[test]
    fn nan_scores_sort_last() {
        assert_eq!(compare_scores(f64::NAN, 1.0), Ordering::Less);
        assert_eq!(compare_scores(1.0, f64::NAN), Ordering::Greater);
        assert_eq!(compare_scores(f64::INFINITY, 1.0), Ordering::Greater);
    }

    #[test]
    fn objective_parse() {
        assert_eq!(Objective::parse("Profit-Factor"), Some(Objective::ProfitFactor));
        assert_eq!(Objective::parse("pnl"), Some(Objective::TotalPnl));
        assert_eq!(Objective::parse("sharpe"), None);
        assert_eq!(Objective::default(), Objective::Expectancy);
    }
}
