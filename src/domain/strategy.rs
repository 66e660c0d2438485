//! Strategy parameter sets, one variant per trading rule.

use serde::Serialize;
use std::fmt;

/// Exit and re-entry policy shared by the adaptive strategies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitRules {
    pub max_hold_days: usize,
    pub take_profit_pct: Option<f64>,
    pub stop_loss_pct: Option<f64>,
    pub allow_long: bool,
    pub allow_short: bool,
    pub cooldown_days: usize,
    pub allow_immediate_reentry: bool,
}

impl ExitRules {
    pub const BREAKOUT_MAX_HOLD: usize = 5;
    pub const MEAN_REVERSION_MAX_HOLD: usize = 1;

    pub fn with_max_hold(max_hold_days: usize) -> Self {
        ExitRules {
            max_hold_days,
            take_profit_pct: None,
            stop_loss_pct: None,
            allow_long: true,
            allow_short: true,
            cooldown_days: 0,
            allow_immediate_reentry: true,
        }
    }

    pub fn breakout_default() -> Self {
        Self::with_max_hold(Self::BREAKOUT_MAX_HOLD)
    }

    pub fn mean_reversion_default() -> Self {
        Self::with_max_hold(Self::MEAN_REVERSION_MAX_HOLD)
    }

    /// Fixed holding period, long only, no same-bar re-entry.
    pub fn legacy(hold_days: usize) -> Self {
        ExitRules {
            allow_short: false,
            allow_immediate_reentry: false,
            ..Self::with_max_hold(hold_days)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    LegacyAbsolute,
    BreakoutPercent,
    BreakoutAtr,
    MeanReversion,
}

impl StrategyKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "legacy_absolute" | "legacy" | "threshold" => Some(StrategyKind::LegacyAbsolute),
            "breakout_percent" | "breakout" => Some(StrategyKind::BreakoutPercent),
            "breakout_atr" | "atr" => Some(StrategyKind::BreakoutAtr),
            "mean_reversion" | "meanrev" => Some(StrategyKind::MeanReversion),
            _ => None,
        }
    }

    /// Smallest lookback accepted by configuration validation.
    pub fn min_lookback(self) -> usize {
        match self {
            StrategyKind::LegacyAbsolute => 0,
            StrategyKind::BreakoutPercent | StrategyKind::MeanReversion => 5,
            StrategyKind::BreakoutAtr => 10,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::LegacyAbsolute => "legacy_absolute",
            StrategyKind::BreakoutPercent => "breakout_percent",
            StrategyKind::BreakoutAtr => "breakout_atr",
            StrategyKind::MeanReversion => "mean_reversion",
        };
        f.write_str(name)
    }
}

/// Parameters for one backtest run. Unset triggers (`None`) are derived
/// adaptively from the price series by the matching signal generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyParams {
    LegacyAbsolute {
        threshold: f64,
        hold_days: usize,
    },
    BreakoutPercent {
        lookback: usize,
        threshold_pct: Option<f64>,
        exits: ExitRules,
    },
    BreakoutAtr {
        lookback: usize,
        atr_k: Option<f64>,
        atr_period: usize,
        exits: ExitRules,
    },
    MeanReversion {
        lookback: usize,
        drop_pct: Option<f64>,
        exits: ExitRules,
    },
}

impl StrategyParams {
    pub const DEFAULT_LOOKBACK: usize = 20;
    pub const DEFAULT_ATR_PERIOD: usize = 14;

    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyParams::LegacyAbsolute { .. } => StrategyKind::LegacyAbsolute,
            StrategyParams::BreakoutPercent { .. } => StrategyKind::BreakoutPercent,
            StrategyParams::BreakoutAtr { .. } => StrategyKind::BreakoutAtr,
            StrategyParams::MeanReversion { .. } => StrategyKind::MeanReversion,
        }
    }

    pub fn exit_rules(&self) -> ExitRules {
        match self {
            StrategyParams::LegacyAbsolute { hold_days, .. } => ExitRules::legacy(*hold_days),
            StrategyParams::BreakoutPercent { exits, .. }
            | StrategyParams::BreakoutAtr { exits, .. }
            | StrategyParams::MeanReversion { exits, .. } => exits.clone(),
        }
    }

    pub fn lookback(&self) -> Option<usize> {
        match self {
            StrategyParams::LegacyAbsolute { .. } => None,
            StrategyParams::BreakoutPercent { lookback, .. }
            | StrategyParams::BreakoutAtr { lookback, .. }
            | StrategyParams::MeanReversion { lookback, .. } => Some(*lookback),
        }
    }
}

impl fmt::Display for StrategyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt(v: &Option<f64>) -> String {
            v.map(|x| format!("{x}")).unwrap_or_else(|| "auto".to_string())
        }
        match self {
            StrategyParams::LegacyAbsolute {
                threshold,
                hold_days,
            } => write!(f, "legacy_absolute(threshold={threshold}, hold={hold_days})"),
            StrategyParams::BreakoutPercent {
                lookback,
                threshold_pct,
                exits,
            } => write!(
                f,
                "breakout_percent(lookback={lookback}, pct={}, hold={})",
                opt(threshold_pct),
                exits.max_hold_days
            ),
            StrategyParams::BreakoutAtr {
                lookback,
                atr_k,
                atr_period,
                exits,
            } => write!(
                f,
                "breakout_atr(lookback={lookback}, k={}, atr={atr_period}, hold={})",
                opt(atr_k),
                exits.max_hold_days
            ),
            StrategyParams::MeanReversion {
                lookback,
                drop_pct,
                exits,
            } => write!(
                f,
                "mean_reversion(lookback={lookback}, drop={}, hold={})",
                opt(drop_pct),
                exits.max_hold_days
            ),
        }
    }
}
