//! Configuration validation.
//!
//! Checks every config field before a backtest runs. The core accepts any
//! parameters it is handed; the per-strategy lookback floors and the
//! positivity of fractional triggers are enforced here.

use crate::domain::error::SwingtestError;
use crate::domain::optimizer::Objective;
use crate::domain::strategy::{StrategyKind, StrategyParams};
use crate::ports::config_port::{ConfigPort, parse_bool};
use chrono::NaiveDate;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), SwingtestError> {
    let start = optional_date(config, "start_date")?;
    let end = optional_date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(SwingtestError::invalid(
                "data",
                "start_date",
                "start_date must not be after end_date",
            ));
        }
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SwingtestError> {
    if let Some(value) = config.get_optional_double("backtest", "initial_equity") {
        if !(value.is_finite() && value > 0.0) {
            return Err(SwingtestError::invalid(
                "backtest",
                "initial_equity",
                "initial_equity must be a positive number",
            ));
        }
    }
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<StrategyKind, SwingtestError> {
    let kind = strategy_kind(config)?;

    match kind {
        StrategyKind::LegacyAbsolute => {
            match config.get_optional_double("strategy", "threshold") {
                None => return Err(SwingtestError::missing("strategy", "threshold")),
                Some(t) if !t.is_finite() => {
                    return Err(SwingtestError::invalid(
                        "strategy",
                        "threshold",
                        "threshold must be a finite number",
                    ));
                }
                Some(_) => {}
            }
            at_least(config, "hold_days", 1)?;
        }
        _ => {
            at_least(config, "lookback", kind.min_lookback() as i64)?;
            at_least(config, "max_hold_days", 1)?;
            at_least(config, "cooldown_days", 0)?;
            if kind == StrategyKind::BreakoutAtr {
                at_least(config, "atr_period", 1)?;
            }
            positive_fraction(config, trigger_key(kind))?;
            positive_fraction(config, "take_profit_pct")?;
            positive_fraction(config, "stop_loss_pct")?;
            for key in ["allow_long", "allow_short", "allow_immediate_reentry"] {
                boolean(config, key)?;
            }

            let allow_long = config.get_bool("strategy", "allow_long", true);
            let allow_short = config.get_bool("strategy", "allow_short", true);
            if !allow_long && !allow_short {
                return Err(SwingtestError::invalid(
                    "strategy",
                    "allow_long",
                    "at least one of allow_long and allow_short must be enabled",
                ));
            }
        }
    }
    Ok(kind)
}

pub fn validate_optimize_config(config: &dyn ConfigPort) -> Result<(), SwingtestError> {
    let kind = strategy_kind(config)?;

    if let Some(raw) = config.get_string("optimize", "lookbacks") {
        let floor = match kind {
            StrategyKind::LegacyAbsolute => 1,
            other => other.min_lookback(),
        };
        for value in parse_usize_list(&raw, "lookbacks")? {
            if value < floor {
                return Err(SwingtestError::invalid(
                    "optimize",
                    "lookbacks",
                    format!("{value} is below the minimum of {floor} for {kind}"),
                ));
            }
        }
    }

    if let Some(raw) = config.get_string("optimize", "triggers") {
        for value in parse_f64_list(&raw, "triggers")? {
            let ok = match kind {
                StrategyKind::LegacyAbsolute => value.is_finite(),
                _ => value.is_finite() && value > 0.0,
            };
            if !ok {
                return Err(SwingtestError::invalid(
                    "optimize",
                    "triggers",
                    format!("{value} is not a valid trigger for {kind}"),
                ));
            }
        }
    }

    if let Some(raw) = config.get_string("optimize", "objective") {
        if Objective::parse(&raw).is_none() {
            return Err(SwingtestError::invalid(
                "optimize",
                "objective",
                format!("unknown objective '{}'", raw.trim()),
            ));
        }
    }

    if integer(config, "optimize", "top")?.is_some_and(|top| top < 1) {
        return Err(SwingtestError::invalid(
            "optimize",
            "top",
            "top must be at least 1",
        ));
    }
    Ok(())
}

/// The config key holding the entry trigger of an adaptive strategy.
pub fn trigger_key(kind: StrategyKind) -> &'static str {
    match kind {
        StrategyKind::LegacyAbsolute => "threshold",
        StrategyKind::BreakoutPercent => "threshold_pct",
        StrategyKind::BreakoutAtr => "atr_k",
        StrategyKind::MeanReversion => "drop_pct",
    }
}

pub fn strategy_kind(config: &dyn ConfigPort) -> Result<StrategyKind, SwingtestError> {
    let raw = config
        .get_string("strategy", "kind")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| SwingtestError::missing("strategy", "kind"))?;
    StrategyKind::parse(&raw).ok_or_else(|| {
        SwingtestError::invalid(
            "strategy",
            "kind",
            format!(
                "unknown strategy '{}', expected legacy_absolute, breakout_percent, breakout_atr or mean_reversion",
                raw.trim()
            ),
        )
    })
}

pub fn optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, SwingtestError> {
    match config.get_string("data", key) {
        Some(s) if !s.trim().is_empty() => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                SwingtestError::invalid(
                    "data",
                    key,
                    format!("invalid {} format, expected YYYY-MM-DD", key),
                )
            }),
        _ => Ok(None),
    }
}

/// Reads an integer key, distinguishing absent from unparsable.
pub fn integer(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<i64>, SwingtestError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| SwingtestError::invalid(section, key, "expected an integer")),
        _ => Ok(None),
    }
}

fn boolean(config: &dyn ConfigPort, key: &str) -> Result<(), SwingtestError> {
    match config.get_string("strategy", key) {
        Some(s) if !s.trim().is_empty() && parse_bool(&s).is_none() => Err(
            SwingtestError::invalid("strategy", key, format!("expected a boolean, got '{}'", s.trim())),
        ),
        _ => Ok(()),
    }
}

pub fn parse_usize_list(raw: &str, key: &str) -> Result<Vec<usize>, SwingtestError> {
    list_items(raw)
        .map(|item| {
            item.parse::<usize>().map_err(|_| {
                SwingtestError::invalid("optimize", key, format!("'{item}' is not a whole number"))
            })
        })
        .collect()
}

pub fn parse_f64_list(raw: &str, key: &str) -> Result<Vec<f64>, SwingtestError> {
    list_items(raw)
        .map(|item| {
            item.parse::<f64>().map_err(|_| {
                SwingtestError::invalid("optimize", key, format!("'{item}' is not a number"))
            })
        })
        .collect()
}

fn list_items(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn at_least(config: &dyn ConfigPort, key: &str, min: i64) -> Result<(), SwingtestError> {
    let default = match key {
        "lookback" => StrategyParams::DEFAULT_LOOKBACK as i64,
        "atr_period" => StrategyParams::DEFAULT_ATR_PERIOD as i64,
        "cooldown_days" => 0,
        _ => 1,
    };
    let value = integer(config, "strategy", key)?.unwrap_or(default);
    if value < min {
        return Err(SwingtestError::invalid(
            "strategy",
            key,
            format!("{key} must be at least {min}, got {value}"),
        ));
    }
    Ok(())
}

fn positive_fraction(config: &dyn ConfigPort, key: &str) -> Result<(), SwingtestError> {
    match config.get_optional_double("strategy", key) {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(SwingtestError::invalid(
            "strategy",
            key,
            format!("{key} must be a positive finite fraction"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(err: SwingtestError) -> String {
        match err {
            SwingtestError::ConfigInvalid { key, .. } => key,
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn full_breakout_config_passes() {
        let config = make_config(
            r#"
[data]
start_date = 2020-01-01
end_date = 2024-12-31

[backtest]
initial_equity = 10000

[strategy]
kind = breakout_percent
lookback = 20
threshold_pct = 0.01
max_hold_days = 5
take_profit_pct = 0.05
stop_loss_pct = 0.03
cooldown_days = 2
"#,
        );
        assert!(validate_data_config(&config).is_ok());
        assert!(validate_backtest_config(&config).is_ok());
        assert_eq!(
            validate_strategy_config(&config).unwrap(),
            StrategyKind::BreakoutPercent
        );
    }

    #[test]
    fn minimal_adaptive_config_passes() {
        let config = make_config("[strategy]\nkind = mean_reversion\n");
        assert_eq!(
            validate_strategy_config(&config).unwrap(),
            StrategyKind::MeanReversion
        );
        assert!(validate_data_config(&config).is_ok());
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn missing_kind_fails() {
        let err = validate_strategy_config(&make_config("[strategy]\nlookback = 20\n")).unwrap_err();
        assert!(matches!(err, SwingtestError::ConfigMissing { key, .. } if key == "kind"));
    }

    #[test]
    fn unknown_kind_fails() {
        let err = validate_strategy_config(&make_config("[strategy]\nkind = momentum\n")).unwrap_err();
        assert_eq!(invalid_key(err), "kind");
    }

    #[test]
    fn lookback_floor_per_kind() {
        let err = validate_strategy_config(&make_config(
            "[strategy]\nkind = breakout_percent\nlookback = 4\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "lookback");

        let err = validate_strategy_config(&make_config(
            "[strategy]\nkind = breakout_atr\nlookback = 9\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "lookback");

        assert!(
            validate_strategy_config(&make_config("[strategy]\nkind = breakout_atr\nlookback = 10\n"))
                .is_ok()
        );
        assert!(
            validate_strategy_config(&make_config("[strategy]\nkind = mean_reversion\nlookback = 5\n"))
                .is_ok()
        );
    }

    #[test]
    fn non_integer_lookback_fails() {
        let err = validate_strategy_config(&make_config(
            "[strategy]\nkind = breakout_percent\nlookback = twenty\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "lookback");
    }

    #[test]
    fn legacy_requires_threshold() {
        let err = validate_strategy_config(&make_config("[strategy]\nkind = legacy\n")).unwrap_err();
        assert!(matches!(err, SwingtestError::ConfigMissing { key, .. } if key == "threshold"));

        let err = validate_strategy_config(&make_config(
            "[strategy]\nkind = legacy\nthreshold = abc\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "threshold");
    }

    #[test]
    fn legacy_hold_days_at_least_one() {
        let err = validate_strategy_config(&make_config(
            "[strategy]\nkind = legacy_absolute\nthreshold = 100\nhold_days = 0\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "hold_days");

        assert!(
            validate_strategy_config(&make_config(
                "[strategy]\nkind = legacy_absolute\nthreshold = -3\n",
            ))
            .is_ok()
        );
    }

    #[test]
    fn max_hold_days_zero_fails() {
        let err = validate_strategy_config(&make_config(
            "[strategy]\nkind = breakout_percent\nmax_hold_days = 0\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "max_hold_days");
    }

    #[test]
    fn negative_cooldown_fails() {
        let err = validate_strategy_config(&make_config(
            "[strategy]\nkind = mean_reversion\ncooldown_days = -1\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "cooldown_days");
    }

    #[test]
    fn fractions_must_be_positive_and_finite() {
        for (kind, key) in [
            ("breakout_percent", "threshold_pct"),
            ("breakout_atr", "atr_k"),
            ("mean_reversion", "drop_pct"),
            ("mean_reversion", "take_profit_pct"),
            ("breakout_percent", "stop_loss_pct"),
        ] {
            for bad in ["0", "-0.01", "inf", "NaN", "lots"] {
                let config = make_config(&format!("[strategy]\nkind = {kind}\n{key} = {bad}\n"));
                let err = validate_strategy_config(&config).unwrap_err();
                assert_eq!(invalid_key(err), key, "{kind} {key}={bad}");
            }
        }
    }

    #[test]
    fn blank_trigger_means_adaptive() {
        let config = make_config("[strategy]\nkind = breakout_percent\nthreshold_pct =\n");
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn atr_period_zero_fails() {
        let err = validate_strategy_config(&make_config(
            "[strategy]\nkind = breakout_atr\natr_period = 0\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "atr_period");
    }

    #[test]
    fn both_sides_disabled_fails() {
        let err = validate_strategy_config(&make_config(
            "[strategy]\nkind = breakout_percent\nallow_long = false\nallow_short = false\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "allow_long");
    }

    #[test]
    fn misspelled_booleans_fail() {
        for key in ["allow_long", "allow_short", "allow_immediate_reentry"] {
            let config = make_config(&format!("[strategy]\nkind = mean_reversion\n{key} = flase\n"));
            let err = validate_strategy_config(&config).unwrap_err();
            assert_eq!(invalid_key(err), key);
        }
        let config = make_config("[strategy]\nkind = mean_reversion\nallow_short = NO\nallow_long =\n");
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn initial_equity_must_be_positive() {
        for bad in ["0", "-100", "abc"] {
            let config = make_config(&format!("[backtest]\ninitial_equity = {bad}\n"));
            let err = validate_backtest_config(&config).unwrap_err();
            assert_eq!(invalid_key(err), "initial_equity");
        }
    }

    #[test]
    fn malformed_date_fails() {
        let err =
            validate_data_config(&make_config("[data]\nstart_date = 2020/01/01\n")).unwrap_err();
        assert_eq!(invalid_key(err), "start_date");
    }

    #[test]
    fn start_after_end_fails() {
        let err = validate_data_config(&make_config(
            "[data]\nstart_date = 2024-12-31\nend_date = 2020-01-01\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "start_date");
    }

    #[test]
    fn same_start_and_end_allowed() {
        assert!(
            validate_data_config(&make_config(
                "[data]\nstart_date = 2024-01-02\nend_date = 2024-01-02\n",
            ))
            .is_ok()
        );
    }

    #[test]
    fn optimize_axes_validated() {
        let ok = make_config(
            "[strategy]\nkind = breakout_percent\n[optimize]\nlookbacks = 10, 20,30\ntriggers = 0.005,0.01\nobjective = profit_factor\ntop = 3\n",
        );
        assert!(validate_optimize_config(&ok).is_ok());

        let below = make_config("[strategy]\nkind = breakout_atr\n[optimize]\nlookbacks = 5,20\n");
        assert_eq!(invalid_key(validate_optimize_config(&below).unwrap_err()), "lookbacks");

        let garbage = make_config("[strategy]\nkind = mean_reversion\n[optimize]\ntriggers = 0.01,x\n");
        assert_eq!(invalid_key(validate_optimize_config(&garbage).unwrap_err()), "triggers");

        let negative = make_config("[strategy]\nkind = mean_reversion\n[optimize]\ntriggers = -0.01\n");
        assert_eq!(invalid_key(validate_optimize_config(&negative).unwrap_err()), "triggers");

        let objective = make_config("[strategy]\nkind = mean_reversion\n[optimize]\nobjective = sharpe\n");
        assert_eq!(invalid_key(validate_optimize_config(&objective).unwrap_err()), "objective");

        let top = make_config("[strategy]\nkind = mean_reversion\n[optimize]\ntop = 0\n");
        assert_eq!(invalid_key(validate_optimize_config(&top).unwrap_err()), "top");
    }

    #[test]
    fn legacy_optimize_allows_negative_thresholds() {
        let config = make_config(
            "[strategy]\nkind = legacy\nthreshold = 1\n[optimize]\nlookbacks = 1,2\ntriggers = -5,5\n",
        );
        assert!(validate_optimize_config(&config).is_ok());
    }

    #[test]
    fn list_parsing_skips_blanks() {
        assert_eq!(parse_usize_list(" 5, ,10,", "lookbacks").unwrap(), vec![5, 10]);
        assert_eq!(parse_f64_list("0.5", "triggers").unwrap(), vec![0.5]);
        assert!(parse_usize_list("", "lookbacks").unwrap().is_empty());
    }
}
