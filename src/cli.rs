//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    integer, optional_date, parse_f64_list, parse_usize_list, trigger_key,
    validate_backtest_config, validate_data_config, validate_optimize_config,
    validate_strategy_config,
};
use crate::domain::error::SwingtestError;
use crate::domain::metrics::DEFAULT_INITIAL_EQUITY;
use crate::domain::optimizer::{self, Objective, ParamGrid, RankedRun};
use crate::domain::price_series::PriceSeries;
use crate::domain::strategy::{ExitRules, StrategyKind, StrategyParams};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_TOP: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "swingtest", about = "Single-position daily backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one backtest and write a JSON report
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        /// Report path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Sweep a parameter grid and rank the candidates
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        objective: Option<String>,
        #[arg(long)]
        top: Option<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running anything
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for one symbol, or all of them
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
        } => run_backtest(&config, symbol.as_deref(), output),
        Command::Optimize {
            config,
            symbol,
            objective,
            top,
            output,
        } => run_optimize(&config, symbol.as_deref(), objective.as_deref(), top, output),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SwingtestError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Where to read prices from and which slice of them to use.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub dir: PathBuf,
    pub symbol: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub fn data_dir(config: &dyn ConfigPort) -> PathBuf {
    config
        .get_string("data", "dir")
        .filter(|s| !s.trim().is_empty())
        .map(|s| PathBuf::from(s.trim()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn build_data_request(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<DataRequest, SwingtestError> {
    validate_data_config(config)?;
    let symbol = symbol_override
        .map(str::to_string)
        .or_else(|| config.get_string("data", "symbol"))
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SwingtestError::missing("data", "symbol"))?;

    Ok(DataRequest {
        dir: data_dir(config),
        symbol,
        start_date: optional_date(config, "start_date")?,
        end_date: optional_date(config, "end_date")?,
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, SwingtestError> {
    validate_backtest_config(config)?;
    Ok(BacktestConfig {
        initial_equity: config
            .get_optional_double("backtest", "initial_equity")
            .unwrap_or(DEFAULT_INITIAL_EQUITY),
    })
}

pub fn build_strategy_params(config: &dyn ConfigPort) -> Result<StrategyParams, SwingtestError> {
    let kind = validate_strategy_config(config)?;
    let count = |key: &str, default: usize| -> Result<usize, SwingtestError> {
        Ok(integer(config, "strategy", key)?.map_or(default, |v| v as usize))
    };

    if kind == StrategyKind::LegacyAbsolute {
        let threshold = config
            .get_optional_double("strategy", "threshold")
            .ok_or_else(|| SwingtestError::missing("strategy", "threshold"))?;
        return Ok(StrategyParams::LegacyAbsolute {
            threshold,
            hold_days: count("hold_days", 1)?,
        });
    }

    let default_hold = match kind {
        StrategyKind::MeanReversion => ExitRules::MEAN_REVERSION_MAX_HOLD,
        _ => ExitRules::BREAKOUT_MAX_HOLD,
    };
    let exits = ExitRules {
        max_hold_days: count("max_hold_days", default_hold)?,
        take_profit_pct: config.get_optional_double("strategy", "take_profit_pct"),
        stop_loss_pct: config.get_optional_double("strategy", "stop_loss_pct"),
        allow_long: config.get_bool("strategy", "allow_long", true),
        allow_short: config.get_bool("strategy", "allow_short", true),
        cooldown_days: count("cooldown_days", 0)?,
        allow_immediate_reentry: config.get_bool("strategy", "allow_immediate_reentry", true),
    };
    let lookback = count("lookback", StrategyParams::DEFAULT_LOOKBACK)?;
    let trigger = config.get_optional_double("strategy", trigger_key(kind));

    Ok(if kind == StrategyKind::BreakoutAtr {
        StrategyParams::BreakoutAtr {
            lookback,
            atr_k: trigger,
            atr_period: count("atr_period", StrategyParams::DEFAULT_ATR_PERIOD)?,
            exits,
        }
    } else if kind == StrategyKind::MeanReversion {
        StrategyParams::MeanReversion {
            lookback,
            drop_pct: trigger,
            exits,
        }
    } else {
        StrategyParams::BreakoutPercent {
            lookback,
            threshold_pct: trigger,
            exits,
        }
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeSettings {
    pub grid: ParamGrid,
    pub objective: Objective,
    pub top: usize,
}

/// Reads `[optimize]`; command-line values take precedence.
pub fn build_optimize_settings(
    config: &dyn ConfigPort,
    objective_override: Option<&str>,
    top_override: Option<usize>,
) -> Result<OptimizeSettings, SwingtestError> {
    validate_optimize_config(config)?;

    let grid = ParamGrid {
        lookbacks: match config.get_string("optimize", "lookbacks") {
            Some(raw) => parse_usize_list(&raw, "lookbacks")?,
            None => Vec::new(),
        },
        triggers: match config.get_string("optimize", "triggers") {
            Some(raw) => parse_f64_list(&raw, "triggers")?,
            None => Vec::new(),
        },
    };

    let objective_raw = objective_override
        .map(str::to_string)
        .or_else(|| config.get_string("optimize", "objective"));
    let objective = match objective_raw {
        Some(raw) => Objective::parse(&raw).ok_or_else(|| {
            SwingtestError::invalid(
                "optimize",
                "objective",
                format!("unknown objective '{}'", raw.trim()),
            )
        })?,
        None => Objective::default(),
    };

    let top = match top_override {
        Some(0) => {
            return Err(SwingtestError::invalid("optimize", "top", "top must be at least 1"));
        }
        Some(n) => n,
        None => integer(config, "optimize", "top")?.map_or(DEFAULT_TOP, |v| v as usize),
    };

    Ok(OptimizeSettings {
        grid,
        objective,
        top,
    })
}

pub fn load_series(
    data_port: &dyn DataPort,
    request: &DataRequest,
) -> Result<PriceSeries, SwingtestError> {
    let bars = data_port.fetch_bars(&request.symbol, request.start_date, request.end_date)?;
    if bars.is_empty() {
        warn!(symbol = %request.symbol, "no bars in the requested range");
    }
    let series = PriceSeries::new(bars)?;
    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        info!(symbol = %request.symbol, bars = series.len(), %first, %last, "loaded price series");
    }
    Ok(series)
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    request: &DataRequest,
    params: &StrategyParams,
    bt_config: &BacktestConfig,
) -> Result<BacktestResult, SwingtestError> {
    let series = load_series(data_port, request)?;

    info!(strategy = %params, "running backtest");
    let result = backtest_engine::run_backtest(&series, params, bt_config);

    print_summary(&request.symbol, params, &result);
    report_port.write(&request.symbol, params, &result)?;
    Ok(result)
}

pub fn run_optimize_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    request: &DataRequest,
    base: &StrategyParams,
    settings: &OptimizeSettings,
    bt_config: &BacktestConfig,
) -> Result<Vec<RankedRun>, SwingtestError> {
    let series = load_series(data_port, request)?;
    let candidates = settings.grid.expand(base);

    info!(
        candidates = candidates.len(),
        objective = %settings.objective,
        "running parameter sweep"
    );
    let mut ranked = optimizer::optimize(&series, &candidates, settings.objective, bt_config);
    ranked.truncate(settings.top);

    eprintln!("\n=== Top {} by {} ===", ranked.len(), settings.objective);
    for run in &ranked {
        eprintln!(
            "  #{:<3} {:>12.4}  {}  ({} trades, {:.1}% win rate)",
            run.rank,
            run.score,
            run.params,
            run.metrics.trade_count,
            run.metrics.win_rate * 100.0,
        );
    }

    report_port.write_ranking(&request.symbol, &ranked)?;
    Ok(ranked)
}

fn print_summary(symbol: &str, params: &StrategyParams, result: &BacktestResult) {
    let m = &result.metrics;
    let s = &result.stats;
    eprintln!("\n=== {} {} ===", symbol, params);
    eprintln!("Initial Equity:   {:.2}", m.initial_equity);
    eprintln!("Final Equity:     {:.2}", m.final_equity);
    eprintln!("Total P&L:        {:.2}", m.total_pnl);
    eprintln!("Annualized:       {:.2}%", m.annualized_return * 100.0);
    eprintln!("Max Drawdown:     -{:.1}%", m.max_drawdown * 100.0);
    eprintln!("Total Trades:     {}", m.trade_count);
    eprintln!("Win Rate:         {:.1}%", m.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", s.profit_factor);
    eprintln!("Expectancy:       {:.4}", s.expectancy);
}

fn run_backtest(
    config_path: &Path,
    symbol: Option<&str>,
    output: Option<PathBuf>,
) -> Result<(), SwingtestError> {
    let config = load_config(config_path)?;
    let request = build_data_request(&config, symbol)?;
    let params = build_strategy_params(&config)?;
    let bt_config = build_backtest_config(&config)?;

    let data_port = CsvAdapter::new(request.dir.clone());
    let report_port = JsonReportAdapter::new(output);
    run_backtest_pipeline(&data_port, &report_port, &request, &params, &bt_config)?;
    Ok(())
}

fn run_optimize(
    config_path: &Path,
    symbol: Option<&str>,
    objective: Option<&str>,
    top: Option<usize>,
    output: Option<PathBuf>,
) -> Result<(), SwingtestError> {
    let config = load_config(config_path)?;
    let request = build_data_request(&config, symbol)?;
    let base = build_strategy_params(&config)?;
    let bt_config = build_backtest_config(&config)?;
    let settings = build_optimize_settings(&config, objective, top)?;

    let data_port = CsvAdapter::new(request.dir.clone());
    let report_port = JsonReportAdapter::new(output);
    run_optimize_pipeline(&data_port, &report_port, &request, &base, &settings, &bt_config)?;
    Ok(())
}

/// Runs every check `backtest` and `optimize` would run before touching data.
pub fn validate_config(config: &dyn ConfigPort) -> Result<StrategyParams, SwingtestError> {
    validate_data_config(config)?;
    build_backtest_config(config)?;
    let params = build_strategy_params(config)?;
    if config.get_string("optimize", "lookbacks").is_some()
        || config.get_string("optimize", "triggers").is_some()
        || config.get_string("optimize", "objective").is_some()
        || config.get_string("optimize", "top").is_some()
    {
        build_optimize_settings(config, None, None)?;
    }
    Ok(params)
}

fn run_validate(config_path: &Path) -> Result<(), SwingtestError> {
    let config = load_config(config_path)?;
    let params = validate_config(&config)?;

    eprintln!("Strategy:  {}", params.kind());
    eprintln!("Params:    {}", params);
    eprintln!("Data dir:  {}", data_dir(&config).display());
    eprintln!("\nConfiguration is valid.");
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), SwingtestError> {
    let config = load_config(config_path)?;
    let dir = data_dir(&config);
    let symbols = CsvAdapter::new(dir.clone()).list_symbols()?;

    if symbols.is_empty() {
        eprintln!("No symbols found in {}", dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn run_info(config_path: &Path, symbol: Option<&str>) -> Result<(), SwingtestError> {
    let config = load_config(config_path)?;
    let adapter = CsvAdapter::new(data_dir(&config));

    let symbols = match symbol
        .map(str::to_string)
        .or_else(|| config.get_string("data", "symbol"))
        .filter(|s| !s.trim().is_empty())
    {
        Some(s) => vec![s.trim().to_uppercase()],
        None => adapter.list_symbols()?,
    };

    for s in &symbols {
        match adapter.get_data_range(s) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} bars, {} to {}", s, count, first, last);
            }
            Ok(None) => eprintln!("{}: no data found", s),
            Err(e) => eprintln!("error reading {}: {}", s, e),
        }
    }
    Ok(())
}
