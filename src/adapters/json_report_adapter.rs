//! JSON report adapter implementing ReportPort.
//!
//! Writes one pretty-printed document per call, either to a file or to
//! stdout when no path is configured.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SwingtestError;
use crate::domain::optimizer::RankedRun;
use crate::domain::strategy::StrategyParams;
use crate::ports::report_port::ReportPort;

#[derive(Serialize)]
struct BacktestReport<'a> {
    symbol: &'a str,
    params: &'a StrategyParams,
    #[serde(flatten)]
    result: &'a BacktestResult,
}

#[derive(Serialize)]
struct RankingReport<'a> {
    symbol: &'a str,
    runs: &'a [RankedRun],
}

pub struct JsonReportAdapter {
    output_path: Option<PathBuf>,
}

impl JsonReportAdapter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    fn emit<T: Serialize>(&self, document: &T) -> Result<(), SwingtestError> {
        let mut json = serde_json::to_string_pretty(document).map_err(|e| {
            SwingtestError::Report {
                reason: format!("failed to serialize report: {}", e),
            }
        })?;
        json.push('\n');

        match &self.output_path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, json).map_err(|e| SwingtestError::Report {
                    reason: format!("failed to write {}: {}", path.display(), e),
                })?;
                info!(path = %path.display(), "report written");
            }
            None => {
                let mut out = std::io::stdout().lock();
                out.write_all(json.as_bytes())?;
                out.flush()?;
            }
        }
        Ok(())
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        symbol: &str,
        params: &StrategyParams,
        result: &BacktestResult,
    ) -> Result<(), SwingtestError> {
        self.emit(&BacktestReport {
            symbol,
            params,
            result,
        })
    }

    fn write_ranking(&self, symbol: &str, runs: &[RankedRun]) -> Result<(), SwingtestError> {
        self.emit(&RankingReport { symbol, runs })
    }
}
