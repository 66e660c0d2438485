//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SwingtestError;
use crate::domain::optimizer::RankedRun;
use crate::domain::strategy::StrategyParams;

/// Port for writing backtest and optimizer reports.
pub trait ReportPort {
    fn write(
        &self,
        symbol: &str,
        params: &StrategyParams,
        result: &BacktestResult,
    ) -> Result<(), SwingtestError>;

    fn write_ranking(&self, symbol: &str, runs: &[RankedRun]) -> Result<(), SwingtestError>;
}
