//! Price data access port trait.

use crate::domain::error::SwingtestError;
use crate::domain::ohlcv::Bar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `symbol`, ascending and de-duplicated by date.
    /// `None` bounds are open.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, SwingtestError>;

    fn list_symbols(&self) -> Result<Vec<String>, SwingtestError>;

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SwingtestError>;
}
