//! Ordered daily price series.
//!
//! Dates must be strictly ascending. Gaps (weekends, holidays) are fine.

use chrono::NaiveDate;

use super::error::SwingtestError;
use super::ohlcv::Bar;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<Bar>,
    closes: Vec<f64>,
}

impl PriceSeries {
    /// Validates ordering. A duplicate or descending date is a usage error;
    /// the series is never silently repaired.
    pub fn new(bars: Vec<Bar>) -> Result<Self, SwingtestError> {
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(SwingtestError::UnorderedDates {
                    index: i + 1,
                    previous: pair[0].date,
                    date: pair[1].date,
                });
            }
        }
        let closes = bars.iter().map(|b| b.close).collect();
        Ok(Self { bars, closes })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar(&self, i: usize) -> &Bar {
        &self.bars[i]
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Calendar days between the first and last bar; 0 for fewer than two bars.
    pub fn calendar_span_days(&self) -> i64 {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => (last - first).num_days(),
            _ => 0,
        }
    }
}
