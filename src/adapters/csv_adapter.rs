//! CSV file data adapter.
//!
//! One file per symbol, `<base_path>/<SYMBOL>.csv`, with a header row and
//! columns `date,open,high,low,close[,volume]`. Rows may arrive in any order;
//! the adapter sorts them and keeps the last row for a repeated date.

use crate::domain::error::SwingtestError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<Bar>, SwingtestError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| SwingtestError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| SwingtestError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let bar = parse_record(&record)?;
            if !(bar.close.is_finite() && bar.close > 0.0) {
                warn!(symbol, row = line + 2, close = bar.close, "skipping row with unusable close");
                continue;
            }
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        let before = bars.len();
        // dedup_by keeps the first of a run; reverse so the last row wins.
        bars.reverse();
        bars.dedup_by_key(|b| b.date);
        bars.reverse();
        if bars.len() != before {
            warn!(symbol, dropped = before - bars.len(), "dropped duplicate dates");
        }
        Ok(bars)
    }
}

fn parse_field(record: &StringRecord, idx: usize, name: &str) -> Result<f64, SwingtestError> {
    record
        .get(idx)
        .ok_or_else(|| SwingtestError::Data {
            reason: format!("missing {} column", name),
        })?
        .parse()
        .map_err(|e| SwingtestError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

fn parse_record(record: &StringRecord) -> Result<Bar, SwingtestError> {
    let date_str = record.get(0).ok_or_else(|| SwingtestError::Data {
        reason: "missing date column".into(),
    })?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        SwingtestError::Data {
            reason: format!("invalid date format: {}", e),
        }
    })?;

    Ok(Bar {
        date,
        open: parse_field(record, 1, "open")?,
        high: parse_field(record, 2, "high")?,
        low: parse_field(record, 3, "low")?,
        close: parse_field(record, 4, "close")?,
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, SwingtestError> {
        let bars = self
            .read_all(symbol)?
            .into_iter()
            .filter(|b| start_date.is_none_or(|s| b.date >= s))
            .filter(|b| end_date.is_none_or(|e| b.date <= e))
            .collect();
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SwingtestError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SwingtestError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SwingtestError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    symbols.push(stem.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SwingtestError> {
        if !self.csv_path(symbol).exists() {
            return Ok(None);
        }
        let bars = self.read_all(symbol)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
