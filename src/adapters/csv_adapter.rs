//! CSV file data adapter.
//!
//! Expected columns: `timestamp,open,high,low,close,volume`. A header row is
//! optional. Rows that are short or carry non-numeric or non-finite values are
//! skipped with a warning rather than failing the whole load.

use crate::domain::error::LwtrendError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

const COLUMNS: usize = 6;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_error(&self, reason: impl ToString) -> LwtrendError {
        LwtrendError::DataRead {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

fn is_header(record: &StringRecord) -> bool {
    record
        .get(1)
        .is_some_and(|field| field.eq_ignore_ascii_case("open"))
}

fn parse_record(record: &StringRecord) -> Option<OhlcvBar> {
    if record.len() < COLUMNS {
        return None;
    }
    let field = |i: usize| {
        record
            .get(i)?
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    };
    Some(OhlcvBar {
        timestamp: record.get(0)?.to_string(),
        open: field(1)?,
        high: field(2)?,
        low: field(3)?,
        close: field(4)?,
        volume: field(5)?,
    })
}

/// Parses bars from any reader, keeping source order.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<OhlcvBar>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        if row == 0 && is_header(&record) {
            continue;
        }
        match parse_record(&record) {
            Some(bar) => bars.push(bar),
            None => tracing::warn!(row = row + 1, "skipping malformed bar row"),
        }
    }
    Ok(bars)
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self) -> Result<Vec<OhlcvBar>, LwtrendError> {
        let file = File::open(&self.path).map_err(|e| self.read_error(e))?;
        let bars = read_bars(file).map_err(|e| self.read_error(e))?;
        tracing::debug!(path = %self.path.display(), bars = bars.len(), "loaded bars");
        Ok(bars)
    }
}
