//! CSV file bar source.
//!
//! Expects a header row; `open`, `high`, `low`, `close` and `volume` are
//! located by name, so extra columns (a date, a symbol) are ignored. Rows are
//! parsed lazily as the stream is consumed.

use crate::domain::error::SimtraderError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::{BarStream, DataPort};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct BarRecord {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl DataPort for CsvAdapter {
    fn open_stream(&self) -> Result<BarStream<'_>, SimtraderError> {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| {
                SimtraderError::data(format!("failed to open {}: {}", self.path.display(), e))
            })?;
        Ok(Box::new(bar_records(rdr)))
    }
}

/// Header lookup is case-sensitive; rows are numbered from 1 after the header.
fn bar_records<R: std::io::Read>(
    rdr: csv::Reader<R>,
) -> impl Iterator<Item = Result<Bar, SimtraderError>> {
    rdr.into_deserialize::<BarRecord>()
        .enumerate()
        .map(|(i, result)| {
            let row = i + 1;
            let record = result
                .map_err(|e| SimtraderError::data(format!("row {}: {}", row, e)))?;
            to_bar(record, row)
        })
}

fn to_bar(record: BarRecord, row: usize) -> Result<Bar, SimtraderError> {
    let prices = [
        ("open", record.open),
        ("high", record.high),
        ("low", record.low),
        ("close", record.close),
    ];
    for (name, value) in prices {
        if !value.is_finite() || value < 0.0 {
            return Err(SimtraderError::data(format!(
                "row {}: invalid {} value {}",
                row, name, value
            )));
        }
    }
    Ok(Bar::new(
        record.open,
        record.high,
        record.low,
        record.close,
        record.volume,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(content: &str) -> Vec<Result<Bar, SimtraderError>> {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        bar_records(rdr).collect()
    }

    #[test]
    fn parses_bars_in_order() {
        let rows = parse(
            "open,high,low,close,volume\n100,101.5,99,100.5,500\n100.5,102,100,101.25,750\n",
        );
        assert_eq!(rows.len(), 2);
        let first = rows[0].as_ref().unwrap();
        assert_eq!(*first, Bar::new(100.0, 101.5, 99.0, 100.5, 500));
        let second = rows[1].as_ref().unwrap();
        assert!((second.close - 101.25).abs() < f64::EPSILON);
        assert_eq!(second.volume, 750);
    }

    #[test]
    fn ignores_extra_columns_and_reordering() {
        let rows = parse("date,close,open,low,high,volume\n2024-01-02,10,9,8,11,42\n");
        let bar = rows[0].as_ref().unwrap();
        assert_eq!(*bar, Bar::new(9.0, 11.0, 8.0, 10.0, 42));
    }

    #[test]
    fn trims_whitespace() {
        let rows = parse("open, high, low, close, volume\n 1 , 2 , 0.5 , 1.5 , 10 \n");
        assert_eq!(*rows[0].as_ref().unwrap(), Bar::new(1.0, 2.0, 0.5, 1.5, 10));
    }

    #[test]
    fn missing_column_is_data_error() {
        let rows = parse("open,high,low,volume\n1,2,0.5,10\n");
        assert!(matches!(rows[0], Err(SimtraderError::Data { .. })));
    }

    #[test]
    fn bad_value_reports_row() {
        let rows = parse("open,high,low,close,volume\n1,2,0.5,1.5,10\n1,2,0.5,abc,10\n");
        assert!(rows[0].is_ok());
        match &rows[1] {
            Err(SimtraderError::Data { reason }) => assert!(reason.starts_with("row 2")),
            other => panic!("Expected Data error, got {:?}", other),
        }
    }

    #[test]
    fn negative_price_rejected() {
        let rows = parse("open,high,low,close,volume\n1,2,-0.5,1.5,10\n");
        match &rows[0] {
            Err(SimtraderError::Data { reason }) => assert!(reason.contains("invalid low")),
            other => panic!("Expected Data error, got {:?}", other),
        }
    }

    #[test]
    fn empty_file_yields_no_bars() {
        assert!(parse("open,high,low,close,volume\n").is_empty());
    }

    #[test]
    fn open_stream_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "open,high,low,close,volume\n5,6,4,5.5,100\n").unwrap();
        file.flush().unwrap();

        let adapter = CsvAdapter::new(file.path().to_path_buf());
        let bars: Vec<Bar> = adapter
            .open_stream()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(bars, vec![Bar::new(5.0, 6.0, 4.0, 5.5, 100)]);
    }

    #[test]
    fn open_stream_missing_file() {
        let adapter = CsvAdapter::new(PathBuf::from("/nonexistent/bars.csv"));
        assert!(matches!(
            adapter.open_stream(),
            Err(SimtraderError::Data { .. })
        ));
    }
}
