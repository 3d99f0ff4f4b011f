//! Loads the labelled time series from a delimited text file.

use crate::domain::errors::DataError;
use crate::domain::series::SeriesPoint;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

/// One row of the input file. Columns other than `value` and `trend` are ignored.
#[derive(Debug, Deserialize)]
struct SeriesRecord {
    value: f64,
    trend: String,
}

pub fn read_series(path: &Path) -> Result<Vec<SeriesPoint>> {
    let file = File::open(path).with_context(|| format!("Failed to open series file {:?}", path))?;
    let points = read_series_from(BufReader::new(file))
        .with_context(|| format!("Failed to read series from {:?}", path))?;

    info!("Loaded {} rows from {:?}", points.len(), path);
    Ok(points)
}

/// Parses series rows from any reader with a `value,trend` header.
pub fn read_series_from<R: Read>(reader: R) -> Result<Vec<SeriesPoint>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut points = Vec::new();
    for (row, result) in rdr.deserialize().enumerate() {
        let record: SeriesRecord = result.with_context(|| format!("Invalid record at row {}", row + 1))?;
        if !record.value.is_finite() {
            return Err(DataError::NonFiniteValue {
                row: row + 1,
                value: record.value,
            }
            .into());
        }
        points.push(SeriesPoint::new(record.value, record.trend));
    }

    if points.is_empty() {
        return Err(DataError::EmptySeries.into());
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_rows_and_ignores_extra_columns() {
        let data = "timestamp,value,trend\n1, 20.5 , up\n2,19.0,down\n3,19.0,stable\n";

        let points = read_series_from(data.as_bytes()).unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].value, 20.5);
        assert_eq!(points[0].trend, "up");
        assert_eq!(points[2].trend, "stable");
    }

    #[test]
    fn test_rejects_non_numeric_value() {
        let data = "value,trend\nabc,up\n";
        assert!(read_series_from(data.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_non_finite_value() {
        let data = "value,trend\n1.0,up\nNaN,down\n";
        let err = read_series_from(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::NonFiniteValue { row: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_empty_file() {
        let data = "value,trend\n";
        let err = read_series_from(data.as_bytes()).unwrap_err();
        assert!(matches!(err.downcast_ref::<DataError>(), Some(DataError::EmptySeries)));
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = read_series(Path::new("/nonexistent/series.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open series file"));
    }
}
