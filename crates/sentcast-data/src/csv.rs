//! CSV reading and writing of tables and messages.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use sentcast_sentiment::{DailySentiment, Message};
use sentcast_traits::TimeSeriesTable;
use tracing::debug;

use crate::{DataError, Result};

pub(crate) fn read_frame(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()?;
    debug!(path = %path.display(), rows = df.height(), cols = df.width(), "read csv");
    Ok(df)
}

pub(crate) fn write_frame(path: &Path, df: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    debug!(path = %path.display(), rows = df.height(), "wrote csv");
    Ok(())
}

pub(crate) fn require_column(df: &DataFrame, path: &Path, column: &str) -> Result<()> {
    if df.get_column_names().iter().any(|c| c.as_str() == column) {
        Ok(())
    } else {
        Err(DataError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
    }
}

/// Load a date-keyed price table from CSV.
///
/// Value column names are lower-cased in the table, so a file with `Date` and
/// `Close` headers loaded with `("Date", &["Close"])` yields a `close` column.
/// Rows are sorted by date; duplicate dates and missing values are errors.
///
/// # Errors
///
/// Returns [`DataError::MissingColumn`] if a requested column is absent and
/// [`DataError::Core`] if the rows do not form a valid table.
pub fn load_price_table<S: AsRef<str>>(
    path: &Path,
    date_column: &str,
    value_columns: &[S],
) -> Result<TimeSeriesTable> {
    let df = read_frame(path)?;
    require_column(&df, path, date_column)?;
    for column in value_columns {
        require_column(&df, path, column.as_ref())?;
    }

    let raw = TimeSeriesTable::from_frame(&df, date_column, value_columns)?;
    let columns = value_columns
        .iter()
        .map(|name| {
            let name = name.as_ref();
            raw.require_column(name)
                .map(|values| (name.to_lowercase(), values.to_vec()))
        })
        .collect::<sentcast_traits::Result<Vec<_>>>()?;
    Ok(TimeSeriesTable::new(raw.dates().to_vec(), columns)?)
}

/// Load a table written by [`write_table`], reading every non-date column.
pub fn load_table(path: &Path) -> Result<TimeSeriesTable> {
    load_keyed_table(path, sentcast_traits::types::DATE_COLUMN)
}

/// Load a table keyed on `key_column`, reading every other column as values.
pub fn load_keyed_table(path: &Path, key_column: &str) -> Result<TimeSeriesTable> {
    let df = read_frame(path)?;
    require_column(&df, path, key_column)?;
    let value_columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|c| c.to_string())
        .filter(|c| c != key_column)
        .collect();
    Ok(TimeSeriesTable::from_frame(&df, key_column, &value_columns)?)
}

/// Write a table as CSV with a leading `date` column.
pub fn write_table(path: &Path, table: &TimeSeriesTable) -> Result<()> {
    let mut df = table.to_frame()?;
    write_frame(path, &mut df)
}

/// Load raw messages from CSV.
///
/// Timestamps are kept as text and parsed during aggregation; null or empty
/// text becomes `None`, to be reported as a scoring failure downstream.
pub fn load_messages(path: &Path, date_column: &str, text_column: &str) -> Result<Vec<Message>> {
    let df = read_frame(path)?;
    require_column(&df, path, date_column)?;
    require_column(&df, path, text_column)?;

    let timestamps = df
        .column(date_column)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let texts = df
        .column(text_column)?
        .as_materialized_series()
        .cast(&DataType::String)?;

    let messages = timestamps
        .str()?
        .into_iter()
        .zip(texts.str()?.into_iter())
        .map(|(timestamp, text)| Message {
            timestamp: timestamp.unwrap_or_default().to_string(),
            text: text.map(str::to_string),
        })
        .collect();
    Ok(messages)
}

/// Write daily sentiment as a two-column CSV (`date`, `column`).
pub fn write_daily_sentiment(path: &Path, daily: &DailySentiment, column: &str) -> Result<()> {
    write_table(path, &daily.to_table(column)?)
}

/// Load daily sentiment from a CSV with a date column and a score column.
pub fn load_daily_sentiment(
    path: &Path,
    date_column: &str,
    column: &str,
) -> Result<DailySentiment> {
    let df = read_frame(path)?;
    require_column(&df, path, date_column)?;
    require_column(&df, path, column)?;
    let table = TimeSeriesTable::from_frame(&df, date_column, &[column])?;
    Ok(DailySentiment::from_table(&table, column)?)
}
