//! File I/O for the sentcast pipeline.
//!
//! This crate reads the pipeline's inputs and writes its artifacts:
//! price tables and raw messages from CSV, date-keyed tables and daily
//! sentiment back to CSV, forecast records in the
//! `date, actual_value, predicted_value[, lower_bound, upper_bound]` layout,
//! and JSON for scaler state and reports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sentcast_data::{load_messages, load_price_table, write_daily_sentiment};
//! use std::path::Path;
//!
//! let prices = load_price_table(Path::new("stock_yfinance_data.csv"), "Date", &["Close"])?;
//! let tweets = load_messages(Path::new("stock_tweets.csv"), "Date", "Tweet")?;
//! ```

mod artifact;
mod csv;
mod error;

pub use artifact::{
    load_forecast_records, load_json, load_scaler, save_json, save_scaler, write_forecast_records,
};
pub use csv::{
    load_daily_sentiment, load_keyed_table, load_messages, load_price_table, load_table,
    write_daily_sentiment, write_table,
};
pub use error::DataError;

/// Result type for file operations.
pub type Result<T> = std::result::Result<T, DataError>;
