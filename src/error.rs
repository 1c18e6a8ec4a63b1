use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

/// Failures while turning an input file into a [`Dataset`](crate::data::model::Dataset).
#[derive(Error, Debug)]
pub enum DataError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet read error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Row {row}: invalid timestamp {year}-{month:02}-{day:02} {hour:02}h")]
    InvalidTimestamp {
        row: usize,
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
    },

    #[error("Row {row}: {message}")]
    InvalidRecord { row: usize, message: String },
}
