use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong while turning a source file into a
/// [`SalesTable`](crate::data::model::SalesTable).
///
/// Row numbers are 1-based data rows (the first row after the header is 1).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source file not found: {0}")]
    MissingFile(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("sheet '{0}' not found in workbook")]
    MissingSheet(String),

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("invalid column window '{0}' (expected letters like \"B:R\")")]
    BadWindow(String),

    #[error("header row {row} is empty in the selected window")]
    EmptyHeader { row: u32 },

    #[error("row {row}, column '{column}': '{value}' is not a number")]
    BadNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}, column '{column}': '{value}' is not a time of day")]
    BadTime {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}, column '{column}': empty category value")]
    EmptyCategory { row: usize, column: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
