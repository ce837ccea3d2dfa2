//! Error types shared by the report library.
//!
//! Row-level problems never show up here: they are logged and the row is
//! skipped. These errors cover configuration and whole-file failures.

use std::path::PathBuf;
use thiserror::Error;

/// Problems loading or interpreting the properties file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot find properties file <{0}>")]
    NotFound(PathBuf),

    #[error("Failed to read properties file <{path}>: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write properties file <{path}>: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Illegal number format for {key}: '{value}'")]
    InvalidNumber { key: String, value: String },

    #[error("Illegal boolean value for {key}: '{value}'")]
    InvalidBool { key: String, value: String },
}

/// Problems opening the input export or locating its columns.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Can't find appropriate columns, missing: {}", .0.join(" "))]
    MissingColumns(Vec<String>),

    #[error("Input file has no header row")]
    Empty,

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read workbook input: {0}")]
    Workbook(String),
}

/// Configuration problems detected while laying out a report variant.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Config Error: No {key} line found")]
    MissingColumn { key: String },

    #[error("Config Error: {key} has invalid column '{value}'")]
    InvalidColumn { key: String, value: String },

    #[error("Config Error: {key} lists invalid team id '{value}'")]
    InvalidTeamId { key: String, value: String },

    #[error("Config Error: {key} has non-numeric start row '{value}'")]
    InvalidStartRow { key: String, value: String },

    #[error("Failed to write cell at row {row}, column {col}: {message}")]
    Sink { row: u32, col: u16, message: String },
}
