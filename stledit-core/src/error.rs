//! Error types for stledit

use thiserror::Error;

/// Main error type for stledit operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Reasons the initial model load can fail.
///
/// A failed load leaves the editing session permanently empty; nothing is
/// retried.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("model contains no triangles")]
    EmptyModel,

    #[error("triangle {index} has {points} points, expected 3")]
    MalformedTriangle { index: usize, points: usize },

    #[error("triangle {index} has a non-finite coordinate")]
    NonFinitePoint { index: usize },

    #[error("failed to read model: {0}")]
    Source(#[from] Error),
}

/// Result type alias for stledit operations
pub type Result<T> = std::result::Result<T, Error>;
