//! Error types for the preview crate.
//!
//! Classification and pagination never fail; only the edges that touch
//! files or parse configuration do.

use std::io;
use thiserror::Error;

/// Result type alias for fallible preview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the preview crate.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading source text or configuration files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration JSON could not be parsed.
    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration parsed but holds unusable values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input file type is not plain text.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}
