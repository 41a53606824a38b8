//! Error types for the foodcost-core library.
//!
//! Extraction itself is deliberately infallible: a document that yields
//! nothing still produces a record plus warnings. Errors here cover the
//! genuinely fallible seams - configuration files and record round-trips.

use thiserror::Error;

/// Main error type for the foodcost library.
#[derive(Error, Debug)]
pub enum FoodcostError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the foodcost library.
pub type Result<T> = std::result::Result<T, FoodcostError>;
