//! Library-level error type. The CLI boundary wraps these in `anyhow`.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration rejected: {0}")]
    Configuration(String),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("numeric mismatch: expected {expected}, got {actual} (tolerance {tolerance})")]
    NumericMismatch {
        expected: String,
        actual: String,
        tolerance: f32,
    },

    #[error("operation timed out after {cycles} cycles")]
    Timeout { cycles: u64 },
}

pub type SimResult<T> = Result<T, SimError>;
