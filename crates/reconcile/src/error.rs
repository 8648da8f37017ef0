//! Error types for reconciliation.

use thiserror::Error;

/// Errors raised by the strict entry points.
///
/// The lenient [`crate::normalize`] never fails; it folds these into a
/// diagnostic string instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Input text is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;
