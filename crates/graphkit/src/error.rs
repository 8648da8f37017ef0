//! Error types for graph operations.
//!
//! Errors are categorized so callers can decide what to do at their
//! reconciliation boundary: a `NotFound` on read drops local state, a
//! `Sync` error means a partial convergence that the next read re-plans.

use crate::collection::MemberFailure;
use std::fmt;

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of graph errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection, DNS, TLS or timeout at the transport level.
    Network,
    /// The addressed object or collection does not exist.
    NotFound,
    /// The server answered with a non-success status.
    Rejected,
    /// The response body could not be decoded.
    Format,
    /// The operation's deadline expired.
    Cancelled,
    /// Some collection operations failed, others succeeded.
    Partial,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::NotFound => "Resource not found",
            Self::Rejected => "Request rejected by the server",
            Self::Format => "Unexpected response format",
            Self::Cancelled => "Operation deadline exceeded",
            Self::Partial => "Partially applied",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and try again",
            Self::NotFound => "Verify the URL and that the object still exists",
            Self::Rejected => "Check the request body and your permissions",
            Self::Format => "The endpoint may not return JSON",
            Self::Cancelled => "Raise the timeout or narrow the query",
            Self::Partial => "Run again; the next read re-plans the remaining changes",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server answered 404.
    #[error("not found: {url}")]
    NotFound {
        /// URL that was requested.
        url: String,
    },

    /// The server answered with a status outside the accepted set.
    #[error("{method} {url} failed with HTTP {status}: {message}")]
    RequestFailed {
        /// HTTP method of the request.
        method: String,
        /// URL that was requested.
        url: String,
        /// Status code returned.
        status: u16,
        /// Server-provided error message, if any.
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// The response body is not what was expected.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// A caller-supplied URL is malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The deadline expired before the request could be sent.
    #[error("deadline exceeded before requesting {url}")]
    DeadlineExceeded {
        /// URL that would have been requested next.
        url: String,
    },

    /// One or more collection operations failed.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl Error {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::RequestFailed { .. } => ErrorCategory::Rejected,
            Error::Transport { .. } => ErrorCategory::Network,
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::InvalidUrl(_) => ErrorCategory::Other,
            Error::DeadlineExceeded { .. } => ErrorCategory::Cancelled,
            Error::Sync(_) => ErrorCategory::Partial,
        }
    }

    /// Whether the addressed object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Whether this error is typically transient.
    ///
    /// Throttling (429) and server errors (5xx) count as transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RequestFailed { status, .. } => *status == 429 || *status >= 500,
            other => other.category().is_retryable(),
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        Self::transport(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// Failures collected while applying a collection plan.
///
/// Every planned operation is attempted; this lists the ones that failed
/// alongside the counts that went through.
#[derive(Debug, thiserror::Error)]
#[error(
    "collection sync failed for {} member(s) ({} added, {} removed)",
    .failures.len(),
    .added,
    .removed
)]
pub struct SyncError {
    /// Members whose operation failed.
    pub failures: Vec<MemberFailure>,
    /// Members added successfully.
    pub added: usize,
    /// Members removed successfully.
    pub removed: usize,
}

impl SyncError {
    /// Total number of operations attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.failures.len() + self.added + self.removed
    }

    /// Identifiers of the members that failed.
    #[must_use]
    pub fn failed_members(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.member.as_str()).collect()
    }
}
