//! Core types shared by the client, paginator and syncers.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Query parameters: each key may carry several values.
pub type QueryParameters = BTreeMap<String, Vec<String>>;

/// Per-call options for client operations.
///
/// # Example
///
/// ```
/// use graphkit::RequestOptions;
/// use std::time::Duration;
///
/// let opts = RequestOptions::new()
///     .query("$select", "id,displayName")
///     .header("ConsistencyLevel", "eventual")
///     .timeout(Duration::from_secs(300));
/// assert_eq!(opts.query["$select"], vec!["id,displayName"]);
/// assert!(opts.deadline.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query parameters for the first request of the operation.
    pub query: QueryParameters,
    /// Extra headers for the first request of the operation.
    pub headers: BTreeMap<String, String>,
    /// Point in time after which no further request is sent.
    pub deadline: Option<Instant>,
}

impl RequestOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter value.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Replace all query parameters.
    pub fn query_parameters(mut self, query: QueryParameters) -> Self {
        self.query = query;
        self
    }

    /// Set a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set an absolute deadline.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the deadline relative to now.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    /// Options for write calls derived from these: same headers and
    /// deadline, no query parameters.
    pub fn for_write(&self) -> Self {
        Self {
            query: QueryParameters::new(),
            headers: self.headers.clone(),
            deadline: self.deadline,
        }
    }

    /// Time left before the deadline.
    ///
    /// Returns `Ok(None)` without a deadline and `DeadlineExceeded` once it
    /// has passed, naming the URL that was about to be requested.
    pub fn remaining(&self, url: &str) -> Result<Option<Duration>> {
        match self.deadline {
            None => Ok(None),
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    Err(Error::DeadlineExceeded {
                        url: url.to_string(),
                    })
                } else {
                    Ok(Some(deadline - now))
                }
            }
        }
    }
}

/// Parse `key=value` strings into query parameters.
///
/// Repeated keys accumulate values in order.
pub fn parse_query_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<QueryParameters> {
    let mut query = QueryParameters::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, value) = pair
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| Error::InvalidUrl(format!("query parameter must be key=value: {pair}")))?;
        query
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }
    Ok(query)
}

/// Result of applying a change to a remote resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Resource was modified
    Modified,
    /// Resource was removed
    Removed,
}
