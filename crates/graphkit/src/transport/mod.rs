//! Transport abstraction for a single request/response exchange.
//!
//! This module provides the [`Transport`] trait and its implementations.
//! The primary implementation is [`http::HttpTransport`], which talks to a
//! real API over HTTPS.
//!
//! # Testing
//!
//! Use [`MockTransport`] for testing without network access:
//!
//! ```
//! use graphkit::transport::{Method, MockTransport, Request, Transport};
//! use serde_json::json;
//!
//! let mock = MockTransport::new();
//! mock.respond(Method::Get, "users", 200, Some(json!({"value": []})));
//!
//! let response = mock.send(&Request::new(Method::Get, "users", "v1.0")).unwrap();
//! assert_eq!(response.status, 200);
//! assert_eq!(mock.requests().len(), 1);
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::types::{QueryParameters, RequestOptions};
use log::debug;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Upper-case method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Parse a method name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "PATCH" => Some(Method::Patch),
            "DELETE" => Some(Method::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing request.
///
/// `url` is either a path relative to `{host}/{api_version}` or an absolute
/// URL (a continuation link), which is used verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub api_version: String,
    pub body: Option<Value>,
    pub query: QueryParameters,
    pub headers: BTreeMap<String, String>,
    /// Upper bound for this single exchange.
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a request without body, query or headers.
    pub fn new(method: Method, url: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            api_version: api_version.into(),
            body: None,
            query: QueryParameters::new(),
            headers: BTreeMap::new(),
            timeout: None,
        }
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach query parameters.
    pub fn with_query(mut self, query: QueryParameters) -> Self {
        self.query = query;
        self
    }

    /// Attach headers.
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Whether `url` is absolute rather than relative to the API root.
    pub fn is_absolute(&self) -> bool {
        self.url.starts_with("https://") || self.url.starts_with("http://")
    }
}

/// A decoded response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    /// `None` when the body was empty.
    pub body: Option<Value>,
}

impl Response {
    /// Create a response.
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// Server-provided error message, falling back to the status code.
    ///
    /// Understands the OData error envelope `{"error": {"message": ..}}`.
    pub fn error_message(&self) -> String {
        let body = self.body.as_ref();
        body.and_then(|b| b.pointer("/error/message"))
            .and_then(Value::as_str)
            .or_else(|| body.and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", self.status))
    }

    /// Turn a status outside `accepted` into an error.
    ///
    /// 404 becomes [`Error::NotFound`]; anything else becomes
    /// [`Error::RequestFailed`] carrying the server's message.
    pub fn ensure_status(self, request: &Request, accepted: &[u16]) -> Result<Self> {
        if accepted.contains(&self.status) {
            return Ok(self);
        }
        if self.status == 404 {
            return Err(Error::NotFound {
                url: request.url.clone(),
            });
        }
        Err(Error::RequestFailed {
            method: request.method.to_string(),
            url: request.url.clone(),
            status: self.status,
            message: self.error_message(),
        })
    }
}

/// Send `request` under `options` and check the status.
///
/// Fails with [`Error::DeadlineExceeded`] without sending anything once the
/// deadline has passed; otherwise the remaining time bounds the exchange.
pub(crate) fn exchange(
    transport: &dyn Transport,
    mut request: Request,
    options: &RequestOptions,
    accepted: &[u16],
) -> Result<Response> {
    request.timeout = options.remaining(&request.url)?;
    let response = transport.send(&request)?;
    debug!("{} {} -> HTTP {}", request.method, request.url, response.status);
    response.ensure_status(&request, accepted)
}

/// Performs one request/response exchange.
///
/// Implementations return every response the server sends, whatever its
/// status; deciding which statuses count as success is up to the caller.
/// `Err` is reserved for exchanges that produced no response at all.
pub trait Transport: Send + Sync {
    /// Send a request and wait for its response.
    fn send(&self, request: &Request) -> Result<Response>;

    /// Root URL of the API, without the version segment.
    fn base_url(&self) -> &str;
}

type Reply = std::result::Result<Response, String>;

/// Mock transport for testing without network access.
///
/// Replies are queued per method and URL and consumed in order. The last
/// queued reply for a key is repeated once the queue would run dry. Unknown
/// requests get a 404 with an OData error body. Every request is recorded.
#[derive(Debug, Clone)]
pub struct MockTransport {
    base_url: String,
    replies: Arc<Mutex<HashMap<(Method, String), VecDeque<Reply>>>>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::with_base_url("https://graph.microsoft.com")
    }
}

impl MockTransport {
    /// Create a new empty mock transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock transport reporting a custom base URL.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            replies: Arc::default(),
            requests: Arc::default(),
        }
    }

    /// Queue a response for a method and URL.
    pub fn respond(&self, method: Method, url: impl Into<String>, status: u16, body: Option<Value>) {
        self.push(method, url.into(), Ok(Response::new(status, body)));
    }

    /// Queue a transport failure for a method and URL.
    pub fn fail(&self, method: Method, url: impl Into<String>, message: impl Into<String>) {
        self.push(method, url.into(), Err(message.into()));
    }

    /// All requests sent so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, method: Method, url: String, reply: Reply) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, url))
            .or_default()
            .push_back(reply);
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        self.requests
            .lock()
            .map_err(|e| Error::transport(e.to_string()))?
            .push(request.clone());

        let mut replies = self
            .replies
            .lock()
            .map_err(|e| Error::transport(e.to_string()))?;
        let queue = replies.get_mut(&(request.method, request.url.clone()));
        let reply = match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match reply {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(Error::transport(message)),
            None => Ok(Response::new(
                404,
                Some(json!({
                    "error": {
                        "code": "Request_ResourceNotFound",
                        "message": format!("mock has no reply for {} {}", request.method, request.url)
                    }
                })),
            )),
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
