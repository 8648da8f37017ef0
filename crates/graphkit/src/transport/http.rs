//! HTTPS transport over `ureq`.

use crate::error::{Error, Result};
use crate::transport::{Method, Request, Response, Transport};
use log::{debug, trace};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default API host.
pub const DEFAULT_HOST: &str = "https://graph.microsoft.com";

/// Transport sending requests to a live API.
///
/// Every status the server returns is handed back as a [`Response`]; only
/// connection-level failures become errors.
///
/// # Example
///
/// ```no_run
/// use graphkit::transport::{Method, Request, Transport};
/// use graphkit::transport::http::HttpTransport;
///
/// let transport = HttpTransport::new("https://graph.microsoft.com")
///     .with_header("Authorization", "Bearer ...");
/// let response = transport.send(&Request::new(Method::Get, "me", "v1.0")).unwrap();
/// println!("HTTP {}", response.status);
/// ```
pub struct HttpTransport {
    agent: ureq::Agent,
    host: String,
    headers: BTreeMap<String, String>,
}

impl HttpTransport {
    /// Create a transport for `host` (scheme and authority, no version).
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            host: host.into().trim_end_matches('/').to_string(),
            headers: BTreeMap::new(),
        }
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add several headers sent with every request.
    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Full URL for a request.
    ///
    /// Absolute URLs are returned unchanged; anything else is joined onto
    /// `{host}/{api_version}`.
    pub fn resolve_url(&self, request: &Request) -> String {
        if request.is_absolute() {
            request.url.clone()
        } else {
            format!(
                "{}/{}/{}",
                self.host,
                request.api_version,
                request.url.trim_start_matches('/')
            )
        }
    }

    fn prepare<B>(&self, builder: ureq::RequestBuilder<B>, request: &Request) -> ureq::RequestBuilder<B> {
        let mut builder = builder
            .header("Accept", "application/json")
            .header("User-Agent", concat!("graphkit/", env!("CARGO_PKG_VERSION")));
        for (key, value) in self.headers.iter().chain(&request.headers) {
            builder = builder.header(key.as_str(), value.as_str());
        }
        // Continuation links already carry their query string.
        if !request.is_absolute() {
            for (key, values) in &request.query {
                for value in values {
                    builder = builder.query(key.as_str(), value.as_str());
                }
            }
        }
        match request.timeout {
            Some(timeout) => builder.config().timeout_global(Some(timeout)).build(),
            None => builder,
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        let url = self.resolve_url(request);
        debug!("{} {}", request.method, url);

        let result = match request.method {
            Method::Get => self.prepare(self.agent.get(&url), request).call(),
            Method::Delete => self.prepare(self.agent.delete(&url), request).call(),
            Method::Post => send_body(self.prepare(self.agent.post(&url), request), request.body.as_ref()),
            Method::Put => send_body(self.prepare(self.agent.put(&url), request), request.body.as_ref()),
            Method::Patch => send_body(self.prepare(self.agent.patch(&url), request), request.body.as_ref()),
        };

        let mut response = match result {
            Ok(response) => response,
            Err(ureq::Error::Timeout(_)) => {
                return Err(Error::DeadlineExceeded { url });
            }
            Err(e) => return Err(e.into()),
        };

        let status = response.status().as_u16();
        let text = response.body_mut().read_to_string()?;
        trace!("HTTP {status} from {url}: {} bytes", text.len());

        Ok(Response::new(status, decode_body(status, &text)?))
    }

    fn base_url(&self) -> &str {
        &self.host
    }
}

fn send_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&Value>,
) -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .send_json(body),
        None => builder.send_empty(),
    }
}

/// Decode a response body.
///
/// Empty bodies decode to `None`. Error responses that are not JSON keep
/// their text as a string value so the message is not lost.
fn decode_body(status: u16, text: &str) -> Result<Option<Value>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str(text) {
        Ok(value) => Ok(Some(value)),
        Err(_) if !(200..300).contains(&status) => Ok(Some(Value::String(text.to_string()))),
        Err(e) => Err(e.into()),
    }
}
