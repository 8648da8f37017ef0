//! High-level API client.

use crate::collection::{
    ADD_STATUSES, CollectionPlan, SyncProgress, SyncSummary, apply_plan, base_collection_url,
    flatten_reference_ids, plan, validate_collection_url,
};
use crate::error::{Error, Result};
use crate::pager::fetch_all;
use crate::transport::http::{DEFAULT_HOST, HttpTransport};
use crate::transport::{Method, Request, Transport, exchange};
use crate::types::RequestOptions;
use log::debug;
use reconcile::next_link;
use serde_json::Value;

/// Default API version.
pub const DEFAULT_API_VERSION: &str = "v1.0";

/// API versions the client accepts.
pub const API_VERSIONS: &[&str] = &["v1.0", "beta"];

const READ_STATUSES: &[u16] = &[200];
const CREATE_STATUSES: &[u16] = ADD_STATUSES;
const UPDATE_STATUSES: &[u16] = &[200, 202, 204];
const DELETE_STATUSES: &[u16] = &[200, 202, 204];
const ACTION_STATUSES: &[u16] = &[200, 201, 202, 204];

/// Check that an API version is one the client accepts.
pub fn validate_api_version(version: &str) -> Result<()> {
    if API_VERSIONS.contains(&version) {
        Ok(())
    } else {
        Err(Error::InvalidUrl(format!(
            "unsupported API version '{version}' (expected one of: {})",
            API_VERSIONS.join(", ")
        )))
    }
}

/// Client for one API host and version.
///
/// URLs passed to its methods are relative to `{host}/{api_version}`.
///
/// # Example
///
/// ```
/// use graphkit::{Client, Method, MockTransport, RequestOptions};
/// use serde_json::json;
///
/// let mock = MockTransport::new();
/// mock.respond(Method::Get, "groups/1", 200, Some(json!({"id": "1"})));
///
/// let client = Client::with_transport(Box::new(mock));
/// let group = client.read("groups/1", &RequestOptions::new()).unwrap();
/// assert_eq!(group["id"], "1");
/// ```
pub struct Client {
    transport: Box<dyn Transport>,
    api_version: String,
}

impl Client {
    /// Create a client talking HTTPS to `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_transport(Box::new(HttpTransport::new(host)))
    }

    /// Create a client over any transport.
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Use a different API version.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Result<Self> {
        let api_version = api_version.into();
        validate_api_version(&api_version)?;
        self.api_version = api_version;
        Ok(self)
    }

    /// Host the client talks to.
    pub fn host(&self) -> &str {
        self.transport.base_url()
    }

    /// API version of every request.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    fn request(&self, method: Method, url: &str, options: &RequestOptions) -> Request {
        Request::new(method, url, &self.api_version)
            .with_query(options.query.clone())
            .with_headers(options.headers.clone())
    }

    /// Read a single object.
    ///
    /// When the answer turns out to be the first page of a collection, the
    /// whole collection is listed instead.
    pub fn read(&self, url: &str, options: &RequestOptions) -> Result<Value> {
        let request = self.request(Method::Get, url, options);
        let response = exchange(self.transport.as_ref(), request, options, READ_STATUSES)?;
        let body = response.body.unwrap_or(Value::Null);
        if next_link(&body).is_some() {
            debug!("{url}: response is paged, listing instead");
            return self.list(url, options);
        }
        Ok(body)
    }

    /// List every page of a collection. See [`fetch_all`].
    pub fn list(&self, url: &str, options: &RequestOptions) -> Result<Value> {
        fetch_all(self.transport.as_ref(), url, &self.api_version, options)
    }

    /// List a collection and return its member ids.
    pub fn list_ref_ids(&self, url: &str, options: &RequestOptions) -> Result<Vec<String>> {
        flatten_reference_ids(&self.list(url, options)?)
    }

    /// Create an object. Returns the response body, if any.
    pub fn create(&self, url: &str, body: &Value, options: &RequestOptions) -> Result<Option<Value>> {
        let request = self.request(Method::Post, url, options).with_body(body.clone());
        Ok(exchange(self.transport.as_ref(), request, options, CREATE_STATUSES)?.body)
    }

    /// Patch an object. Returns the response body, if any.
    pub fn update(&self, url: &str, body: &Value, options: &RequestOptions) -> Result<Option<Value>> {
        let request = self.request(Method::Patch, url, options).with_body(body.clone());
        Ok(exchange(self.transport.as_ref(), request, options, UPDATE_STATUSES)?.body)
    }

    /// Delete an object.
    pub fn delete(&self, url: &str, options: &RequestOptions) -> Result<()> {
        let request = self.request(Method::Delete, url, options);
        exchange(self.transport.as_ref(), request, options, DELETE_STATUSES)?;
        Ok(())
    }

    /// Invoke an arbitrary endpoint. A 204 or empty body yields `None`.
    pub fn action(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<Option<Value>> {
        let mut request = self.request(method, url, options);
        request.body = body.cloned();
        let response = exchange(self.transport.as_ref(), request, options, ACTION_STATUSES)?;
        if response.status == 204 {
            return Ok(None);
        }
        Ok(response.body)
    }

    /// Current member ids of the reference collection at `url`.
    ///
    /// `url` may be given with or without its trailing `/$ref`.
    pub fn collection_ids(&self, url: &str, options: &RequestOptions) -> Result<Vec<String>> {
        self.list_ref_ids(base_collection_url(url), options)
    }

    /// Plan the changes that turn the `old` members of a reference
    /// collection into `new`.
    pub fn plan_collection<S: AsRef<str>>(&self, url: &str, old: &[S], new: &[S]) -> Result<CollectionPlan> {
        validate_collection_url(url)?;
        Ok(plan(old, new))
    }

    /// Sync the reference collection at `url` (ending in `/$ref`) from the
    /// `old` member set to `new`.
    pub fn sync_collection<S: AsRef<str>>(
        &self,
        url: &str,
        old: &[S],
        new: &[S],
        options: &RequestOptions,
        progress: &mut dyn SyncProgress,
    ) -> Result<SyncSummary> {
        let plan = self.plan_collection(url, old, new)?;
        self.apply_collection(url, &plan, options, progress)
    }

    /// Apply a plan made by [`Client::plan_collection`].
    pub fn apply_collection(
        &self,
        url: &str,
        plan: &CollectionPlan,
        options: &RequestOptions,
        progress: &mut dyn SyncProgress,
    ) -> Result<SyncSummary> {
        if plan.is_empty() {
            debug!("{url}: collection already in sync");
            return Ok(SyncSummary::default());
        }
        apply_plan(
            self.transport.as_ref(),
            url,
            &self.api_version,
            plan,
            options,
            progress,
        )
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::NoProgress;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn client(mock: &MockTransport) -> Client {
        Client::with_transport(Box::new(mock.clone()))
    }

    #[test]
    fn test_defaults() {
        let client = Client::default();
        assert_eq!(client.host(), DEFAULT_HOST);
        assert_eq!(client.api_version(), "v1.0");
    }

    #[test]
    fn test_api_version_validation() {
        let mock = MockTransport::new();
        assert_eq!(client(&mock).with_api_version("beta").unwrap().api_version(), "beta");
        assert!(client(&mock).with_api_version("v2.0").is_err());
        assert!(validate_api_version("v1.0").is_ok());
    }

    #[test]
    fn test_read_passes_query_and_version() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "applications/1", 200, Some(json!({"id": "1"})));
        let client = client(&mock).with_api_version("beta").unwrap();

        let options = RequestOptions::new().query("$select", "id");
        let body = client.read("applications/1", &options).unwrap();
        assert_eq!(body, json!({"id": "1"}));

        let request = &mock.requests()[0];
        assert_eq!(request.api_version, "beta");
        assert_eq!(request.query["$select"], vec!["id"]);
    }

    #[test]
    fn test_read_not_found() {
        let mock = MockTransport::new();
        let err = client(&mock).read("groups/gone", &RequestOptions::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_read_rejects_other_success_statuses() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "groups/1", 204, None);
        let err = client(&mock).read("groups/1", &RequestOptions::new()).unwrap_err();
        assert!(matches!(err, Error::RequestFailed { status: 204, .. }));
    }

    #[test]
    fn test_read_paged_response_lists() {
        let mock = MockTransport::new();
        let link = "https://graph.microsoft.com/v1.0/users?$skiptoken=2";
        mock.respond(
            Method::Get,
            "users",
            200,
            Some(json!({"value": [{"id": "1"}], "@odata.nextLink": link})),
        );
        mock.respond(Method::Get, link, 200, Some(json!({"value": [{"id": "2"}]})));

        let body = client(&mock).read("users", &RequestOptions::new()).unwrap();
        assert_eq!(body, json!({"value": [{"id": "1"}, {"id": "2"}]}));
    }

    #[test]
    fn test_list_ref_ids() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            "groups/g/members",
            200,
            Some(json!({"value": [{"id": "a", "@odata.type": "#microsoft.graph.user"}, {"id": "b"}]})),
        );
        let client = client(&mock);
        assert_eq!(
            client.list_ref_ids("groups/g/members", &RequestOptions::new()).unwrap(),
            vec!["a", "b"]
        );
        assert_eq!(
            client.collection_ids("groups/g/members/$ref", &RequestOptions::new()).unwrap(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_create_statuses() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "groups", 201, Some(json!({"id": "new"})));
        let client = client(&mock);
        let body = json!({"displayName": "g"});

        let created = client.create("groups", &body, &RequestOptions::new()).unwrap();
        assert_eq!(created, Some(json!({"id": "new"})));
        assert_eq!(mock.requests()[0].body, Some(body));

        mock.respond(Method::Post, "applications", 409, Some(json!({"error": {"message": "conflict"}})));
        let err = client
            .create("applications", &json!({}), &RequestOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::RequestFailed { status: 409, .. }));
    }

    #[test]
    fn test_update_statuses() {
        let mock = MockTransport::new();
        mock.respond(Method::Patch, "groups/1", 204, None);
        let client = client(&mock);
        assert_eq!(
            client.update("groups/1", &json!({"a": 1}), &RequestOptions::new()).unwrap(),
            None
        );

        mock.respond(Method::Patch, "groups/2", 201, None);
        assert!(client.update("groups/2", &json!({}), &RequestOptions::new()).is_err());
    }

    #[test]
    fn test_delete() {
        let mock = MockTransport::new();
        mock.respond(Method::Delete, "groups/1", 204, None);
        let client = client(&mock);
        assert!(client.delete("groups/1", &RequestOptions::new()).is_ok());
        assert!(client.delete("groups/2", &RequestOptions::new()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_action_no_content() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Post,
            "applications/1/addPassword",
            200,
            Some(json!({"secretText": "s"})),
        );
        mock.respond(Method::Post, "users/1/revokeSignInSessions", 204, Some(json!({"value": true})));
        let client = client(&mock);

        let added = client
            .action(
                Method::Post,
                "applications/1/addPassword",
                Some(&json!({"passwordCredential": {}})),
                &RequestOptions::new(),
            )
            .unwrap();
        assert_eq!(added, Some(json!({"secretText": "s"})));

        let revoked = client
            .action(Method::Post, "users/1/revokeSignInSessions", None, &RequestOptions::new())
            .unwrap();
        assert_eq!(revoked, None);
        assert_eq!(mock.requests()[1].body, None);
    }

    #[test]
    fn test_sync_collection() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "groups/g/owners/$ref", 204, None);
        mock.respond(Method::Delete, "groups/g/owners/x/$ref", 204, None);
        let client = client(&mock);

        let summary = client
            .sync_collection(
                "groups/g/owners/$ref",
                &["x", "y"],
                &["y", "z"],
                &RequestOptions::new(),
                &mut NoProgress,
            )
            .unwrap();
        assert_eq!(summary, SyncSummary { added: 1, removed: 1 });
    }

    #[test]
    fn test_sync_collection_in_sync_sends_nothing() {
        let mock = MockTransport::new();
        let summary = client(&mock)
            .sync_collection(
                "groups/g/owners/$ref",
                &["a"],
                &["a"],
                &RequestOptions::new(),
                &mut NoProgress,
            )
            .unwrap();
        assert_eq!(summary.total(), 0);
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_sync_collection_requires_ref_url() {
        let mock = MockTransport::new();
        let empty: [&str; 0] = [];
        let err = client(&mock)
            .sync_collection("groups/g/owners", &empty, &["a"], &RequestOptions::new(), &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
