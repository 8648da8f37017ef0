//! One reconciliation cycle for a schema-less remote object.
//!
//! The caller keeps the stored state (what was last written or read) and
//! declares the desired state. [`ManagedResource`] decides what to send:
//!
//! 1. patch = `diff(stored, desired)`: the minimal additive body to send
//! 2. after a write the object is read back, and that body becomes the new
//!    stored state

use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::{ApplyResult, RequestOptions};
use log::{debug, info};
use reconcile::{UpdateOptions, diff, is_empty, merge};
use serde_json::{Value, json};

/// Outcome of a create.
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    /// Server-assigned id.
    pub id: String,
    /// State to store: the desired body merged with the response.
    pub state: Value,
}

/// Outcome of an update.
#[derive(Debug, Clone, PartialEq)]
pub struct Updated {
    /// `NoChange` when nothing was sent, `Modified` otherwise.
    pub result: ApplyResult,
    /// State to store after the call: the object as read back after a
    /// write, `stored` otherwise.
    pub state: Value,
}

/// A remote object addressed as `{url}/{id}` within a collection `url`.
///
/// # Example
///
/// ```
/// use graphkit::{Client, ManagedResource, MockTransport};
/// use reconcile::UpdateOptions;
/// use serde_json::json;
///
/// let client = Client::with_transport(Box::new(MockTransport::new()));
/// let groups = ManagedResource::new(&client, "groups", UpdateOptions::new());
///
/// let stored = json!({"@odata.type": "#microsoft.graph.group", "displayName": "Old", "mail": "g@x"});
/// let desired = json!({"@odata.type": "#microsoft.graph.group", "displayName": "New"});
/// assert_eq!(
///     groups.plan_update(&stored, &desired),
///     Some(json!({"@odata.type": "#microsoft.graph.group", "displayName": "New"}))
/// );
/// ```
pub struct ManagedResource<'a> {
    client: &'a Client,
    url: String,
    options: UpdateOptions,
}

impl<'a> ManagedResource<'a> {
    /// Manage objects of the collection at `url`.
    pub fn new(client: &'a Client, url: impl Into<String>, options: UpdateOptions) -> Self {
        Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            options,
        }
    }

    /// URL of one object.
    pub fn object_url(&self, id: &str) -> String {
        format!("{}/{id}", self.url)
    }

    /// Create the object.
    ///
    /// Fails with [`Error::InvalidResponse`] when the response carries no id.
    pub fn create(&self, desired: &Value, options: &RequestOptions) -> Result<Created> {
        let response = self
            .client
            .create(&self.url, desired, options)?
            .unwrap_or_else(|| json!({}));

        let id = response
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::InvalidResponse(format!("{}: create response has no id", self.url)))?
            .to_string();

        info!("{}: created {id}", self.url);
        Ok(Created {
            id,
            state: merge(desired, &response),
        })
    }

    /// Read the object. `None` means it no longer exists.
    pub fn read(&self, id: &str, options: &RequestOptions) -> Result<Option<Value>> {
        match self.client.read(&self.object_url(id), options) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.is_not_found() => {
                info!("{}: {id} not found, dropping stored state", self.url);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Patch needed to move `stored` to `desired`, if any.
    ///
    /// Arrays that differ in any way, length included, are sent whole.
    /// Keys missing from `desired` are never sent.
    pub fn plan_update(&self, stored: &Value, desired: &Value) -> Option<Value> {
        diff(stored, desired, &self.options).filter(|patch| !is_empty(Some(patch)))
    }

    /// Move the object from `stored` to `desired`.
    ///
    /// Sends nothing when the plan is empty. Otherwise the patch is sent and
    /// the object is read back for the new stored state.
    pub fn apply_update(
        &self,
        id: &str,
        stored: &Value,
        desired: &Value,
        options: &RequestOptions,
    ) -> Result<Updated> {
        let Some(patch) = self.plan_update(stored, desired) else {
            debug!("{}: {id} is up to date", self.url);
            return Ok(Updated {
                result: ApplyResult::NoChange,
                state: stored.clone(),
            });
        };

        let url = self.object_url(id);
        self.client.update(&url, &patch, options)?;
        info!("{}: updated {id}", self.url);

        let state = self.client.read(&url, options)?;
        Ok(Updated {
            result: ApplyResult::Modified,
            state,
        })
    }

    /// Delete the object. An object that is already gone counts as removed
    /// earlier and yields `NoChange`.
    pub fn delete(&self, id: &str, options: &RequestOptions) -> Result<ApplyResult> {
        match self.client.delete(&self.object_url(id), options) {
            Ok(()) => {
                info!("{}: deleted {id}", self.url);
                Ok(ApplyResult::Removed)
            }
            Err(e) if e.is_not_found() => Ok(ApplyResult::NoChange),
            Err(e) => Err(e),
        }
    }
}
