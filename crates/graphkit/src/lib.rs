//! # graphkit
//!
//! Generic CRUD against OData-style REST APIs (Microsoft Graph and friends)
//! for objects whose schema is not known in advance.
//!
//! This crate provides:
//! - A [`Transport`] seam with an HTTPS implementation over `ureq` and an
//!   in-memory [`MockTransport`]
//! - A [`Client`] with read, list, create, update, delete and action calls
//! - Paging that follows `@odata.nextLink` ([`fetch_all`])
//! - Membership sync for `$ref` collections ([`collection`])
//! - A reconciliation cycle for single objects ([`ManagedResource`])
//!
//! ## Example
//!
//! ```no_run
//! use graphkit::{Client, NoProgress, RequestOptions};
//! use std::time::Duration;
//!
//! let client = Client::new("https://graph.microsoft.com");
//! let options = RequestOptions::new()
//!     .header("Authorization", "Bearer ...")
//!     .timeout(Duration::from_secs(300));
//!
//! let url = "groups/00000000-0000-0000-0000-000000000000/members/$ref";
//! let current = client.collection_ids(url, &options).unwrap();
//! let summary = client
//!     .sync_collection(url, current.as_slice(), &["user-a".to_string()], &options, &mut NoProgress)
//!     .unwrap();
//! println!("added {}, removed {}", summary.added, summary.removed);
//! ```
//!
//! ## Errors
//!
//! Every status outside an operation's accepted set is an error. A 404 is
//! [`Error::NotFound`] so callers can drop local state; partial collection
//! syncs report every failed member through [`SyncError`].

pub mod client;
pub mod collection;
pub mod error;
pub mod pager;
pub mod resource;
pub mod transport;
pub mod types;

pub use client::{API_VERSIONS, Client, DEFAULT_API_VERSION, validate_api_version};
pub use collection::{
    CollectionPlan, MemberAction, MemberFailure, NoProgress, SyncProgress, SyncSummary, plan,
};
pub use error::{Error, ErrorCategory, Result, SyncError};
pub use pager::fetch_all;
pub use resource::{Created, ManagedResource, Updated};
pub use transport::http::{DEFAULT_HOST, HttpTransport};
pub use transport::{Method, MockTransport, Request, Response, Transport};
pub use types::{ApplyResult, QueryParameters, RequestOptions, parse_query_pairs};
