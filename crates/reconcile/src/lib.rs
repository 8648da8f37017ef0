//! # Reconcile
//!
//! Schema-less reconciliation of JSON resources owned by a remote API.
//!
//! The crate compares three views of the same object without knowing its
//! shape in advance: what was last observed remotely, what the caller
//! declares, and what the server returns now.
//!
//! ## Core Operations
//!
//! - [`normalize`]: canonical text form for order-insensitive comparison
//! - [`merge`]: keep everything, let the new value override matching paths
//! - [`update`]: merge driven by [`UpdateOptions`] (drop stale keys, ignore casing)
//! - [`diff`]: the minimal additive patch between two values
//!
//! All four are pure functions over [`serde_json::Value`]. They never mutate
//! their inputs and may be called from any thread.
//!
//! ## Example
//!
//! ```
//! use reconcile::{diff, merge, UpdateOptions};
//! use serde_json::json;
//!
//! let old = json!({"a": 1, "b": 2, "c": {"d": 4}});
//! let new = json!({"b": 3, "c": {"e": 5}, "f": 6});
//!
//! assert_eq!(
//!     merge(&old, &new),
//!     json!({"a": 1, "b": 3, "c": {"d": 4, "e": 5}, "f": 6})
//! );
//! assert_eq!(
//!     diff(&old, &new, &UpdateOptions::default()),
//!     Some(json!({"b": 3, "c": {"e": 5}, "f": 6}))
//! );
//! ```
//!
//! ## Reserved Fields
//!
//! Keys shaped like `@namespace.name` are metadata injected by the server.
//! Discriminators (`@namespace.type`) are force-included in a diff whenever a
//! sibling changes; see [`fields`] for the predicates.

pub mod diff;
pub mod error;
pub mod fields;
pub mod merge;
pub mod normalize;
pub mod update;
pub mod value;

pub use diff::{changed_paths, diff};
pub use error::{Error, Result};
pub use fields::{
    NEXT_LINK_KEY, VALUE_KEY, is_metadata_field, is_paging_field, is_type_discriminator_field,
    next_link,
};
pub use merge::merge;
pub use normalize::{normalize, normalize_strict};
pub use update::{UpdateOptions, update};
pub use value::{is_empty, scalars_equal};

/// Re-exported so callers do not need a direct `serde_json` dependency.
pub use serde_json::Value;
