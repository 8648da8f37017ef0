//! Membership synchronisation for reference collections.
//!
//! A reference collection (`groups/{id}/members/$ref`) holds links to other
//! directory objects. Syncing compares the member ids last known with the
//! ids wanted, then adds and removes references one at a time.
//!
//! # Example
//!
//! ```
//! use graphkit::collection::plan;
//!
//! let plan = plan(&["A", "B", "C"], &["B", "C", "D"]);
//! assert_eq!(plan.to_add, vec!["D"]);
//! assert_eq!(plan.to_remove, vec!["A"]);
//! ```

use crate::error::{Error, Result, SyncError};
use crate::transport::{Method, Request, Transport, exchange};
use crate::types::RequestOptions;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::fmt;

/// Suffix every reference collection URL ends with.
pub const REF_SUFFIX: &str = "/$ref";

/// Statuses accepted when adding a reference.
pub(crate) const ADD_STATUSES: &[u16] = &[200, 201, 202, 204];

/// Statuses accepted when removing a reference.
pub(crate) const REMOVE_STATUSES: &[u16] = &[200, 202, 204];

/// Operations needed to turn one membership set into another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionPlan {
    /// Members to add, in the order they appear in the new set.
    pub to_add: Vec<String>,
    /// Members to remove, in the order they appear in the old set.
    pub to_remove: Vec<String>,
}

impl CollectionPlan {
    /// Whether nothing needs to change.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Number of planned operations.
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }
}

/// Plan the adds and removes that turn `old` into `new`.
///
/// Members are compared as sets; a repeated id is planned once.
pub fn plan<S: AsRef<str>>(old: &[S], new: &[S]) -> CollectionPlan {
    let old_set: HashSet<&str> = old.iter().map(AsRef::<str>::as_ref).collect();
    let new_set: HashSet<&str> = new.iter().map(AsRef::<str>::as_ref).collect();

    CollectionPlan {
        to_add: missing_from(new, &old_set),
        to_remove: missing_from(old, &new_set),
    }
}

/// Members of `items` not in `other`, deduplicated, in input order.
fn missing_from<S: AsRef<str>>(items: &[S], other: &HashSet<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|item| !other.contains(*item) && seen.insert(*item))
        .map(str::to_string)
        .collect()
}

/// Kind of a collection operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberAction {
    Add,
    Remove,
}

impl fmt::Display for MemberAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberAction::Add => write!(f, "add"),
            MemberAction::Remove => write!(f, "remove"),
        }
    }
}

/// One collection operation that failed.
#[derive(Debug)]
pub struct MemberFailure {
    /// Member id the operation targeted.
    pub member: String,
    /// What was attempted.
    pub action: MemberAction,
    /// Why it failed.
    pub error: Error,
}

/// Counts of a fully applied plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub added: usize,
    pub removed: usize,
}

impl SyncSummary {
    /// Total operations applied.
    pub fn total(&self) -> usize {
        self.added + self.removed
    }
}

/// Progress callback for collection operations.
pub trait SyncProgress {
    /// Called once before the first operation.
    fn on_start(&mut self, total: usize);

    /// Called before each operation.
    fn on_member_start(&mut self, member: &str, action: MemberAction);

    /// Called after each operation, with the error if it failed.
    fn on_member_complete(&mut self, member: &str, action: MemberAction, error: Option<&Error>);

    /// Called once after the last operation.
    fn on_complete(&mut self);
}

/// No-op progress callback
pub struct NoProgress;

impl SyncProgress for NoProgress {
    fn on_start(&mut self, _total: usize) {}
    fn on_member_start(&mut self, _member: &str, _action: MemberAction) {}
    fn on_member_complete(&mut self, _member: &str, _action: MemberAction, _error: Option<&Error>) {}
    fn on_complete(&mut self) {}
}

/// Check that a URL addresses a reference collection.
pub fn validate_collection_url(url: &str) -> Result<()> {
    match url.strip_suffix(REF_SUFFIX) {
        Some(base) if !base.trim_matches('/').is_empty() => Ok(()),
        Some(_) => Err(Error::InvalidUrl(format!(
            "{url}: missing collection path before {REF_SUFFIX}"
        ))),
        None => Err(Error::InvalidUrl(format!(
            "{url}: reference collection URL must end with {REF_SUFFIX}"
        ))),
    }
}

/// Collection URL without the trailing `/$ref`.
///
/// This identifies the collection and is where its members are listed.
pub fn base_collection_url(url: &str) -> &str {
    url.strip_suffix(REF_SUFFIX).unwrap_or(url)
}

/// Body of an add-reference call.
pub fn reference_body(host: &str, api_version: &str, member: &str) -> Value {
    json!({
        "@odata.id": format!(
            "{}/{api_version}/directoryObjects/{member}",
            host.trim_end_matches('/')
        )
    })
}

#[derive(Deserialize)]
struct ReferencePage {
    #[serde(default)]
    value: Vec<ReferenceItem>,
}

#[derive(Deserialize)]
struct ReferenceItem {
    #[serde(default)]
    id: String,
}

/// Member ids of a listed collection (`value[*].id`).
///
/// Items without an id yield an empty string. A body without `value` has
/// no members.
pub fn flatten_reference_ids(body: &Value) -> Result<Vec<String>> {
    if body.is_null() {
        return Ok(Vec::new());
    }
    let page = ReferencePage::deserialize(body)
        .map_err(|e| Error::InvalidResponse(format!("reference collection: {e}")))?;
    Ok(page.value.into_iter().map(|item| item.id).collect())
}

/// Apply a plan to the reference collection at `url` (ending in `/$ref`).
///
/// Adds run first, then removes, each in plan order. Every operation is
/// attempted; failures are gathered into [`Error::Sync`].
pub fn apply_plan(
    transport: &dyn Transport,
    url: &str,
    api_version: &str,
    plan: &CollectionPlan,
    options: &RequestOptions,
    progress: &mut dyn SyncProgress,
) -> Result<SyncSummary> {
    validate_collection_url(url)?;
    let base = base_collection_url(url);
    let options = options.for_write();

    let mut summary = SyncSummary::default();
    let mut failures = Vec::new();
    progress.on_start(plan.len());

    let operations = plan
        .to_add
        .iter()
        .map(|member| (member, MemberAction::Add))
        .chain(plan.to_remove.iter().map(|member| (member, MemberAction::Remove)));

    for (member, action) in operations {
        progress.on_member_start(member, action);

        let result = match action {
            MemberAction::Add => {
                let request = Request::new(Method::Post, url, api_version)
                    .with_headers(options.headers.clone())
                    .with_body(reference_body(transport.base_url(), api_version, member));
                exchange(transport, request, &options, ADD_STATUSES)
            }
            MemberAction::Remove => {
                let request = Request::new(Method::Delete, format!("{base}/{member}{REF_SUFFIX}"), api_version)
                    .with_headers(options.headers.clone());
                exchange(transport, request, &options, REMOVE_STATUSES)
            }
        };

        match result {
            Ok(_) => {
                info!("{base}: {action} {member}");
                progress.on_member_complete(member, action, None);
                match action {
                    MemberAction::Add => summary.added += 1,
                    MemberAction::Remove => summary.removed += 1,
                }
            }
            Err(error) => {
                warn!("{base}: failed to {action} {member}: {error}");
                progress.on_member_complete(member, action, Some(&error));
                failures.push(MemberFailure {
                    member: member.clone(),
                    action,
                    error,
                });
            }
        }
    }

    progress.on_complete();

    if failures.is_empty() {
        Ok(summary)
    } else {
        Err(SyncError {
            failures,
            added: summary.added,
            removed: summary.removed,
        }
        .into())
    }
}
