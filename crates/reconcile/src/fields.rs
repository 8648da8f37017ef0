//! Reserved field names of the wire contract
//!
//! Server-injected metadata uses keys of the form `@namespace.name`
//! (`@odata.type`, `@odata.context`, `@odata.nextLink`). Collection pages put
//! their items under [`VALUE_KEY`] and point at the next page with
//! [`NEXT_LINK_KEY`].

use serde_json::Value;

/// Continuation link of a collection page.
pub const NEXT_LINK_KEY: &str = "@odata.nextLink";

/// Item array of a collection page.
pub const VALUE_KEY: &str = "value";

/// Check whether a key is a metadata field (`@namespace.name`).
///
/// Both the namespace and the name must be non-empty.
pub fn is_metadata_field(key: &str) -> bool {
    let Some(rest) = key.strip_prefix('@') else {
        return false;
    };
    match rest.split_once('.') {
        Some((namespace, name)) => !namespace.is_empty() && !name.is_empty(),
        None => false,
    }
}

/// Check whether a key is a type discriminator (`@namespace.type`).
///
/// Discriminators are force-included in a diff whenever a sibling changes,
/// so an update patch can name the polymorphic shape it targets.
pub fn is_type_discriminator_field(key: &str) -> bool {
    is_metadata_field(key) && key.rsplit_once('.').is_some_and(|(_, name)| name == "type")
}

/// Check whether a key belongs to the paging envelope.
pub fn is_paging_field(key: &str) -> bool {
    key == NEXT_LINK_KEY || key == VALUE_KEY
}

/// Get the continuation link of a page, if it has a non-empty one.
pub fn next_link(page: &Value) -> Option<&str> {
    page.get(NEXT_LINK_KEY)
        .and_then(Value::as_str)
        .filter(|link| !link.is_empty())
}
