//! Collection paging over continuation links.
//!
//! A collection endpoint answers with a page object holding its items under
//! `value` and, when more items exist, an absolute `@odata.nextLink`. The
//! pager follows those links in order and stitches the items together.

use crate::error::{Error, Result};
use crate::transport::{Method, Request, Transport, exchange};
use crate::types::RequestOptions;
use log::debug;
use reconcile::{VALUE_KEY, is_paging_field, next_link};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A page that follows the paging convention.
struct Page {
    items: Vec<Value>,
    next_link: Option<String>,
    /// Every field outside the paging envelope.
    extra: Map<String, Value>,
}

/// Split a page body into its parts.
///
/// Bodies that are not an object with a `value` array are handed back
/// unchanged as `Err`.
fn split_page(body: Value) -> std::result::Result<Page, Value> {
    let link = next_link(&body).map(str::to_string);
    match body {
        Value::Object(mut map) if map.get(VALUE_KEY).is_some_and(Value::is_array) => {
            let items = match map.remove(VALUE_KEY) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            map.retain(|key, _| !is_paging_field(key));
            Ok(Page {
                items,
                next_link: link,
                extra: map,
            })
        }
        other => Err(other),
    }
}

/// Fetch every page of a collection.
///
/// The first request carries the query parameters and headers of
/// `options`. Continuation links are requested verbatim with neither.
///
/// Returns an object with all items under `value` plus the non-paging
/// fields of the last page. When any page does not follow the paging
/// convention, that page's body is returned as-is instead. Any failure
/// aborts the whole fetch; items gathered so far are discarded. A
/// continuation link seen twice is an [`Error::InvalidResponse`].
///
/// # Example
///
/// ```
/// use graphkit::{fetch_all, MockTransport, Method, RequestOptions};
/// use serde_json::json;
///
/// let mock = MockTransport::new();
/// mock.respond(Method::Get, "users", 200, Some(json!({
///     "value": [{"id": "1"}],
///     "@odata.nextLink": "https://graph.microsoft.com/v1.0/users?$skiptoken=2"
/// })));
/// mock.respond(
///     Method::Get,
///     "https://graph.microsoft.com/v1.0/users?$skiptoken=2",
///     200,
///     Some(json!({"value": [{"id": "2"}]})),
/// );
///
/// let all = fetch_all(&mock, "users", "v1.0", &RequestOptions::new()).unwrap();
/// assert_eq!(all, json!({"value": [{"id": "1"}, {"id": "2"}]}));
/// ```
pub fn fetch_all(
    transport: &dyn Transport,
    url: &str,
    api_version: &str,
    options: &RequestOptions,
) -> Result<Value> {
    let first = Request::new(Method::Get, url, api_version)
        .with_query(options.query.clone())
        .with_headers(options.headers.clone());

    let mut items = Vec::new();
    let mut extra = Map::new();
    let mut request = first;
    let mut pages = 0usize;
    let mut visited = HashSet::new();

    loop {
        let response = exchange(transport, request, options, &[200])?;
        pages += 1;

        let page = match split_page(response.body.unwrap_or(Value::Null)) {
            Ok(page) => page,
            Err(body) => {
                debug!("{url}: page {pages} is not a collection page, returning it as-is");
                return Ok(body);
            }
        };

        debug!("{url}: page {pages} has {} item(s)", page.items.len());
        items.extend(page.items);
        extra = page.extra;

        match page.next_link {
            Some(link) if !visited.insert(link.clone()) => {
                return Err(Error::InvalidResponse(format!(
                    "{url}: continuation link repeats after {pages} page(s): {link}"
                )));
            }
            Some(link) => request = Request::new(Method::Get, link, api_version),
            None => break,
        }
    }

    debug!("{url}: {} item(s) across {pages} page(s)", items.len());
    extra.insert(VALUE_KEY.to_string(), Value::Array(items));
    Ok(Value::Object(extra))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, Response};
    use serde_json::json;
    use std::thread;
    use std::time::{Duration, Instant};

    const PAGE_2: &str = "https://graph.microsoft.com/v1.0/groups/g/members?$skiptoken=2";
    const PAGE_3: &str = "https://graph.microsoft.com/v1.0/groups/g/members?$skiptoken=3";

    fn three_pages() -> MockTransport {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            "groups/g/members",
            200,
            Some(json!({
                "@odata.context": "ctx",
                "@odata.count": 5,
                "value": [{"id": "a"}, {"id": "b"}],
                "@odata.nextLink": PAGE_2
            })),
        );
        mock.respond(
            Method::Get,
            PAGE_2,
            200,
            Some(json!({
                "@odata.context": "ctx",
                "value": [{"id": "c"}, {"id": "d"}],
                "@odata.nextLink": PAGE_3
            })),
        );
        mock.respond(
            Method::Get,
            PAGE_3,
            200,
            Some(json!({
                "@odata.context": "ctx-last",
                "value": [{"id": "e"}]
            })),
        );
        mock
    }

    #[test]
    fn test_fetch_all_follows_links() {
        let mock = three_pages();
        let all = fetch_all(&mock, "groups/g/members", "v1.0", &RequestOptions::new()).unwrap();

        assert_eq!(
            all,
            json!({
                "@odata.context": "ctx-last",
                "value": [{"id": "a"}, {"id": "b"}, {"id": "c"}, {"id": "d"}, {"id": "e"}]
            })
        );
        assert_eq!(mock.requests().len(), 3);
    }

    #[test]
    fn test_continuation_requests_carry_no_query_or_headers() {
        let mock = three_pages();
        let options = RequestOptions::new()
            .query("$select", "id")
            .header("ConsistencyLevel", "eventual");
        fetch_all(&mock, "groups/g/members", "v1.0", &options).unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].query["$select"], vec!["id"]);
        assert_eq!(requests[0].headers["ConsistencyLevel"], "eventual");
        for continuation in &requests[1..] {
            assert!(continuation.query.is_empty());
            assert!(continuation.headers.is_empty());
            assert!(continuation.is_absolute());
        }
    }

    #[test]
    fn test_single_page() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "users", 200, Some(json!({"value": [{"id": "1"}]})));
        let all = fetch_all(&mock, "users", "v1.0", &RequestOptions::new()).unwrap();
        assert_eq!(all, json!({"value": [{"id": "1"}]}));
    }

    #[test]
    fn test_empty_next_link_stops() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            "users",
            200,
            Some(json!({"value": [], "@odata.nextLink": ""})),
        );
        let all = fetch_all(&mock, "users", "v1.0", &RequestOptions::new()).unwrap();
        assert_eq!(all, json!({"value": []}));
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_non_collection_body_passes_through() {
        let mock = MockTransport::new();
        let single = json!({"id": "org", "displayName": "Contoso"});
        mock.respond(Method::Get, "organization/org", 200, Some(single.clone()));
        let got = fetch_all(&mock, "organization/org", "v1.0", &RequestOptions::new()).unwrap();
        assert_eq!(got, single);
    }

    #[test]
    fn test_value_not_array_passes_through() {
        let mock = MockTransport::new();
        let body = json!({"value": "scalar"});
        mock.respond(Method::Get, "settings", 200, Some(body.clone()));
        let got = fetch_all(&mock, "settings", "v1.0", &RequestOptions::new()).unwrap();
        assert_eq!(got, body);
    }

    #[test]
    fn test_non_conforming_later_page_passes_through() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            "users",
            200,
            Some(json!({"value": [{"id": "1"}], "@odata.nextLink": PAGE_2})),
        );
        mock.respond(Method::Get, PAGE_2, 200, Some(json!({"unexpected": true})));
        let got = fetch_all(&mock, "users", "v1.0", &RequestOptions::new()).unwrap();
        assert_eq!(got, json!({"unexpected": true}));
    }

    #[test]
    fn test_empty_body_passes_through_as_null() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "users/delta", 200, None);
        let got = fetch_all(&mock, "users/delta", "v1.0", &RequestOptions::new()).unwrap();
        assert_eq!(got, Value::Null);
    }

    #[test]
    fn test_error_mid_way_discards_items() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            "users",
            200,
            Some(json!({"value": [{"id": "1"}], "@odata.nextLink": PAGE_2})),
        );
        mock.respond(
            Method::Get,
            PAGE_2,
            503,
            Some(json!({"error": {"message": "Service unavailable"}})),
        );
        let err = fetch_all(&mock, "users", "v1.0", &RequestOptions::new()).unwrap_err();
        match err {
            Error::RequestFailed { status, url, .. } => {
                assert_eq!(status, 503);
                assert_eq!(url, PAGE_2);
            }
            other => panic!("Expected RequestFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_first_page_not_found() {
        let mock = MockTransport::new();
        let err = fetch_all(&mock, "groups/missing/members", "v1.0", &RequestOptions::new())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_non_200_success_rejected() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "users", 202, None);
        let err = fetch_all(&mock, "users", "v1.0", &RequestOptions::new()).unwrap_err();
        assert!(matches!(err, Error::RequestFailed { status: 202, .. }));
    }

    #[test]
    fn test_expired_deadline_sends_nothing() {
        let mock = three_pages();
        let options = RequestOptions::new().deadline(Instant::now());
        let err = fetch_all(&mock, "groups/g/members", "v1.0", &options).unwrap_err();
        assert!(matches!(err, Error::DeadlineExceeded { .. }));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_deadline_bounds_every_page() {
        let mock = three_pages();
        let options = RequestOptions::new().timeout(Duration::from_secs(600));
        fetch_all(&mock, "groups/g/members", "v1.0", &options).unwrap();
        assert!(mock.requests().iter().all(|r| r.timeout.is_some()));
    }

    /// Serves scripted replies, taking `delay` to answer each one.
    struct SlowTransport {
        inner: MockTransport,
        delay: Duration,
    }

    impl Transport for SlowTransport {
        fn send(&self, request: &Request) -> Result<Response> {
            thread::sleep(self.delay);
            self.inner.send(request)
        }

        fn base_url(&self) -> &str {
            self.inner.base_url()
        }
    }

    #[test]
    fn test_deadline_expiring_between_pages_stops_paging() {
        let slow = SlowTransport {
            inner: three_pages(),
            delay: Duration::from_millis(100),
        };
        let options = RequestOptions::new().deadline(Instant::now() + Duration::from_millis(50));

        let err = fetch_all(&slow, "groups/g/members", "v1.0", &options).unwrap_err();
        match err {
            Error::DeadlineExceeded { url } => assert_eq!(url, PAGE_2),
            other => panic!("Expected DeadlineExceeded, got {other:?}"),
        }
        assert_eq!(slow.inner.requests().len(), 1);
    }

    #[test]
    fn test_repeated_next_link_stops() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            "users",
            200,
            Some(json!({"value": [{"id": "1"}], "@odata.nextLink": PAGE_2})),
        );
        mock.respond(
            Method::Get,
            PAGE_2,
            200,
            Some(json!({"value": [{"id": "2"}], "@odata.nextLink": PAGE_2})),
        );

        let err = fetch_all(&mock, "users", "v1.0", &RequestOptions::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
        assert_eq!(mock.requests().len(), 2);
    }
}
