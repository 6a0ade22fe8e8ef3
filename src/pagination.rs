// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Page walkers for REST `Link`-header pagination and GraphQL cursor
//! pagination.
//!
//! Both walkers flatten every page into a single `Vec` in arrival order. A
//! page that cannot be decoded or is answered with an HTTP error status ends
//! the traversal: the records collected so far are returned and the failure
//! is logged. Other transport errors are propagated unchanged and abort the
//! walk.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{error::Error, transport::Transport};

static NEXT_LINK: LazyLock<Regex,> = LazyLock::new(|| {
    Regex::new(r#"<([^>]+)>\s*;\s*rel\s*=\s*"next""#,).expect("valid link pattern",)
},);

/// Extracts the URL tagged `rel="next"` from a `Link` header value.
///
/// Entries may appear in any order. Returns `None` when the header carries no
/// `next` relation, which marks the last page.
///
/// # Examples
///
/// ```
/// use ghcard::parse_next_link;
///
/// let header = r#"<https://api/x?page=2>; rel="next", <https://api/x?page=1>; rel="prev""#;
/// assert_eq!(parse_next_link(header,).as_deref(), Some("https://api/x?page=2"));
/// assert_eq!(parse_next_link("",), None);
/// ```
pub fn parse_next_link(header: &str,) -> Option<String,>
{
    NEXT_LINK.captures(header,).map(|captures| captures[1].to_owned(),)
}

/// Walks a REST collection starting at `first_url`, following `rel="next"`
/// links until none remain.
///
/// # Errors
///
/// Returns transport errors reported by `transport`. Undecodable pages and
/// HTTP error statuses are not errors: they terminate the walk with the
/// records gathered so far.
pub async fn walk_rest<T, R,>(transport: &T, first_url: &str,) -> Result<Vec<R,>, Error,>
where
    T: Transport,
    R: DeserializeOwned,
{
    let mut records = Vec::new();
    let mut next = Some(first_url.to_owned(),);
    let mut pages = 0usize;

    while let Some(url,) = next.take() {
        let page = match transport.get(&url,).await {
            Ok(page,) => page,
            Err(Error::HttpStatus {
                status, ..
            },) => {
                warn!("stopping pagination of {} at {}: HTTP status {}", first_url, url, status);
                break;
            }
            Err(error,) => return Err(error,),
        };
        pages += 1;

        match serde_json::from_str::<Vec<R,>,>(&page.body,) {
            Ok(batch,) => {
                debug!("page {} of {} yielded {} records", pages, first_url, batch.len());
                records.extend(batch,);
            }
            Err(error,) => {
                warn!("stopping pagination of {} at {}: undecodable page: {}", first_url, url, error);
                break;
            }
        }

        next = page.link.as_deref().and_then(parse_next_link,);
    }

    Ok(records,)
}

/// Continuation state reported by a GraphQL connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize,)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo
{
    /// Opaque cursor of the last node on the page.
    #[serde(default)]
    pub end_cursor:    Option<String,>,
    /// Whether another page follows.
    pub has_next_page: bool,
}

impl PageInfo
{
    /// Cursor for the next request, or `None` when traversal is finished.
    pub fn next_cursor(&self,) -> Option<&str,>
    {
        if self.has_next_page { self.end_cursor.as_deref() } else { None }
    }
}

/// Envelope shared by every GraphQL response.
#[derive(Debug, Deserialize,)]
pub struct GraphqlResponse<D,>
{
    /// Query result; absent when the query failed as a whole.
    pub data:   Option<D,>,
    /// Errors reported by the server.
    #[serde(default)]
    pub errors: Vec<GraphqlError,>,
}

/// Single error entry of a GraphQL response.
#[derive(Debug, Deserialize,)]
pub struct GraphqlError
{
    /// Human readable description.
    pub message: String,
}

/// Typed `data` payload that exposes one paginated connection.
pub trait Connection
{
    /// Record type of the connection's `nodes`.
    type Node;

    /// Splits the payload into the page's nodes and its continuation.
    fn into_page(self,) -> (Vec<Self::Node,>, PageInfo,);
}

/// Walks a GraphQL connection by re-issuing the query with `after: <cursor>`
/// while `pageInfo.hasNextPage` is true.
///
/// `build_query` receives `None` for the first request and the previous end
/// cursor afterwards, and returns the JSON request payload.
///
/// # Errors
///
/// Returns transport errors reported by `transport`. Responses that do not
/// match `D` and HTTP error statuses terminate the walk with the nodes
/// gathered so far.
pub async fn walk_graphql<T, D, F,>(
    transport: &T,
    mut build_query: F,
) -> Result<Vec<D::Node,>, Error,>
where
    T: Transport,
    D: DeserializeOwned + Connection,
    F: FnMut(Option<&str,>,) -> Value,
{
    let mut nodes = Vec::new();
    let mut cursor: Option<String,> = None;
    let mut pages = 0usize;

    loop {
        let payload = build_query(cursor.as_deref(),);
        let raw = match transport.graphql(&payload,).await {
            Ok(raw,) => raw,
            Err(Error::HttpStatus {
                status, ..
            },) => {
                warn!("stopping GraphQL pagination after {} pages: HTTP status {}", pages, status);
                break;
            }
            Err(error,) => return Err(error,),
        };
        pages += 1;

        let response = match serde_json::from_value::<GraphqlResponse<D,>,>(raw,) {
            Ok(response,) => response,
            Err(error,) => {
                warn!("stopping GraphQL pagination after {} pages: {}", pages - 1, error);
                break;
            }
        };

        for error in &response.errors {
            warn!("GraphQL error: {}", error.message);
        }

        let Some(data,) = response.data else {
            warn!("stopping GraphQL pagination: page {} carried no data", pages);
            break;
        };

        let (batch, page_info,) = data.into_page();
        debug!("GraphQL page {} yielded {} nodes", pages, batch.len());
        nodes.extend(batch,);

        match page_info.next_cursor() {
            Some(next,) => cursor = Some(next.to_owned(),),
            None => break,
        }
    }

    Ok(nodes,)
}

#[cfg(test)]
mod tests
{
    use serde::Deserialize;
    use serde_json::{Value, json};

    use super::{Connection, PageInfo, parse_next_link, walk_graphql, walk_rest};
    use crate::{error::Error, transport::testing::StubTransport};

    #[derive(Debug, Deserialize, PartialEq,)]
    struct Item
    {
        id: u32,
    }

    #[derive(Debug, Deserialize,)]
    #[serde(rename_all = "camelCase")]
    struct Items
    {
        items: ItemConnection,
    }

    #[derive(Debug, Deserialize,)]
    #[serde(rename_all = "camelCase")]
    struct ItemConnection
    {
        nodes:     Vec<Item,>,
        page_info: PageInfo,
    }

    impl Connection for Items
    {
        type Node = Item;

        fn into_page(self,) -> (Vec<Item,>, PageInfo,)
        {
            (self.items.nodes, self.items.page_info,)
        }
    }

    fn query(after: Option<&str,>,) -> Value
    {
        let after = after.map(|cursor| format!(" after: \"{cursor}\""),).unwrap_or_default();
        json!({ "query": format!("{{ items(first: 2{after}) {{ nodes {{ id }} }} }}") })
    }

    #[test]
    fn next_link_is_found_among_other_relations()
    {
        let header = r#"<https://api/x?page=2>; rel="next", <https://api/x?page=1>; rel="prev""#;
        assert_eq!(parse_next_link(header).as_deref(), Some("https://api/x?page=2"));
    }

    #[test]
    fn next_link_may_be_the_last_entry()
    {
        let header = r#"<https://api/x?page=1>; rel="prev", <https://api/x?page=3>; rel="next""#;
        assert_eq!(parse_next_link(header).as_deref(), Some("https://api/x?page=3"));
    }

    #[test]
    fn header_without_next_ends_pagination()
    {
        assert_eq!(parse_next_link(r#"<https://api/x?page=1>; rel="first""#), None);
        assert_eq!(parse_next_link(""), None);
    }

    #[tokio::test]
    async fn rest_walk_follows_next_links_in_order()
    {
        let transport = StubTransport::new()
            .with_page("/items", r#"[{"id":1},{"id":2}]"#, Some(r#"<https://api/items?page=2>; rel="next""#,),)
            .with_page(
                "https://api/items?page=2",
                r#"[{"id":3}]"#,
                Some(r#"<https://api/items?page=1>; rel="prev""#,),
            );

        let items: Vec<Item,> = walk_rest(&transport, "/items",).await.expect("walk succeeds",);

        assert_eq!(items, vec![Item { id: 1 }, Item { id: 2 }, Item { id: 3 }]);
        assert_eq!(transport.get_log(), vec!["/items", "https://api/items?page=2"]);
    }

    #[tokio::test]
    async fn rest_walk_without_link_header_is_single_page()
    {
        let transport = StubTransport::new().with_page("/items", r#"[{"id":1}]"#, None,);

        let items: Vec<Item,> = walk_rest(&transport, "/items",).await.expect("walk succeeds",);

        assert_eq!(items.len(), 1);
        assert_eq!(transport.get_log().len(), 1);
    }

    #[tokio::test]
    async fn rest_walk_stops_at_malformed_page_and_keeps_prior_records()
    {
        let transport = StubTransport::new()
            .with_page("/items", r#"[{"id":1}]"#, Some(r#"<https://api/items?page=2>; rel="next""#,),)
            .with_page(
                "https://api/items?page=2",
                r#"{"message":"Bad credentials"}"#,
                Some(r#"<https://api/items?page=3>; rel="next""#,),
            );

        let items: Vec<Item,> = walk_rest(&transport, "/items",).await.expect("walk succeeds",);

        assert_eq!(items, vec![Item { id: 1 }]);
        assert_eq!(transport.get_log().len(), 2);
    }

    #[tokio::test]
    async fn rest_walk_propagates_transport_errors()
    {
        let transport = StubTransport::new()
            .with_page("/items", "[]", Some(r#"<https://api/missing>; rel="next""#,),);

        let result: Result<Vec<Item,>, Error,> = walk_rest(&transport, "/items",).await;

        assert!(matches!(result, Err(Error::Transport { .. })));
    }

    #[tokio::test]
    async fn rest_walk_stops_at_error_status_and_keeps_prior_records()
    {
        let transport = StubTransport::new()
            .with_page("/items", r#"[{"id":1},{"id":2}]"#, Some(r#"<https://api/items?page=2>; rel="next""#,),)
            .with_status("https://api/items?page=2", 401,);

        let items: Vec<Item,> = walk_rest(&transport, "/items",).await.expect("walk succeeds",);

        assert_eq!(items, vec![Item { id: 1 }, Item { id: 2 }]);
        assert_eq!(transport.get_log(), vec!["/items", "https://api/items?page=2"]);
    }

    #[tokio::test]
    async fn graphql_walk_issues_one_follow_up_with_cursor()
    {
        let transport = StubTransport::new()
            .with_graphql(json!({
                "data": { "items": {
                    "nodes": [{ "id": 1 }],
                    "pageInfo": { "endCursor": "abc", "hasNextPage": true }
                } }
            }),)
            .with_graphql(json!({
                "data": { "items": {
                    "nodes": [{ "id": 2 }],
                    "pageInfo": { "endCursor": "def", "hasNextPage": false }
                } }
            }),);

        let items = walk_graphql::<_, Items, _,>(&transport, query,).await.expect("walk succeeds",);

        assert_eq!(items, vec![Item { id: 1 }, Item { id: 2 }]);
        let posts = transport.post_log();
        assert_eq!(posts.len(), 2);
        assert!(!posts[0]["query"].as_str().unwrap().contains("after:"));
        assert!(posts[1]["query"].as_str().unwrap().contains("after: \"abc\""));
    }

    #[tokio::test]
    async fn graphql_walk_without_next_page_issues_no_follow_up()
    {
        let transport = StubTransport::new().with_graphql(json!({
            "data": { "items": {
                "nodes": [{ "id": 1 }, { "id": 2 }],
                "pageInfo": { "endCursor": "abc", "hasNextPage": false }
            } }
        }),);

        let items = walk_graphql::<_, Items, _,>(&transport, query,).await.expect("walk succeeds",);

        assert_eq!(items.len(), 2);
        assert_eq!(transport.post_log().len(), 1);
    }

    #[tokio::test]
    async fn graphql_walk_stops_on_missing_fields()
    {
        let transport = StubTransport::new()
            .with_graphql(json!({
                "data": { "items": {
                    "nodes": [{ "id": 1 }],
                    "pageInfo": { "endCursor": "abc", "hasNextPage": true }
                } }
            }),)
            .with_graphql(json!({ "data": { "items": { "nodes": [{ "id": 2 }] } } }),);

        let items = walk_graphql::<_, Items, _,>(&transport, query,).await.expect("walk succeeds",);

        assert_eq!(items, vec![Item { id: 1 }]);
        assert_eq!(transport.post_log().len(), 2);
    }

    #[tokio::test]
    async fn graphql_walk_stops_at_error_status_and_keeps_prior_nodes()
    {
        let transport = StubTransport::new()
            .with_graphql(json!({
                "data": { "items": {
                    "nodes": [{ "id": 1 }],
                    "pageInfo": { "endCursor": "abc", "hasNextPage": true }
                } }
            }),)
            .with_graphql_status(401,);

        let items = walk_graphql::<_, Items, _,>(&transport, query,).await.expect("walk succeeds",);

        assert_eq!(items, vec![Item { id: 1 }]);
        assert_eq!(transport.post_log().len(), 2);
    }

    #[tokio::test]
    async fn graphql_walk_stops_when_data_is_null()
    {
        let transport = StubTransport::new().with_graphql(json!({
            "data": null,
            "errors": [{ "message": "Bad credentials" }]
        }),);

        let items = walk_graphql::<_, Items, _,>(&transport, query,).await.expect("walk succeeds",);

        assert!(items.is_empty());
    }

    #[test]
    fn page_info_without_next_page_has_no_cursor()
    {
        let info = PageInfo {
            end_cursor:    Some("abc".to_owned(),),
            has_next_page: false,
        };
        assert_eq!(info.next_cursor(), None);
    }
}
