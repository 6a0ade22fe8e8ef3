// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Repositories the viewer contributed to.
///
/// Walks `viewer.repositoriesContributedTo` through the GraphQL cursor walker.
/// Commits, pull requests and repository creation count as contributions;
/// issue-only contributions are left out.
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{
    error::Error,
    pagination::{Connection, PageInfo, walk_graphql},
    transport::Transport,
};

/// Number of nodes requested per page.
pub const CONTRIBUTIONS_PAGE_SIZE: u32 = 100;

/// Contribution types counted by the query.
const CONTRIBUTION_TYPES: &str = "[COMMIT, PULL_REQUEST, REPOSITORY]";

#[derive(Debug, Deserialize,)]
struct ViewerData
{
    viewer: Viewer,
}

#[derive(Debug, Deserialize,)]
#[serde(rename_all = "camelCase")]
struct Viewer
{
    repositories_contributed_to: ContributedConnection,
}

#[derive(Debug, Deserialize,)]
#[serde(rename_all = "camelCase")]
struct ContributedConnection
{
    nodes:     Vec<Option<ContributedNode,>,>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize,)]
#[serde(rename_all = "camelCase")]
struct ContributedNode
{
    name_with_owner: String,
}

impl Connection for ViewerData
{
    type Node = String;

    fn into_page(self,) -> (Vec<String,>, PageInfo,)
    {
        let connection = self.viewer.repositories_contributed_to;
        let names = connection
            .nodes
            .into_iter()
            .filter_map(|node| match node {
                Some(node,) => Some(node.name_with_owner,),
                None => {
                    warn!("skipping inaccessible contributed repository");
                    None
                }
            },)
            .collect();
        (names, connection.page_info,)
    }
}

/// Builds the contributions query, adding `after` when a cursor is given.
///
/// # Examples
///
/// ```
/// use ghcard::contributions_query;
///
/// let first = contributions_query(None,);
/// assert!(!first["query"].as_str().unwrap().contains("after:"));
///
/// let next = contributions_query(Some("abc",),);
/// assert!(next["query"].as_str().unwrap().contains("after: \"abc\""));
/// ```
pub fn contributions_query(after: Option<&str,>,) -> Value
{
    let after = after
        .map(|cursor| format!(" after: {}", Value::String(cursor.to_owned(),)),)
        .unwrap_or_default();

    json!({
        "query": format!(
            "{{ viewer {{ repositoriesContributedTo(first: {CONTRIBUTIONS_PAGE_SIZE}{after} \
             contributionTypes: {CONTRIBUTION_TYPES}) {{ totalCount nodes {{ nameWithOwner }} \
             pageInfo {{ endCursor hasNextPage }} }} }} }}"
        )
    })
}

/// Fetches the `owner/name` of every repository the viewer contributed to.
///
/// Names are returned page by page in the order the API yields them. The API
/// does not sort by contribution date.
///
/// # Errors
///
/// Returns transport errors. Malformed pages end the traversal early instead.
pub async fn fetch_contributed_repositories<T,>(transport: &T,) -> Result<Vec<String,>, Error,>
where
    T: Transport,
{
    let repositories = walk_graphql::<_, ViewerData, _,>(transport, contributions_query,).await?;
    info!("Found {} contributed repositories", repositories.len());
    Ok(repositories,)
}
