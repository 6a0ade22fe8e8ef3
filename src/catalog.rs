// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Repository listing for the authenticated account.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::Error, pagination::walk_rest, transport::Transport};

/// First page of the authenticated user's repositories.
pub const USER_REPOS_PATH: &str = "/user/repos?per_page=100";

/// Repository metadata relevant to language aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Repository
{
    /// Numeric GitHub identifier.
    pub id:          u64,
    /// Repository name without the owner.
    pub name:        String,
    /// `owner/name` identifier used by the inclusion lists.
    pub full_name:   String,
    /// Whether the repository is private.
    pub private:     bool,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String,>,
    /// Whether the repository is a fork.
    pub fork:        bool,
}

impl std::fmt::Display for Repository
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.write_str(&self.full_name,)
    }
}

/// Fetches every repository visible to the transport's credential, following
/// `Link` pagination. Pages are concatenated in arrival order.
///
/// # Errors
///
/// Returns [`Error`] when a request fails at the transport level.
///
/// # Example
///
/// ```no_run
/// use ghcard::{Credential, GitHubClient, NetworkSettings, fetch_repositories};
///
/// # async fn example() -> Result<(), ghcard::Error> {
/// let credential = Credential::new("octocat", "ghp_token",);
/// let client = GitHubClient::new(&NetworkSettings::default(), &credential,)?;
/// for repository in fetch_repositories(&client,).await? {
///     println!("{repository}");
/// }
/// # Ok(())
/// # }
/// ```
pub async fn fetch_repositories<T,>(transport: &T,) -> Result<Vec<Repository,>, Error,>
where
    T: Transport,
{
    let repositories: Vec<Repository,> = walk_rest(transport, USER_REPOS_PATH,).await?;
    info!("Fetched {} repositories", repositories.len());
    Ok(repositories,)
}

/// Public-only repository listing without a credential.
///
/// # Errors
///
/// Always returns [`Error::Unsupported`].
pub fn fetch_public_repositories(_account: &str,) -> Result<Vec<Repository,>, Error,>
{
    Err(Error::Unsupported {
        operation: "public repository listing",
    },)
}
