// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Per-repository language statistics and their account-wide aggregation.

use std::collections::{BTreeMap, BTreeSet, btree_map};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    catalog::{Repository, fetch_repositories},
    config::InclusionPolicy,
    error::Error,
    transport::Transport,
};

/// Language name to byte count mapping.
///
/// Keys are the case-sensitive names reported by GitHub. The map is ordered so
/// iteration, and everything derived from it, is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(transparent)]
pub struct LanguageHistogram(BTreeMap<String, u64,>,);

impl LanguageHistogram
{
    /// Creates an empty histogram.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Adds `bytes` to `language`, saturating on overflow.
    pub fn add(&mut self, language: impl Into<String,>, bytes: u64,)
    {
        let entry = self.0.entry(language.into(),).or_insert(0,);
        *entry = entry.saturating_add(bytes,);
    }

    /// Folds `other` into `self` by summing per-language counts.
    pub fn merge(&mut self, other: &LanguageHistogram,)
    {
        for (language, bytes,) in &other.0 {
            self.add(language.clone(), *bytes,);
        }
    }

    /// Returns the merge of two histograms without modifying either.
    pub fn merged(&self, other: &LanguageHistogram,) -> LanguageHistogram
    {
        let mut result = self.clone();
        result.merge(other,);
        result
    }

    /// Drops the listed languages.
    pub fn remove_languages<S: AsRef<str,>,>(&mut self, languages: &[S],)
    {
        for language in languages {
            self.0.remove(language.as_ref(),);
        }
    }

    /// Byte count recorded for `language`.
    pub fn get(&self, language: &str,) -> Option<u64,>
    {
        self.0.get(language,).copied()
    }

    /// Sum of all byte counts.
    pub fn total(&self,) -> u64
    {
        self.0.values().fold(0u64, |acc, bytes| acc.saturating_add(*bytes,),)
    }

    /// Number of distinct languages.
    pub fn len(&self,) -> usize
    {
        self.0.len()
    }

    /// Whether no language has been recorded.
    pub fn is_empty(&self,) -> bool
    {
        self.0.is_empty()
    }

    /// Iterates languages in name order.
    pub fn iter(&self,) -> btree_map::Iter<'_, String, u64,>
    {
        self.0.iter()
    }
}

impl<S: Into<String,>,> FromIterator<(S, u64,),> for LanguageHistogram
{
    fn from_iter<I: IntoIterator<Item = (S, u64,),>,>(iter: I,) -> Self
    {
        let mut histogram = Self::new();
        for (language, bytes,) in iter {
            histogram.add(language, bytes,);
        }
        histogram
    }
}

impl<'a,> IntoIterator for &'a LanguageHistogram
{
    type IntoIter = btree_map::Iter<'a, String, u64,>;
    type Item = (&'a String, &'a u64,);

    fn into_iter(self,) -> Self::IntoIter
    {
        self.0.iter()
    }
}

impl InclusionPolicy
{
    /// Decides whether `repository` contributes to the histogram.
    ///
    /// The fork axis and the private axis are evaluated independently and
    /// both must pass. Non-forks always pass the fork axis and public
    /// repositories always pass the private axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use ghcard::{InclusionPolicy, Repository};
    ///
    /// let mut policy = InclusionPolicy::default();
    /// policy.forks_allowlist.insert("a/b".to_owned(),);
    ///
    /// let fork = |full_name: &str| Repository {
    ///     id:          1,
    ///     name:        "b".to_owned(),
    ///     full_name:   full_name.to_owned(),
    ///     private:     false,
    ///     description: None,
    ///     fork:        true,
    /// };
    /// assert!(policy.includes(&fork("a/b")));
    /// assert!(!policy.includes(&fork("a/c")));
    /// ```
    pub fn includes(&self, repository: &Repository,) -> bool
    {
        let name = repository.full_name.as_str();

        let fork_axis = !repository.fork
            || axis_passes(self.include_forks, &self.forks_allowlist, &self.forks_denylist, name,);
        let private_axis = !repository.private
            || axis_passes(
                self.include_private,
                &self.private_allowlist,
                &self.private_denylist,
                name,
            );

        fork_axis && private_axis
    }
}

fn axis_passes(
    included: bool,
    allowlist: &BTreeSet<String,>,
    denylist: &BTreeSet<String,>,
    name: &str,
) -> bool
{
    if included { !denylist.contains(name,) } else { allowlist.contains(name,) }
}

/// Fetches the language histogram of a single repository.
///
/// # Errors
///
/// Returns transport errors, and [`Error::Decode`] when the body is not a
/// language to byte-count object.
pub async fn fetch_languages<T,>(transport: &T, full_name: &str,) -> Result<LanguageHistogram, Error,>
where
    T: Transport,
{
    let page = transport.get(&format!("/repos/{full_name}/languages"),).await?;
    let counts: BTreeMap<String, u64,> = serde_json::from_str(&page.body,)
        .map_err(|source| Error::decode(format!("languages of {full_name}"), source,),)?;
    Ok(LanguageHistogram(counts,),)
}

/// Aggregates the histograms of every repository admitted by `policy`.
///
/// Repositories are fetched one after another. The first failing fetch aborts
/// the aggregation.
///
/// # Errors
///
/// Propagates the first error returned by [`fetch_languages`].
pub async fn aggregate_languages<T,>(
    transport: &T,
    repositories: &[Repository],
    policy: &InclusionPolicy,
) -> Result<LanguageHistogram, Error,>
where
    T: Transport,
{
    let mut total = LanguageHistogram::new();
    let mut included = 0usize;

    for repository in repositories {
        if !policy.includes(repository,) {
            debug!("Skipping {} (fork: {}, private: {})", repository, repository.fork, repository.private);
            continue;
        }

        let histogram = fetch_languages(transport, &repository.full_name,).await?;
        debug!("{} reports {} languages", repository, histogram.len());
        total.merge(&histogram,);
        included += 1;
    }

    info!(
        "Aggregated {} languages from {} of {} repositories",
        total.len(),
        included,
        repositories.len()
    );

    Ok(total,)
}

/// Lists the account's repositories and aggregates their languages.
///
/// # Errors
///
/// Propagates errors from [`fetch_repositories`] and [`aggregate_languages`].
pub async fn fetch_account_languages<T,>(
    transport: &T,
    policy: &InclusionPolicy,
) -> Result<LanguageHistogram, Error,>
where
    T: Transport,
{
    let repositories = fetch_repositories(transport,).await?;
    aggregate_languages(transport, &repositories, policy,).await
}

/// Language aggregation over public repositories without a credential.
///
/// # Errors
///
/// Always returns [`Error::Unsupported`].
pub fn aggregate_public_languages(
    _account: &str,
    _include_forks: bool,
) -> Result<LanguageHistogram, Error,>
{
    Err(Error::Unsupported {
        operation: "public language aggregation",
    },)
}
