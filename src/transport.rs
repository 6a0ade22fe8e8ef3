// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! HTTP seam between the GitHub fetchers and the network.
//!
//! The fetchers are generic over [`Transport`] so pagination and aggregation
//! can be exercised against in-memory responses. [`GitHubClient`] is the
//! production implementation backed by `octocrab`: REST calls use basic
//! authentication, GraphQL calls use the token as a bearer credential.

use std::{fmt, time::Duration};

use octocrab::Octocrab;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::NetworkSettings,
    error::Error,
    retry::{RetryConfig, retry_with_backoff, with_deadline},
};

const GRAPHQL_OPERATION: &str = "POST /graphql";

/// Account login and personal access token.
///
/// The token is never printed by the [`fmt::Debug`] implementation.
#[derive(Clone,)]
pub struct Credential
{
    /// Login used as the basic-auth user name.
    pub account: String,
    /// Personal access token.
    pub token:   String,
}

impl Credential
{
    /// Creates a credential, trimming surrounding whitespace from the token.
    pub fn new(account: impl Into<String,>, token: &str,) -> Self
    {
        Self {
            account: account.into(), token: token.trim().to_owned(),
        }
    }
}

impl fmt::Debug for Credential
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.debug_struct("Credential",).field("account", &self.account,).finish_non_exhaustive()
    }
}

/// One REST response: the raw body plus the `link` header when present.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RestPage
{
    /// Undecoded response body.
    pub body: String,
    /// Raw value of the `link` response header.
    pub link: Option<String,>,
}

/// Request primitives needed by the fetchers.
///
/// Implementations carry their own credential. Errors returned from either
/// method are transport-level and abort the run.
#[allow(async_fn_in_trait)]
pub trait Transport
{
    /// Issues an authenticated `GET` for a path or absolute URL.
    async fn get(&self, url: &str,) -> Result<RestPage, Error,>;

    /// Posts a GraphQL payload and returns the undecoded JSON response.
    async fn graphql(&self, payload: &Value,) -> Result<Value, Error,>;
}

/// Production [`Transport`] talking to the GitHub API through `octocrab`.
#[derive(Debug, Clone,)]
pub struct GitHubClient
{
    rest:     Octocrab,
    graphql:  Octocrab,
    retry:    RetryConfig,
    deadline: Duration,
}

impl GitHubClient
{
    /// Builds REST and GraphQL clients for the credential.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when the API base is not a valid URI or a
    /// client cannot be constructed.
    pub fn new(settings: &NetworkSettings, credential: &Credential,) -> Result<Self, Error,>
    {
        let rest = Octocrab::builder()
            .base_uri(settings.api_base.as_str(),)
            .map_err(|e| Error::transport(format!("invalid API base {}: {e}", settings.api_base),),)?
            .basic_auth(credential.account.clone(), credential.token.clone(),)
            .build()
            .map_err(|e| Error::transport(format!("failed to initialize GitHub client: {e}"),),)?;

        let graphql = Octocrab::builder()
            .base_uri(settings.api_base.as_str(),)
            .map_err(|e| Error::transport(format!("invalid API base {}: {e}", settings.api_base),),)?
            .personal_token(credential.token.clone(),)
            .build()
            .map_err(|e| Error::transport(format!("failed to initialize GitHub client: {e}"),),)?;

        Ok(Self {
            rest,
            graphql,
            retry: settings.retry.clone(),
            deadline: settings.request_timeout(),
        },)
    }

    async fn get_once(&self, url: &str,) -> Result<RestPage, Error,>
    {
        let response = self
            .rest
            ._get(url,)
            .await
            .map_err(|e| Error::transport(format!("GET {url} failed: {e}"),),)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                operation: format!("GET {url}"),
                status:    status.as_u16(),
            },);
        }

        let link = response
            .headers()
            .get("link",)
            .and_then(|value| value.to_str().ok(),)
            .map(str::to_owned,);

        let body = self
            .rest
            .body_to_string(response,)
            .await
            .map_err(|e| Error::transport(format!("failed to read body of {url}: {e}"),),)?;

        Ok(RestPage {
            body, link,
        },)
    }

    async fn graphql_once(&self, payload: &Value,) -> Result<Value, Error,>
    {
        self.graphql.graphql::<Value,>(payload,).await.map_err(graphql_error,)
    }
}

/// Keeps the status of GitHub error responses so 4xx answers are not retried.
fn graphql_error(error: octocrab::Error,) -> Error
{
    match error {
        octocrab::Error::GitHub {
            source, ..
        } => Error::HttpStatus {
            operation: GRAPHQL_OPERATION.to_owned(),
            status:    source.status_code.as_u16(),
        },
        other => Error::transport(format!("GraphQL request failed: {other}"),),
    }
}

impl Transport for GitHubClient
{
    async fn get(&self, url: &str,) -> Result<RestPage, Error,>
    {
        debug!("GET {}", url);
        let operation = format!("GET {url}");
        retry_with_backoff(&self.retry, &operation, || {
            with_deadline(self.deadline, &operation, self.get_once(url,),)
        },)
        .await
    }

    async fn graphql(&self, payload: &Value,) -> Result<Value, Error,>
    {
        debug!("{}", GRAPHQL_OPERATION);
        retry_with_backoff(&self.retry, GRAPHQL_OPERATION, || {
            with_deadline(self.deadline, GRAPHQL_OPERATION, self.graphql_once(payload,),)
        },)
        .await
    }
}
