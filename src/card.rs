// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Collects everything the card shows from the GitHub APIs.
///
/// Requests are issued one after another: repository listing, one languages
/// request per included repository, then the contributions walk.
use tracing::info;

use crate::{
    config::CardConfig,
    contributions::fetch_contributed_repositories,
    error::Error,
    languages::{LanguageHistogram, fetch_account_languages},
    ranking::{RankedEntry, rank},
    render::CardData,
    transport::Transport,
};

/// Aggregates the account's languages, drops ignored ones and ranks the rest.
///
/// # Errors
///
/// Propagates transport errors from the repository and language requests.
pub async fn collect_ranking<T,>(
    transport: &T,
    config: &CardConfig,
) -> Result<Vec<RankedEntry,>, Error,>
where
    T: Transport,
{
    let mut histogram: LanguageHistogram =
        fetch_account_languages(transport, &config.policy,).await?;
    histogram.remove_languages(&config.ignored_languages,);

    let ranking = rank(&histogram,);
    info!("Ranked {} languages for {}", ranking.len(), config.account);
    Ok(ranking,)
}

/// Fetches the ranking and the contributed repositories.
///
/// # Errors
///
/// Propagates transport errors from either traversal.
pub async fn collect_card_data<T,>(transport: &T, config: &CardConfig,) -> Result<CardData, Error,>
where
    T: Transport,
{
    let ranking = collect_ranking(transport, config,).await?;
    let contributions = fetch_contributed_repositories(transport,).await?;

    Ok(CardData {
        ranking,
        contributions,
    },)
}
