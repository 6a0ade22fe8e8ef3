//! Profile summary cards built from GitHub statistics.
//!
//! The library lists the repositories of an authenticated account, aggregates
//! their per-language byte counts, collects the repositories the account
//! contributed to, and composites the result onto a base PNG. Network access
//! goes through the [`Transport`] trait so every fetcher can be exercised
//! against canned responses; drawing goes through [`LabelPainter`] and
//! [`IconSource`] for the same reason.

mod canvas;
mod card;
mod catalog;
mod colors;
mod config;
mod contributions;
mod error;
mod languages;
mod pagination;
mod ranking;
mod render;
pub mod retry;
mod text;
mod transport;

pub use canvas::{Canvas, Rgba};
pub use card::{collect_card_data, collect_ranking};
pub use catalog::{Repository, USER_REPOS_PATH, fetch_public_repositories, fetch_repositories};
pub use colors::{LanguagePalette, NEUTRAL_COLOR, parse_hex};
pub use config::{
    CardConfig, InclusionPolicy, LayoutSettings, NetworkSettings, RenderSettings, load_config,
    parse_config,
};
pub use contributions::{
    CONTRIBUTIONS_PAGE_SIZE, contributions_query, fetch_contributed_repositories,
};
pub use error::{Error, io_error};
pub use languages::{
    LanguageHistogram, aggregate_languages, aggregate_public_languages, fetch_account_languages,
    fetch_languages,
};
pub use pagination::{
    Connection, GraphqlError, GraphqlResponse, PageInfo, parse_next_link, walk_graphql, walk_rest,
};
pub use ranking::{
    CollapsedRanking, OTHER_LANGUAGE, OverflowEntry, RankedEntry, collapse_tail, rank,
};
pub use render::{
    BarGeometry, CardData, CardRenderer, DirectoryIcons, IconSource, bar_geometry, collage,
    collage_grid, frameworks_per_row, render_card,
};
pub use text::{LabelPainter, Typeface};
pub use transport::{Credential, GitHubClient, RestPage, Transport};
