//! Configuration document describing which account to summarize and how the
//! card is rendered.
//!
//! The types in this module mirror the structure of the YAML document consumed
//! by the CLI. Every optional section falls back to the defaults that reproduce
//! the stock card layout, so a minimal document only names the account.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    colors::parse_hex,
    error::{self, Error},
    retry::RetryConfig,
};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Root configuration document.
///
/// # Examples
///
/// ```
/// use ghcard::parse_config;
///
/// let config = parse_config("account: octocat\n",).expect("valid configuration",);
/// assert_eq!(config.account, "octocat");
/// assert!(!config.policy.include_forks);
/// assert!(config.policy.include_private);
/// ```
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct CardConfig
{
    /// GitHub login whose repositories are summarized.
    #[serde(alias = "user")]
    pub account: String,

    /// Repository inclusion rules applied before languages are aggregated.
    #[serde(default)]
    pub policy: InclusionPolicy,

    /// Languages removed from the histogram before ranking.
    #[serde(default, alias = "ignore_languages")]
    pub ignored_languages: Vec<String,>,

    /// Brand color overrides keyed by language name, as `#rrggbb` strings.
    #[serde(default)]
    pub colors: BTreeMap<String, String,>,

    /// Asset locations and layout of the generated card.
    #[serde(default)]
    pub render: RenderSettings,

    /// HTTP deadlines and retry behavior.
    #[serde(default)]
    pub network: NetworkSettings,
}

/// Inclusion rules for forks and private repositories.
///
/// Each axis has a boolean default and two override lists keyed by the
/// repository full name (`owner/name`). The allowlist only matters while the
/// axis is excluded, the denylist only while it is included.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
#[serde(default)]
pub struct InclusionPolicy
{
    /// Include forked repositories.
    pub include_forks:     bool,
    /// Include private repositories.
    pub include_private:   bool,
    /// Forks force-included while `include_forks` is `false`.
    #[serde(alias = "with_forks")]
    pub forks_allowlist:   BTreeSet<String,>,
    /// Forks force-excluded while `include_forks` is `true`.
    #[serde(alias = "without_forks")]
    pub forks_denylist:    BTreeSet<String,>,
    /// Private repositories force-included while `include_private` is `false`.
    #[serde(alias = "with_private")]
    pub private_allowlist: BTreeSet<String,>,
    /// Private repositories force-excluded while `include_private` is `true`.
    #[serde(alias = "without_private")]
    pub private_denylist:  BTreeSet<String,>,
}

impl Default for InclusionPolicy
{
    fn default() -> Self
    {
        Self {
            include_forks:     false,
            include_private:   true,
            forks_allowlist:   BTreeSet::new(),
            forks_denylist:    BTreeSet::new(),
            private_allowlist: BTreeSet::new(),
            private_denylist:  BTreeSet::new(),
        }
    }
}

/// Asset paths and layout parameters for the rendering pass.
#[derive(Debug, Deserialize, Serialize, Clone,)]
#[serde(default)]
pub struct RenderSettings
{
    /// Template image that fixes the canvas dimensions and background.
    pub base_image:     PathBuf,
    /// TrueType or OpenType font used for every label.
    pub font:           PathBuf,
    /// Directory holding `<Language>.png` logos.
    pub languages_dir:  PathBuf,
    /// Optional directory of framework and tool logos.
    pub frameworks_dir: Option<PathBuf,>,
    /// Destination of the generated PNG.
    pub output:         PathBuf,
    /// Bar geometry and row limits.
    pub layout:         LayoutSettings,
}

impl Default for RenderSettings
{
    fn default() -> Self
    {
        Self {
            base_image:     PathBuf::from("res/base_image.png",),
            font:           PathBuf::from("res/FiraCode-Bold.ttf",),
            languages_dir:  PathBuf::from("res/langs",),
            frameworks_dir: Some(PathBuf::from("res/frameworks",),),
            output:         PathBuf::from("output.png",),
            layout:         LayoutSettings::default(),
        }
    }
}

/// Geometry of the language bars.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq,)]
#[serde(default)]
pub struct LayoutSettings
{
    /// Languages drawn individually before the tail is collapsed.
    pub max_languages: usize,
    /// Width in pixels of a bar representing 100%.
    pub max_bar_width: u32,
    /// Height of a single bar.
    pub bar_height:    u32,
    /// Vertical offset of the first bar.
    pub bar_top:       u32,
    /// Vertical gap between consecutive bars.
    pub bar_gap:       u32,
    /// Edge length of the square language logo.
    pub icon_size:     u32,
    /// Horizontal gap between a logo and its bar.
    pub icon_margin:   u32,
}

impl Default for LayoutSettings
{
    fn default() -> Self
    {
        Self {
            max_languages: 7,
            max_bar_width: 1000,
            bar_height:    55,
            bar_top:       200,
            bar_gap:       50,
            icon_size:     90,
            icon_margin:   25,
        }
    }
}

/// Network behavior of the GitHub client.
#[derive(Debug, Deserialize, Serialize, Clone,)]
#[serde(default)]
pub struct NetworkSettings
{
    /// Root of the GitHub REST and GraphQL APIs.
    pub api_base:             String,
    /// Deadline applied to every individual request.
    pub request_timeout_secs: u64,
    /// Retry policy for transport failures.
    pub retry:                RetryConfig,
}

impl NetworkSettings
{
    /// Returns the per-request deadline.
    pub fn request_timeout(&self,) -> Duration
    {
        Duration::from_secs(self.request_timeout_secs,)
    }
}

impl Default for NetworkSettings
{
    fn default() -> Self
    {
        Self {
            api_base:             DEFAULT_API_BASE.to_owned(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retry:                RetryConfig::default(),
        }
    }
}

/// Loads and validates a card configuration from disk.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read, [`Error::Parse`] for
/// malformed YAML and [`Error::Validation`] when invariants do not hold.
pub fn load_config(path: &Path,) -> Result<CardConfig, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_config(&contents,)
}

/// Parses and validates a card configuration from a YAML string.
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed YAML and [`Error::Validation`] when
/// invariants do not hold.
pub fn parse_config(contents: &str,) -> Result<CardConfig, Error,>
{
    let mut config: CardConfig = serde_yaml::from_str(contents,)?;
    config.account = config.account.trim().to_owned();
    validate(&config,)?;
    Ok(config,)
}

fn validate(config: &CardConfig,) -> Result<(), Error,>
{
    if config.account.is_empty() {
        return Err(Error::validation("account must not be empty",),);
    }

    let layout = &config.render.layout;
    if layout.max_languages == 0 {
        return Err(Error::validation("render.layout.max_languages must be at least 1",),);
    }
    if layout.max_bar_width == 0 {
        return Err(Error::validation("render.layout.max_bar_width must be at least 1",),);
    }
    if layout.icon_size == 0 {
        return Err(Error::validation("render.layout.icon_size must be at least 1",),);
    }

    if config.network.request_timeout_secs == 0 {
        return Err(Error::validation("network.request_timeout_secs must be positive",),);
    }
    if config.network.retry.max_attempts == 0 {
        return Err(Error::validation("network.retry.max_attempts must be at least 1",),);
    }
    if config.network.retry.backoff_factor < 1.0 {
        return Err(Error::validation("network.retry.backoff_factor must be at least 1.0",),);
    }

    for (language, value,) in &config.colors {
        if parse_hex(value,).is_none() {
            return Err(Error::validation(format!(
                "color override for {language} is not a hex color: {value}"
            ),),);
        }
    }

    Ok((),)
}
