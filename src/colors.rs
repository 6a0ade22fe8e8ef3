// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Language brand colors.
//!
//! The built-in table follows GitHub linguist. Configured overrides take
//! precedence; languages missing from both fall back to a neutral color.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use tracing::warn;

use crate::canvas::Rgba;

static HEX_COLOR: LazyLock<Regex,> = LazyLock::new(|| {
    Regex::new(r"(?i)^#?([0-9a-f]{2})([0-9a-f]{2})([0-9a-f]{2})$",).expect("valid hex pattern",)
},);

/// Color used for languages without a known brand color.
pub const NEUTRAL_COLOR: Rgba = Rgba::BLACK;

const LINGUIST_COLORS: &[(&str, &str,)] = &[
    ("Assembly", "#6E4C13",),
    ("C", "#555555",),
    ("C#", "#178600",),
    ("C++", "#f34b7d",),
    ("CMake", "#DA3434",),
    ("CSS", "#563d7c",),
    ("Clojure", "#db5855",),
    ("CoffeeScript", "#244776",),
    ("Dart", "#00B4AB",),
    ("Dockerfile", "#384d54",),
    ("Elixir", "#6e4a7e",),
    ("Elm", "#60B5CC",),
    ("Erlang", "#B83998",),
    ("F#", "#b845fc",),
    ("Fortran", "#4d41b1",),
    ("Go", "#00ADD8",),
    ("Groovy", "#4298b8",),
    ("HTML", "#e34c26",),
    ("Haskell", "#5e5086",),
    ("Java", "#b07219",),
    ("JavaScript", "#f1e05a",),
    ("Julia", "#a270ba",),
    ("Jupyter Notebook", "#DA5B0B",),
    ("Kotlin", "#A97BFF",),
    ("Lua", "#000080",),
    ("Makefile", "#427819",),
    ("Nix", "#7e7eff",),
    ("OCaml", "#ef7a08",),
    ("Objective-C", "#438eff",),
    ("PHP", "#4F5D95",),
    ("Perl", "#0298c3",),
    ("PowerShell", "#012456",),
    ("Python", "#3572A5",),
    ("R", "#198CE7",),
    ("Ruby", "#701516",),
    ("Rust", "#dea584",),
    ("SCSS", "#c6538c",),
    ("Scala", "#c22d40",),
    ("Shell", "#89e051",),
    ("Svelte", "#ff3e00",),
    ("Swift", "#F05138",),
    ("TeX", "#3D6117",),
    ("TypeScript", "#3178c6",),
    ("Vue", "#41b883",),
    ("WebAssembly", "#04133b",),
    ("Zig", "#ec915c",),
];

/// Parses `#rrggbb` (leading `#` optional, case-insensitive) into an opaque
/// color.
///
/// # Examples
///
/// ```
/// use ghcard::{Rgba, parse_hex};
///
/// assert_eq!(parse_hex("#dea584"), Some(Rgba::opaque(0xde, 0xa5, 0x84)));
/// assert_eq!(parse_hex("00ADD8"), Some(Rgba::opaque(0x00, 0xad, 0xd8)));
/// assert_eq!(parse_hex(""), None);
/// ```
pub fn parse_hex(value: &str,) -> Option<Rgba,>
{
    let captures = HEX_COLOR.captures(value.trim(),)?;
    let channel = |index: usize| u8::from_str_radix(&captures[index], 16,).ok();
    Some(Rgba::opaque(channel(1,)?, channel(2,)?, channel(3,)?,),)
}

/// Brand color lookup with configured overrides.
#[derive(Debug, Clone, Default,)]
pub struct LanguagePalette
{
    overrides: BTreeMap<String, Rgba,>,
}

impl LanguagePalette
{
    /// Builds a palette from `#rrggbb` overrides. Unparseable values are
    /// skipped with a warning.
    pub fn with_overrides(overrides: &BTreeMap<String, String,>,) -> Self
    {
        let mut parsed = BTreeMap::new();
        for (language, value,) in overrides {
            match parse_hex(value,) {
                Some(color,) => {
                    parsed.insert(language.clone(), color,);
                }
                None => warn!("ignoring invalid color override {} for {}", value, language),
            }
        }
        Self {
            overrides: parsed,
        }
    }

    /// Brand color of `language`, if known.
    pub fn lookup(&self, language: &str,) -> Option<Rgba,>
    {
        if let Some(color,) = self.overrides.get(language,) {
            return Some(*color,);
        }

        LINGUIST_COLORS
            .iter()
            .find(|(name, _,)| *name == language,)
            .and_then(|(_, hex,)| parse_hex(hex,),)
    }

    /// Brand color of `language`, or [`NEUTRAL_COLOR`] with a warning.
    pub fn color_for(&self, language: &str,) -> Rgba
    {
        self.lookup(language,).unwrap_or_else(|| {
            warn!("{} does not have a color, using neutral fallback", language);
            NEUTRAL_COLOR
        },)
    }
}
