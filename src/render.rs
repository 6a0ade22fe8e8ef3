// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Card composition.
//!
//! The card has three sections drawn onto a copy of the base image: language
//! bars on the right, a framework logo grid on the top left and the list of
//! contributed repositories below it. All geometry is computed by pure
//! helpers so placement can be checked without a font or image assets.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    canvas::{Canvas, Rgba},
    colors::LanguagePalette,
    config::{LayoutSettings, RenderSettings},
    error::Error,
    ranking::{RankedEntry, collapse_tail},
    text::{LabelPainter, Typeface},
};

const TITLE_SIZE: f32 = 64.0;
const BODY_SIZE: f32 = 24.0;

const LANGUAGES_TITLE: &str = "The languages I use";
const LANGUAGES_TITLE_AT: (i64, i64,) = (1150, 25,);
const LANGUAGES_SUBTITLE: &str = "(ordered according to usage in my repositories)";
const LANGUAGES_SUBTITLE_AT: (i64, i64,) = (1206, 120,);

const FRAMEWORKS_TITLE: [&str; 2] = ["The tools and", "frameworks I use",];
const FRAMEWORKS_TITLE_AT: [(i64, i64,); 2] = [(50, 25,), (50, 100,),];
const FRAMEWORKS_ORIGIN: (i64, i64,) = (75, 200,);
const FRAMEWORK_LOGO_SIZE: i64 = 90;
const FRAMEWORK_GAP: i64 = 15;
const FRAMEWORK_ROWS: usize = 4;
const MIN_FRAMEWORKS_PER_ROW: usize = 2;

const CONTRIBUTIONS_TITLE: [&str; 2] = ["Projects I", "contributed to",];
const CONTRIBUTIONS_TITLE_AT: [(i64, i64,); 2] = [(50, 550,), (50, 625,),];
const CONTRIBUTIONS_ORIGIN: (i64, i64,) = (75, 725,);
const CONTRIBUTION_LINE_PITCH: i64 = 35;

/// Data shown on the card.
#[derive(Debug, Clone, Default, PartialEq, Serialize,)]
pub struct CardData
{
    /// Languages ranked by share, largest first.
    pub ranking:       Vec<RankedEntry,>,
    /// `owner/name` of contributed repositories in display order.
    pub contributions: Vec<String,>,
}

/// Supplies logo images to the renderer.
pub trait IconSource
{
    /// Logo of `language`, or `None` when unavailable.
    fn language_icon(&self, language: &str,) -> Option<Canvas,>;

    /// Framework and tool logos in display order.
    fn framework_icons(&self,) -> Vec<Canvas,>;
}

/// Logos read from `<languages_dir>/<Language>.png` and every `.png` file in
/// the frameworks directory.
#[derive(Debug, Clone,)]
pub struct DirectoryIcons
{
    languages_dir:  PathBuf,
    frameworks_dir: Option<PathBuf,>,
}

impl DirectoryIcons
{
    /// Reads logos from the directories named in the render settings.
    pub fn new(settings: &RenderSettings,) -> Self
    {
        Self {
            languages_dir:  settings.languages_dir.clone(),
            frameworks_dir: settings.frameworks_dir.clone(),
        }
    }
}

fn load_icon(path: &Path,) -> Option<Canvas,>
{
    match Canvas::load(path,) {
        Ok(icon,) => Some(icon,),
        Err(error,) => {
            warn!("skipping icon {}: {}", path.display(), error.to_display_string());
            None
        }
    }
}

fn is_png(path: &Path,) -> bool
{
    path.extension().and_then(|extension| extension.to_str(),).is_some_and(|extension| {
        extension.eq_ignore_ascii_case("png",)
    },)
}

impl IconSource for DirectoryIcons
{
    fn language_icon(&self, language: &str,) -> Option<Canvas,>
    {
        let path = self.languages_dir.join(format!("{language}.png"),);
        if !path.is_file() {
            warn!("no icon for {} at {}", language, path.display());
            return None;
        }
        load_icon(&path,)
    }

    fn framework_icons(&self,) -> Vec<Canvas,>
    {
        let Some(directory,) = &self.frameworks_dir else {
            return Vec::new();
        };

        let entries = match fs::read_dir(directory,) {
            Ok(entries,) => entries,
            Err(error,) => {
                warn!("cannot read frameworks directory {}: {}", directory.display(), error);
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf,> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path(),),)
            .filter(|path| path.is_file() && is_png(path,),)
            .collect();
        paths.sort();

        debug!("Found {} framework logos in {}", paths.len(), directory.display());
        paths.iter().filter_map(|path| load_icon(path,),).collect()
    }
}

/// Placement of one language bar and its logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct BarGeometry
{
    /// Left edge of the bar; the bar extends to the right canvas edge.
    pub x:      i64,
    /// Top edge of the bar.
    pub y:      i64,
    /// Width of the bar.
    pub width:  u32,
    /// Left edge of the logo.
    pub icon_x: i64,
    /// Top edge of the logo, centered on the bar.
    pub icon_y: i64,
}

/// Computes where the bar of `row` with `percentage` is drawn on a canvas of
/// `canvas_width`.
///
/// # Examples
///
/// ```
/// use ghcard::{LayoutSettings, bar_geometry};
///
/// let bar = bar_geometry(&LayoutSettings::default(), 2000, 1, 0.75,);
/// assert_eq!((bar.x, bar.y, bar.width), (1250, 305, 750));
/// assert_eq!((bar.icon_x, bar.icon_y), (1135, 288));
/// ```
pub fn bar_geometry(
    layout: &LayoutSettings,
    canvas_width: u32,
    row: usize,
    percentage: f64,
) -> BarGeometry
{
    let width = (layout.max_bar_width as f64 * percentage.clamp(0.0, 1.0,)) as u32;
    let x = canvas_width as i64 - width as i64;
    let y = layout.bar_top as i64 + row as i64 * (layout.bar_height as i64 + layout.bar_gap as i64);

    BarGeometry {
        x,
        y,
        width,
        icon_x: x - layout.icon_margin as i64 - layout.icon_size as i64,
        icon_y: y + (layout.bar_height as i64 - layout.icon_size as i64) / 2,
    }
}

/// Returns `(per_row, tile)` for a square collage of `count` logos with edge
/// `size`. Logos fill at most two rows and every tile stays inside the
/// square.
///
/// # Examples
///
/// ```
/// use ghcard::collage_grid;
///
/// assert_eq!(collage_grid(1, 90,), (1, 90));
/// assert_eq!(collage_grid(3, 90,), (2, 45));
/// assert_eq!(collage_grid(6, 90,), (3, 30));
/// ```
pub fn collage_grid(count: usize, size: u32,) -> (usize, u32,)
{
    let per_row = count.div_ceil(2,).max(1,);
    let rows = count.div_ceil(per_row,);
    (per_row, size / per_row.max(rows,) as u32,)
}

/// Packs `icons` into one square image of edge `size`.
pub fn collage(icons: &[Canvas], size: u32,) -> Canvas
{
    let mut canvas = Canvas::new(size, size,);
    let (per_row, tile,) = collage_grid(icons.len(), size,);
    if tile == 0 {
        warn!("{} logos do not fit into a {}px collage", icons.len(), size);
        return canvas;
    }

    for (index, icon,) in icons.iter().enumerate() {
        let x = (index % per_row) as i64 * tile as i64;
        let y = (index / per_row) as i64 * tile as i64;
        canvas.blend(&icon.resize_nearest(tile, tile,), x, y,);
    }

    canvas
}

/// Number of framework logos per grid row.
///
/// # Examples
///
/// ```
/// use ghcard::frameworks_per_row;
///
/// assert_eq!(frameworks_per_row(3,), 2);
/// assert_eq!(frameworks_per_row(9,), 3);
/// ```
pub fn frameworks_per_row(count: usize,) -> usize
{
    count.div_ceil(FRAMEWORK_ROWS,).max(MIN_FRAMEWORKS_PER_ROW,)
}

/// Draws the card sections with a label painter and an icon source.
pub struct CardRenderer<'a, P, I,>
{
    layout:  LayoutSettings,
    painter: &'a P,
    palette: &'a LanguagePalette,
    icons:   &'a I,
}

impl<'a, P, I,> CardRenderer<'a, P, I,>
where
    P: LabelPainter,
    I: IconSource,
{
    /// Creates a renderer that positions sections according to `layout`.
    pub fn new(
        layout: LayoutSettings,
        painter: &'a P,
        palette: &'a LanguagePalette,
        icons: &'a I,
    ) -> Self
    {
        Self {
            layout,
            painter,
            palette,
            icons,
        }
    }

    /// Draws every section onto a copy of `base`.
    pub fn render(&self, base: &Canvas, data: &CardData,) -> Canvas
    {
        let mut canvas = base.clone();
        self.draw_languages(&mut canvas, &data.ranking,);
        self.draw_frameworks(&mut canvas,);
        self.draw_contributions(&mut canvas, &data.contributions,);
        canvas
    }

    fn draw_languages(&self, canvas: &mut Canvas, ranking: &[RankedEntry],)
    {
        let (x, y,) = LANGUAGES_TITLE_AT;
        self.painter.draw_label(canvas, x, y, LANGUAGES_TITLE, TITLE_SIZE, Rgba::WHITE,);
        let (x, y,) = LANGUAGES_SUBTITLE_AT;
        self.painter.draw_label(canvas, x, y, LANGUAGES_SUBTITLE, BODY_SIZE, Rgba::WHITE,);

        let collapsed = collapse_tail(ranking.to_vec(), self.layout.max_languages,);
        for (row, entry,) in collapsed.visible.iter().enumerate() {
            let color = self.palette.color_for(&entry.language,);
            let icon = self.icons.language_icon(&entry.language,);
            self.draw_bar(canvas, row, entry.percentage, color, icon.as_ref(),);
        }

        if let Some(overflow,) = collapsed.overflow {
            debug!("Collapsing {} languages into {}", overflow.languages.len(), overflow.label());
            let icons: Vec<Canvas,> = overflow
                .languages
                .iter()
                .filter_map(|language| self.icons.language_icon(language,),)
                .collect();
            let icon = collage(&icons, self.layout.icon_size,);
            self.draw_bar(
                canvas,
                collapsed.visible.len(),
                overflow.percentage,
                Rgba::WHITE,
                Some(&icon,),
            );
        }
    }

    fn draw_bar(
        &self,
        canvas: &mut Canvas,
        row: usize,
        percentage: f64,
        color: Rgba,
        icon: Option<&Canvas,>,
    )
    {
        let bar = bar_geometry(&self.layout, canvas.width(), row, percentage,);
        if let Some(icon,) = icon {
            canvas.blend(icon, bar.icon_x, bar.icon_y,);
        }
        canvas.fill_rect(bar.x, bar.y, bar.width, self.layout.bar_height, color,);
    }

    fn draw_frameworks(&self, canvas: &mut Canvas,)
    {
        for (line, (x, y,),) in FRAMEWORKS_TITLE.iter().zip(FRAMEWORKS_TITLE_AT,) {
            self.painter.draw_label(canvas, x, y, line, TITLE_SIZE, Rgba::WHITE,);
        }

        let icons = self.icons.framework_icons();
        let per_row = frameworks_per_row(icons.len(),);
        let pitch = FRAMEWORK_LOGO_SIZE + FRAMEWORK_GAP;
        let (left, top,) = FRAMEWORKS_ORIGIN;

        for (index, icon,) in icons.iter().enumerate() {
            let column = (index % per_row) as i64;
            let row = (index / per_row) as i64;
            canvas.blend(icon, left + column * pitch, top + row * pitch,);
        }
    }

    fn draw_contributions(&self, canvas: &mut Canvas, contributions: &[String],)
    {
        for (line, (x, y,),) in CONTRIBUTIONS_TITLE.iter().zip(CONTRIBUTIONS_TITLE_AT,) {
            self.painter.draw_label(canvas, x, y, line, TITLE_SIZE, Rgba::WHITE,);
        }

        let (x, top,) = CONTRIBUTIONS_ORIGIN;
        for (index, repository,) in contributions.iter().enumerate() {
            let y = top + index as i64 * CONTRIBUTION_LINE_PITCH;
            self.painter.draw_label(canvas, x, y, repository, BODY_SIZE, Rgba::WHITE,);
        }
    }
}

/// Loads the base image, font and logos named by `settings` and draws the
/// card.
///
/// # Errors
///
/// Returns [`Error::Io`], [`Error::Image`] or [`Error::Font`] when the base
/// image or the font cannot be loaded. Missing logos only produce warnings.
pub fn render_card(
    settings: &RenderSettings,
    palette: &LanguagePalette,
    data: &CardData,
) -> Result<Canvas, Error,>
{
    let base = Canvas::load(&settings.base_image,)?;
    let typeface = Typeface::load(&settings.font,)?;
    let icons = DirectoryIcons::new(settings,);

    info!(
        "Rendering {} languages and {} contributions onto {}x{} canvas",
        data.ranking.len(),
        data.contributions.len(),
        base.width(),
        base.height()
    );

    let renderer = CardRenderer::new(settings.layout, &typeface, palette, &icons,);
    Ok(renderer.render(&base, data,),)
}
