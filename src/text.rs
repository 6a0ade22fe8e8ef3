// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Label rendering with a TrueType face.

use std::{fs, path::Path};

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};

use crate::{
    canvas::{Canvas, Rgba},
    error::{self, Error},
};

/// Draws single-line text onto a canvas.
///
/// `(x, y)` is the top-left corner of the line box and `size` is the em size
/// in pixels.
pub trait LabelPainter
{
    /// Paints `text` in `color`, blending antialiased coverage over the
    /// existing pixels. Glyphs falling outside the canvas are clipped.
    fn draw_label(&self, canvas: &mut Canvas, x: i64, y: i64, text: &str, size: f32, color: Rgba,);
}

/// Owned font face.
pub struct Typeface
{
    font: FontVec,
}

impl std::fmt::Debug for Typeface
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("Typeface",).finish_non_exhaustive()
    }
}

impl Typeface
{
    /// Parses a TrueType or OpenType font.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Font`] when the data is not a usable font.
    pub fn from_bytes(bytes: Vec<u8,>,) -> Result<Self, Error,>
    {
        let font = FontVec::try_from_vec(bytes,).map_err(|e| Error::Font {
            message: e.to_string(),
        },)?;
        Ok(Self {
            font,
        },)
    }

    /// Reads and parses a font file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and [`Error::Font`]
    /// when it cannot be parsed.
    pub fn load(path: &Path,) -> Result<Self, Error,>
    {
        let bytes = fs::read(path,).map_err(|source| error::io_error(path, source,),)?;
        Self::from_bytes(bytes,).map_err(|error| match error {
            Error::Font {
                message,
            } => Error::Font {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        },)
    }

    /// Converts an em size in pixels into the scale `ab_glyph` expects, which
    /// measures ascent to descent.
    fn scale(&self, size: f32,) -> PxScale
    {
        let units_per_em = self.font.units_per_em().unwrap_or(1000.0,);
        PxScale::from(size * self.font.height_unscaled() / units_per_em,)
    }
}

impl LabelPainter for Typeface
{
    fn draw_label(&self, canvas: &mut Canvas, x: i64, y: i64, text: &str, size: f32, color: Rgba,)
    {
        let scale = self.scale(size,);
        let scaled = self.font.as_scaled(scale,);
        let baseline = y as f32 + scaled.ascent();
        let mut caret = x as f32;
        let mut previous: Option<GlyphId,> = None;

        for character in text.chars() {
            let id = scaled.glyph_id(character,);
            if let Some(previous,) = previous {
                caret += scaled.kern(previous, id,);
            }

            let glyph = id.with_scale_and_position(scale, point(caret, baseline,),);
            caret += scaled.h_advance(id,);
            previous = Some(id,);

            let Some(outlined,) = self.font.outline_glyph(glyph,) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let left = bounds.min.x as i64;
            let top = bounds.min.y as i64;
            outlined.draw(|gx, gy, coverage| {
                if coverage > 0.0 {
                    canvas.blend_pixel(
                        left + gx as i64,
                        top + gy as i64,
                        color.with_coverage(coverage,),
                    );
                }
            },);
        }
    }
}

#[cfg(test)]
mod tests
{
    use ab_glyph::{Font, ScaleFont, point};

    use super::{LabelPainter, Typeface};
    use crate::{
        canvas::{Canvas, Rgba},
        error::Error,
    };

    const FIXTURE_FONT: &[u8] = include_bytes!("../fixtures/DejaVuSansMono.ttf");

    fn typeface() -> Typeface
    {
        Typeface::from_bytes(FIXTURE_FONT.to_vec(),).expect("fixture font parses",)
    }

    fn ink(canvas: &Canvas,) -> Vec<(i64, i64,),>
    {
        let mut points = Vec::new();
        for y in 0..i64::from(canvas.height(),) {
            for x in 0..i64::from(canvas.width(),) {
                if canvas.pixel(x, y,).is_some_and(|color| color.alpha() > 0,) {
                    points.push((x, y,),);
                }
            }
        }
        points
    }

    fn ascent(face: &Typeface, size: f32,) -> f32
    {
        face.font.as_scaled(face.scale(size,),).ascent()
    }

    #[test]
    fn garbage_bytes_are_a_font_error()
    {
        let error = Typeface::from_bytes(b"definitely not a font".to_vec(),)
            .expect_err("expected font error",);
        assert!(matches!(error, Error::Font { .. }));
    }

    #[test]
    fn missing_font_file_is_an_io_error()
    {
        let temp = tempfile::tempdir().expect("failed to create tempdir",);
        let error =
            Typeface::load(&temp.path().join("absent.ttf",),).expect_err("expected io error",);
        assert!(matches!(error, Error::Io { .. }));
    }

    #[test]
    fn glyph_ink_stays_within_its_pixel_bounds()
    {
        let face = typeface();
        let mut canvas = Canvas::new(100, 100,);
        face.draw_label(&mut canvas, 20, 30, "I", 32.0, Rgba::WHITE,);

        let scale = face.scale(32.0,);
        let glyph = face
            .font
            .glyph_id('I',)
            .with_scale_and_position(scale, point(20.0, 30.0 + ascent(&face, 32.0,),),);
        let bounds = face.font.outline_glyph(glyph,).expect("glyph has an outline",).px_bounds();

        let points = ink(&canvas,);
        assert!(!points.is_empty());
        for (x, y,) in points {
            assert!(
                x >= bounds.min.x as i64 && x < bounds.max.x as i64,
                "column {x} outside {bounds:?}"
            );
            assert!(y >= bounds.min.y as i64 && y < bounds.max.y as i64, "row {y} outside {bounds:?}");
        }
    }

    #[test]
    fn label_hangs_from_top_and_rests_on_baseline()
    {
        let face = typeface();
        let mut canvas = Canvas::new(100, 100,);
        face.draw_label(&mut canvas, 20, 30, "I", 32.0, Rgba::WHITE,);

        let rows: Vec<i64,> = ink(&canvas,).into_iter().map(|(_, y,)| y,).collect();
        let top = rows.iter().copied().min().expect("label left ink",);
        let bottom = rows.iter().copied().max().expect("label left ink",);
        let baseline = 30.0 + ascent(&face, 32.0,);

        assert!(top >= 30, "ink above the line box at row {top}");
        assert!(
            ((bottom + 1) as f32 - baseline).abs() <= 1.0,
            "ink ends at row {bottom}, baseline is {baseline}"
        );
    }

    #[test]
    fn transparent_label_leaves_canvas_unchanged()
    {
        let face = typeface();
        let background = Canvas::filled(100, 60, Rgba::opaque(13, 17, 23,),);
        let mut canvas = background.clone();

        face.draw_label(&mut canvas, 4, 4, "Rust 42%", 24.0, Rgba::TRANSPARENT,);

        assert_eq!(canvas, background);
    }
}
