// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! RGBA raster and the compositing primitives used to draw the card.
//!
//! Coordinates passed to drawing operations are signed so images may be
//! placed partially off-canvas; every write is clipped to the canvas bounds.

use std::{fs, io::Cursor, path::Path};

use crate::error::{self, Error};

/// 8-bit straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default,)]
pub struct Rgba(pub [u8; 4],);

impl Rgba
{
    /// Opaque black.
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255,],);
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0,],);
    /// Opaque white.
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255,],);

    /// Creates a color from its four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8,) -> Self
    {
        Self([r, g, b, a,],)
    }

    /// Creates a fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8,) -> Self
    {
        Self([r, g, b, 255,],)
    }

    /// Alpha channel.
    pub const fn alpha(self,) -> u8
    {
        self.0[3]
    }

    /// Returns the color with its alpha scaled by `coverage` in `[0, 1]`.
    pub fn with_coverage(self, coverage: f32,) -> Self
    {
        let [r, g, b, a,] = self.0;
        Self([r, g, b, to_channel(a as f32 / 255.0 * coverage.clamp(0.0, 1.0,),),],)
    }

    /// Composites `self` over `dst` with the source-over operator.
    ///
    /// Opaque sources replace the destination and fully transparent sources
    /// leave it untouched, both without any floating-point rounding.
    ///
    /// # Examples
    ///
    /// ```
    /// use ghcard::Rgba;
    ///
    /// let red = Rgba::new(255, 0, 0, 255,);
    /// let dst = Rgba::new(10, 20, 30, 40,);
    /// assert_eq!(red.over(dst,), red);
    /// assert_eq!(Rgba::new(1, 2, 3, 0,).over(dst,), dst);
    /// ```
    pub fn over(self, dst: Rgba,) -> Rgba
    {
        let source_alpha = self.alpha();
        if source_alpha == 255 {
            return self;
        }
        if source_alpha == 0 {
            return dst;
        }

        let sa = source_alpha as f32 / 255.0;
        let da = dst.alpha() as f32 / 255.0;
        let oa = sa + da * (1.0 - sa);
        if oa == 0.0 {
            return dst;
        }

        let mix = |source: u8, destination: u8| {
            let sc = source as f32 / 255.0;
            let dc = destination as f32 / 255.0;
            to_channel((sc * sa + dc * da * (1.0 - sa)) / oa,)
        };

        Rgba([
            mix(self.0[0], dst.0[0],),
            mix(self.0[1], dst.0[1],),
            mix(self.0[2], dst.0[2],),
            to_channel(oa,),
        ],)
    }
}

fn to_channel(value: f32,) -> u8
{
    (value * 255.0).round().clamp(0.0, 255.0,) as u8
}

/// Owned RGBA8 pixel grid in row-major order.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct Canvas
{
    width:  u32,
    height: u32,
    pixels: Vec<u8,>,
}

impl Canvas
{
    /// Creates a fully transparent canvas.
    pub fn new(width: u32, height: u32,) -> Self
    {
        Self::filled(width, height, Rgba::TRANSPARENT,)
    }

    /// Creates a canvas with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Rgba,) -> Self
    {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 4,);
        for _ in 0..count {
            pixels.extend_from_slice(&color.0,);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wraps raw RGBA8 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] when the buffer length does not match the
    /// dimensions.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8,>,) -> Result<Self, Error,>
    {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::image(format!(
                "expected {expected} bytes for {width}x{height} RGBA, got {}",
                pixels.len()
            ),),);
        }
        Ok(Self {
            width,
            height,
            pixels,
        },)
    }

    /// Width in pixels.
    pub fn width(&self,) -> u32
    {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self,) -> u32
    {
        self.height
    }

    /// Raw RGBA8 bytes.
    pub fn as_rgba(&self,) -> &[u8]
    {
        &self.pixels
    }

    /// Color at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: i64, y: i64,) -> Option<Rgba,>
    {
        let offset = self.offset(x, y,)?;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.pixels[offset..offset + 4],);
        Some(Rgba(color,),)
    }

    /// Overwrites the pixel at `(x, y)`; writes outside the canvas are
    /// ignored.
    pub fn put_pixel(&mut self, x: i64, y: i64, color: Rgba,)
    {
        if let Some(offset,) = self.offset(x, y,) {
            self.pixels[offset..offset + 4].copy_from_slice(&color.0,);
        }
    }

    /// Composites `color` over the pixel at `(x, y)`.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba,)
    {
        if let Some(current,) = self.pixel(x, y,) {
            self.put_pixel(x, y, color.over(current,),);
        }
    }

    fn offset(&self, x: i64, y: i64,) -> Option<usize,>
    {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4,)
    }

    /// Sets every pixel of the half-open rectangle `[x, x+width) × [y,
    /// y+height)` to `color` without blending.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba,)
    {
        let x_start = x.max(0,);
        let y_start = y.max(0,);
        let x_end = (x + width as i64).min(self.width as i64,);
        let y_end = (y + height as i64).min(self.height as i64,);

        for row in y_start..y_end {
            for column in x_start..x_end {
                self.put_pixel(column, row, color,);
            }
        }
    }

    /// Composites `src` onto this canvas with its top-left corner at `(x, y)`.
    pub fn blend(&mut self, src: &Canvas, x: i64, y: i64,)
    {
        for source_y in 0..src.height as i64 {
            let target_y = y + source_y;
            if target_y < 0 || target_y >= self.height as i64 {
                continue;
            }

            for source_x in 0..src.width as i64 {
                let target_x = x + source_x;
                if target_x < 0 || target_x >= self.width as i64 {
                    continue;
                }

                if let Some(color,) = src.pixel(source_x, source_y,) {
                    self.blend_pixel(target_x, target_y, color,);
                }
            }
        }
    }

    /// Scales the canvas to `width × height` with nearest-neighbour sampling.
    pub fn resize_nearest(&self, width: u32, height: u32,) -> Canvas
    {
        let mut resized = Canvas::new(width, height,);
        if self.width == 0 || self.height == 0 {
            return resized;
        }

        for y in 0..height as u64 {
            let source_y = (y * self.height as u64 / height as u64) as i64;
            for x in 0..width as u64 {
                let source_x = (x * self.width as u64 / width as u64) as i64;
                if let Some(color,) = self.pixel(source_x, source_y,) {
                    resized.put_pixel(x as i64, y as i64, color,);
                }
            }
        }

        resized
    }

    /// Decodes a PNG image, expanding palette, grayscale and 16-bit data to
    /// RGBA8.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] when the data is not a decodable PNG.
    pub fn from_png(bytes: &[u8],) -> Result<Self, Error,>
    {
        let mut decoder = png::Decoder::new(Cursor::new(bytes,),);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16,);

        let mut reader =
            decoder.read_info().map_err(|e| Error::image(format!("invalid PNG header: {e}"),),)?;
        let mut buffer = vec![0; reader.output_buffer_size()];
        let info = reader
            .next_frame(&mut buffer,)
            .map_err(|e| Error::image(format!("failed to decode PNG: {e}"),),)?;
        let data = &buffer[..info.buffer_size()];

        let pixels: Vec<u8,> = match info.color_type {
            png::ColorType::Rgba => data.to_vec(),
            png::ColorType::Rgb => {
                data.chunks_exact(3,).flat_map(|px| [px[0], px[1], px[2], 255,],).collect()
            }
            png::ColorType::GrayscaleAlpha => {
                data.chunks_exact(2,).flat_map(|px| [px[0], px[0], px[0], px[1],],).collect()
            }
            png::ColorType::Grayscale => data.iter().flat_map(|&v| [v, v, v, 255,],).collect(),
            png::ColorType::Indexed => {
                return Err(Error::image("palette PNG was not expanded",),);
            }
        };

        Self::from_rgba(info.width, info.height, pixels,)
    }

    /// Encodes the canvas as an 8-bit RGBA PNG.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] when encoding fails.
    pub fn to_png(&self,) -> Result<Vec<u8,>, Error,>
    {
        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, self.width, self.height,);
        encoder.set_color(png::ColorType::Rgba,);
        encoder.set_depth(png::BitDepth::Eight,);

        let mut writer = encoder
            .write_header()
            .map_err(|e| Error::image(format!("failed to write PNG header: {e}"),),)?;
        writer
            .write_image_data(&self.pixels,)
            .map_err(|e| Error::image(format!("failed to encode PNG: {e}"),),)?;
        writer.finish().map_err(|e| Error::image(format!("failed to finish PNG: {e}"),),)?;

        Ok(out,)
    }

    /// Reads and decodes a PNG file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and [`Error::Image`]
    /// when it is not a valid PNG.
    pub fn load(path: &Path,) -> Result<Self, Error,>
    {
        let bytes = fs::read(path,).map_err(|source| error::io_error(path, source,),)?;
        Self::from_png(&bytes,).map_err(|error| match error {
            Error::Image {
                message,
            } => Error::image(format!("{}: {message}", path.display()),),
            other => other,
        },)
    }

    /// Encodes the canvas and writes it to `path`, creating parent
    /// directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on filesystem failures and [`Error::Image`] when
    /// encoding fails.
    pub fn save(&self, path: &Path,) -> Result<(), Error,>
    {
        if let Some(parent,) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent,).map_err(|source| error::io_error(parent, source,),)?;
        }
        let bytes = self.to_png()?;
        fs::write(path, bytes,).map_err(|source| error::io_error(path, source,),)
    }
}
