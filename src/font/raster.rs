//! Rasterizer abstraction
//!
//! Font parsing and outline rasterization are delegated to an external
//! library behind the `Rasterizer` trait. `FontdueRaster` is the production
//! implementation; callers with their own backend can plug one in through
//! `Font::from_rasterizer`.

use fontdue::{Font, FontSettings};

use crate::font::atlas::AtlasImage;
use crate::font::glyphset::GlyphMetrics;
use crate::font::FontError;

/// Font-wide vertical metrics in font units.
#[derive(Debug, Clone, Copy)]
pub struct VerticalMetrics {
    /// Distance from the baseline to the top of the tallest glyph (positive).
    pub ascent: f32,
    /// Distance from the baseline to the lowest descender (typically
    /// negative).
    pub descent: f32,
    /// Extra distance between consecutive lines.
    pub line_gap: f32,
}

/// Returned by [`Rasterizer::bake_block`] when the atlas cannot hold every
/// glyph of the block. The caller retries with a larger image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasTooSmall;

pub trait Rasterizer {
    /// Unscaled vertical metrics in font units.
    fn vertical_metrics(&self) -> VerticalMetrics;

    /// Scale factor that maps one em to `size` pixels.
    fn scale_for_em_pixels(&self, size: f32) -> f32;

    /// Scale factor that fits the ascent-to-descent span into `size` pixels.
    fn scale_for_pixel_height(&self, size: f32) -> f32;

    /// Bake the glyphs for codepoints `[first_codepoint, first_codepoint +
    /// glyphs.len())` into the image's coverage buffer at `pixel_size`
    /// (pixel-height convention), writing one metric record per codepoint.
    ///
    /// Vertical offsets in the emitted records are baseline-relative; the
    /// caller rebases them to its own coordinate convention.
    fn bake_block(
        &self,
        first_codepoint: u32,
        pixel_size: f32,
        image: &mut AtlasImage,
        glyphs: &mut [GlyphMetrics],
    ) -> Result<(), AtlasTooSmall>;
}

/// fontdue-backed rasterizer. Parses its own copy of the font data, so the
/// raw byte buffer it was built from carries no lifetime obligation.
pub struct FontdueRaster {
    font: Font,
    units_per_em: f32,
    metrics: VerticalMetrics,
}

impl FontdueRaster {
    pub fn new(data: &[u8]) -> Result<Self, FontError> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| FontError::Parse(e.to_string()))?;
        let units_per_em = font.units_per_em();
        // Line metrics queried at em size come back in font units.
        let lm = font
            .horizontal_line_metrics(units_per_em)
            .ok_or_else(|| FontError::Parse("font has no horizontal line metrics".into()))?;
        Ok(Self {
            font,
            units_per_em,
            metrics: VerticalMetrics {
                ascent: lm.ascent,
                descent: lm.descent,
                line_gap: lm.line_gap,
            },
        })
    }
}

impl Rasterizer for FontdueRaster {
    fn vertical_metrics(&self) -> VerticalMetrics {
        self.metrics
    }

    fn scale_for_em_pixels(&self, size: f32) -> f32 {
        size / self.units_per_em
    }

    fn scale_for_pixel_height(&self, size: f32) -> f32 {
        size / (self.metrics.ascent - self.metrics.descent)
    }

    fn bake_block(
        &self,
        first_codepoint: u32,
        pixel_size: f32,
        image: &mut AtlasImage,
        glyphs: &mut [GlyphMetrics],
    ) -> Result<(), AtlasTooSmall> {
        let width = image.width();
        let height = image.height();
        // fontdue sizes are pixels per em; convert from the pixel-height
        // convention bake_block is specified in.
        let em_px = pixel_size * self.units_per_em / (self.metrics.ascent - self.metrics.descent);

        // Shelf packing with a 1px gutter against sampling bleed.
        let pad = 1usize;
        let mut cursor_x = pad;
        let mut cursor_y = pad;
        let mut row_height = 0usize;

        image.alpha_mut().fill(0);
        for (i, slot) in glyphs.iter_mut().enumerate() {
            *slot = GlyphMetrics::default();
            // Leaves the surrogate range as empty records.
            let Some(ch) = char::from_u32(first_codepoint + i as u32) else {
                continue;
            };
            let (m, bitmap) = self.font.rasterize(ch, em_px);
            let (bw, bh) = (m.width, m.height);

            // Move to the next row when the current one is out of room.
            if cursor_x + bw + pad > width {
                cursor_y += row_height + pad;
                cursor_x = pad;
                row_height = 0;
            }
            if cursor_x + bw + pad > width || cursor_y + bh + pad > height {
                return Err(AtlasTooSmall);
            }

            let coverage = image.alpha_mut();
            for row in 0..bh {
                let src = row * bw;
                let dst = (cursor_y + row) * width + cursor_x;
                coverage[dst..dst + bw].copy_from_slice(&bitmap[src..src + bw]);
            }

            *slot = GlyphMetrics {
                x: cursor_x as u16,
                y: cursor_y as u16,
                width: bw as u16,
                height: bh as u16,
                x_offset: m.xmin as f32,
                // fontdue's ymin is the bitmap bottom relative to the
                // baseline (y-up); emit the top edge in y-down coordinates.
                y_offset: -(m.ymin as f32 + bh as f32),
                advance: m.advance_width,
            };

            cursor_x += bw + pad;
            row_height = row_height.max(bh);
        }
        Ok(())
    }
}
