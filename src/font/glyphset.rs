//! Glyphset baking
//!
//! A glyphset covers one contiguous 256-codepoint block: a single atlas
//! image plus one metric record per codepoint. Sets bake lazily on first
//! access and stay cached for the font's lifetime.

use std::fmt;

use log::{debug, warn};

use crate::font::atlas::AtlasImage;
use crate::font::raster::Rasterizer;
use crate::font::{FontError, Result};

/// Codepoints covered by one glyphset.
pub const GLYPHS_PER_SET: usize = 256;

/// Bounds for the atlas doubling loop.
#[derive(Debug, Clone, Copy)]
pub struct AtlasLimits {
    /// Dimension of the first bake attempt (square).
    pub initial_dim: usize,
    /// Largest dimension tried before the bake fails with
    /// [`FontError::AtlasOverflow`].
    pub max_dim: usize,
}

impl Default for AtlasLimits {
    fn default() -> Self {
        Self {
            initial_dim: 128,
            max_dim: 4096,
        }
    }
}

/// Placement and layout metrics for one baked glyph.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlyphMetrics {
    /// Left edge of the bitmap in the atlas.
    pub x: u16,
    /// Top edge of the bitmap in the atlas.
    pub y: u16,
    /// Bitmap width; zero for invisible glyphs.
    pub width: u16,
    /// Bitmap height.
    pub height: u16,
    /// Horizontal bearing from the pen position to the bitmap's left edge.
    pub x_offset: f32,
    /// Vertical offset from the line top to the bitmap's top edge.
    pub y_offset: f32,
    /// Horizontal advance to the next character, a whole number of pixels
    /// after baking.
    pub advance: f32,
}

/// One 256-codepoint block's baked atlas and metrics.
pub struct GlyphSet {
    image: AtlasImage,
    glyphs: Box<[GlyphMetrics; GLYPHS_PER_SET]>,
}

impl GlyphSet {
    /// Bake the glyphs for `block` at the font's size, growing the atlas
    /// until everything fits or `limits.max_dim` is passed.
    pub(crate) fn bake(
        raster: &dyn Rasterizer,
        size: f32,
        block: usize,
        limits: AtlasLimits,
    ) -> Result<Self> {
        let first_codepoint = (block * GLYPHS_PER_SET) as u32;
        // Reconcile the rasterizer's two scaling conventions: bake_block
        // takes a pixel-height size while the font size maps an em to `size`
        // pixels.
        let pixel_size =
            size * raster.scale_for_em_pixels(1.0) / raster.scale_for_pixel_height(1.0);

        let mut glyphs = Box::new([GlyphMetrics::default(); GLYPHS_PER_SET]);
        let mut dim = limits.initial_dim;
        let mut image = loop {
            let mut image = AtlasImage::new(dim, dim);
            match raster.bake_block(first_codepoint, pixel_size, &mut image, &mut glyphs[..]) {
                Ok(()) => break image,
                Err(_) if dim * 2 > limits.max_dim => {
                    warn!(
                        "glyph block {} does not fit the maximum {}x{} atlas",
                        block, limits.max_dim, limits.max_dim
                    );
                    return Err(FontError::AtlasOverflow {
                        block,
                        max: limits.max_dim,
                    });
                }
                Err(_) => {
                    debug!(
                        "atlas {}x{} too small for block {}, retrying at {}x{}",
                        dim,
                        dim,
                        block,
                        dim * 2,
                        dim * 2
                    );
                    dim *= 2;
                }
            }
        };

        // Rebase baseline-relative y offsets to the line top and snap
        // advances to whole pixels for grid-friendly layout.
        let vm = raster.vertical_metrics();
        let scaled_ascent = (vm.ascent * raster.scale_for_em_pixels(size) + 0.5).floor();
        for g in glyphs.iter_mut() {
            g.y_offset += scaled_ascent;
            g.advance = g.advance.floor();
        }

        image.expand_rgba();
        Ok(Self { image, glyphs })
    }

    pub fn image(&self) -> &AtlasImage {
        &self.image
    }

    /// Metric record for a codepoint within this set's block.
    pub fn glyph(&self, codepoint: u32) -> &GlyphMetrics {
        &self.glyphs[(codepoint & 0xff) as usize]
    }

    pub(crate) fn glyph_mut(&mut self, codepoint: u32) -> &mut GlyphMetrics {
        &mut self.glyphs[(codepoint & 0xff) as usize]
    }

    /// All 256 metric records, indexed by the codepoint's low byte.
    pub fn glyphs(&self) -> &[GlyphMetrics] {
        &self.glyphs[..]
    }
}

impl fmt::Debug for GlyphSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphSet")
            .field("image", &self.image)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::raster::{AtlasTooSmall, VerticalMetrics};
    use std::cell::RefCell;

    /// Rasterizer that refuses any atlas smaller than `min_dim` and records
    /// every bake attempt.
    struct StubRaster {
        min_dim: usize,
        attempts: RefCell<Vec<usize>>,
        pixel_sizes: RefCell<Vec<f32>>,
    }

    impl StubRaster {
        fn new(min_dim: usize) -> Self {
            Self {
                min_dim,
                attempts: RefCell::new(Vec::new()),
                pixel_sizes: RefCell::new(Vec::new()),
            }
        }
    }

    impl Rasterizer for StubRaster {
        fn vertical_metrics(&self) -> VerticalMetrics {
            VerticalMetrics {
                ascent: 1600.0,
                descent: -400.0,
                line_gap: 80.0,
            }
        }

        fn scale_for_em_pixels(&self, size: f32) -> f32 {
            size / 2048.0
        }

        fn scale_for_pixel_height(&self, size: f32) -> f32 {
            size / 2000.0
        }

        fn bake_block(
            &self,
            _first_codepoint: u32,
            pixel_size: f32,
            image: &mut AtlasImage,
            glyphs: &mut [GlyphMetrics],
        ) -> std::result::Result<(), AtlasTooSmall> {
            self.attempts.borrow_mut().push(image.width());
            self.pixel_sizes.borrow_mut().push(pixel_size);
            if image.width() < self.min_dim {
                return Err(AtlasTooSmall);
            }
            for (i, g) in glyphs.iter_mut().enumerate() {
                *g = GlyphMetrics {
                    x: 0,
                    y: 0,
                    width: 1,
                    height: 1,
                    x_offset: 0.0,
                    y_offset: -10.0,
                    advance: 7.25 + i as f32,
                };
            }
            image.alpha_mut()[0] = 128;
            Ok(())
        }
    }

    #[test]
    fn test_bake_doubles_until_the_atlas_fits() {
        let raster = StubRaster::new(512);
        let set = GlyphSet::bake(&raster, 14.0, 0, AtlasLimits::default()).unwrap();
        assert_eq!(*raster.attempts.borrow(), vec![128, 256, 512]);
        assert_eq!(set.image().width(), 512);
        assert_eq!(set.image().height(), 512);
    }

    #[test]
    fn test_bake_fails_past_the_maximum_dimension() {
        let raster = StubRaster::new(usize::MAX);
        let limits = AtlasLimits {
            initial_dim: 128,
            max_dim: 512,
        };
        let err = GlyphSet::bake(&raster, 14.0, 3, limits).unwrap_err();
        match err {
            FontError::AtlasOverflow { block, max } => {
                assert_eq!(block, 3);
                assert_eq!(max, 512);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Every permitted dimension was tried before giving up.
        assert_eq!(*raster.attempts.borrow(), vec![128, 256, 512]);
    }

    #[test]
    fn test_bake_applies_the_em_scale_correction() {
        let raster = StubRaster::new(128);
        GlyphSet::bake(&raster, 14.0, 0, AtlasLimits::default()).unwrap();
        // 14 * (1/2048) / (1/2000)
        let pixel_size = raster.pixel_sizes.borrow()[0];
        assert!((pixel_size - 13.671875).abs() < 1e-4);
    }

    #[test]
    fn test_offsets_are_rebased_to_the_line_top() {
        let raster = StubRaster::new(128);
        let set = GlyphSet::bake(&raster, 14.0, 0, AtlasLimits::default()).unwrap();
        // scaled ascent = floor(1600 * 14/2048 + 0.5) = 11
        assert_eq!(set.glyph('A' as u32).y_offset, 1.0);
    }

    #[test]
    fn test_advances_bake_to_whole_pixels() {
        let raster = StubRaster::new(128);
        let set = GlyphSet::bake(&raster, 14.0, 0, AtlasLimits::default()).unwrap();
        for g in set.glyphs() {
            assert_eq!(g.advance.fract(), 0.0);
        }
        assert_eq!(set.glyph(0).advance, 7.0);
    }
}
