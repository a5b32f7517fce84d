//! Font loading
//!
//! Reads a font file into memory, initializes the rasterizer against it, and
//! serves lazily baked glyphsets. Tab and newline are forced to render as
//! zero-width whitespace regardless of what the font file defines for them.

use std::fmt;
use std::path::Path;

use log::{debug, info, warn};

use crate::config::Config;
use crate::font::glyphset::{AtlasLimits, GlyphMetrics, GlyphSet};
use crate::font::raster::{FontdueRaster, Rasterizer};
use crate::font::{FontError, Result};

/// Number of glyphset slots. Codepoint blocks map onto slots modulo this
/// count.
pub const MAX_GLYPHSETS: usize = 256;

/// A loaded font plus its lazily populated glyphset table.
pub struct Font {
    /// Raw font file bytes, kept for the font's lifetime so shapers and
    /// other consumers can borrow the same data the rasterizer was built
    /// from.
    data: Vec<u8>,
    raster: Box<dyn Rasterizer>,
    size: f32,
    /// Line height in pixels.
    height: u32,
    limits: AtlasLimits,
    sets: [Option<Box<GlyphSet>>; MAX_GLYPHSETS],
}

impl Font {
    /// Load a font file at the given pixel size.
    pub fn load(path: impl AsRef<Path>, size: f32) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        debug!("read font file {} ({} bytes)", path.display(), data.len());
        Self::from_bytes(data, size)
    }

    /// Load a font from an in-memory buffer, taking ownership of it.
    pub fn from_bytes(data: Vec<u8>, size: f32) -> Result<Self> {
        let raster = FontdueRaster::new(&data)?;
        Self::new(data, Box::new(raster), size, AtlasLimits::default())
    }

    /// Build a font on a caller-provided rasterizer backend.
    pub fn from_rasterizer(
        raster: Box<dyn Rasterizer>,
        size: f32,
        limits: AtlasLimits,
    ) -> Result<Self> {
        Self::new(Vec::new(), raster, size, limits)
    }

    /// Load the font described by a [`Config`]. An empty font path falls
    /// back to system font discovery.
    pub fn from_config(config: &Config) -> Result<Self> {
        let data = if config.font.path.is_empty() {
            load_system_font()?
        } else {
            std::fs::read(&config.font.path)?
        };
        let raster = FontdueRaster::new(&data)?;
        let mut font = Self::new(data, Box::new(raster), config.font.size, config.atlas.limits())?;
        if config.font.tab_width > 0 {
            font.set_tab_width(config.font.tab_width)?;
        }
        Ok(font)
    }

    fn new(
        data: Vec<u8>,
        raster: Box<dyn Rasterizer>,
        size: f32,
        limits: AtlasLimits,
    ) -> Result<Self> {
        let vm = raster.vertical_metrics();
        let scale = raster.scale_for_em_pixels(size);
        let height = (scale * (vm.ascent - vm.descent + vm.line_gap)).round() as u32;

        let mut font = Self {
            data,
            raster,
            size,
            height,
            limits,
            sets: std::array::from_fn(|_| None),
        };

        // Tab and newline render as zero-width whitespace no matter what the
        // font file bakes for them.
        let set = font.glyphset_mut('\n' as u32)?;
        for cp in ['\t' as u32, '\n' as u32] {
            let g = set.glyph_mut(cp);
            g.width = 0;
            g.advance = 0.0;
        }

        info!("font loaded: size {:.1}px, line height {}px", size, height);
        Ok(font)
    }

    /// Font size in pixels, as requested at load time.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Line height in pixels: `round(scale * (ascent - descent + line_gap))`.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw bytes of the loaded font file. Empty for fonts built directly on
    /// a caller-provided rasterizer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The glyphset covering a codepoint's 256-entry block, baked on first
    /// access and cached for the font's lifetime.
    pub fn glyphset(&mut self, codepoint: u32) -> Result<&GlyphSet> {
        Ok(self.glyphset_mut(codepoint)?)
    }

    fn glyphset_mut(&mut self, codepoint: u32) -> Result<&mut GlyphSet> {
        // Supplementary-plane blocks wrap onto the fixed table and share
        // slots with the BMP block at the same index.
        let idx = ((codepoint >> 8) as usize) % MAX_GLYPHSETS;
        if self.sets[idx].is_none() {
            debug!("baking glyphset block {}", idx);
            let set = GlyphSet::bake(self.raster.as_ref(), self.size, idx, self.limits)?;
            self.sets[idx] = Some(Box::new(set));
        }
        Ok(self.sets[idx]
            .as_deref_mut()
            .expect("glyphset slot populated on first access"))
    }

    /// Metric record for a codepoint, baking its block if needed.
    pub fn glyph(&mut self, codepoint: u32) -> Result<&GlyphMetrics> {
        Ok(self.glyphset_mut(codepoint)?.glyph(codepoint))
    }

    /// Width of `text` in pixels: the sum of its codepoints' advances.
    pub fn measure(&mut self, text: &str) -> Result<u32> {
        let mut width = 0.0;
        for ch in text.chars() {
            width += self.glyph(ch as u32)?.advance;
        }
        Ok(width as u32)
    }

    /// Override the tab advance, in pixels. Tabs bake as invisible; this is
    /// how a renderer gives them width.
    pub fn set_tab_width(&mut self, width: u32) -> Result<()> {
        let set = self.glyphset_mut('\t' as u32)?;
        set.glyph_mut('\t' as u32).advance = width as f32;
        Ok(())
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("size", &self.size)
            .field("height", &self.height)
            .field("data_len", &self.data.len())
            .finish_non_exhaustive()
    }
}

/// Search and load a system monospace font.
///
/// Search order:
/// 1. RENFONT_FONT environment variable
/// 2. Known paths (hardcoded)
pub fn load_system_font() -> Result<Vec<u8>> {
    // Custom font can be specified via RENFONT_FONT environment variable
    if let Ok(path) = std::env::var("RENFONT_FONT") {
        let data = std::fs::read(&path)?;
        info!("font loaded: {} (RENFONT_FONT)", path);
        return Ok(data);
    }

    let candidates = [
        // Linux
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
        "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
        "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
        "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
        // macOS (development/testing)
        "/System/Library/Fonts/Monaco.ttf",
        "/Library/Fonts/Courier New.ttf",
    ];

    for path in &candidates {
        if let Ok(data) = std::fs::read(path) {
            info!("font loaded: {}", path);
            return Ok(data);
        }
    }

    warn!("no system font found in known locations");
    Err(FontError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "no system font found",
    )))
}
