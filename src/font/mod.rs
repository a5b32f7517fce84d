//! Font loading and glyph atlas caching
//!
//! Handles:
//! - TTF/OTF font loading (fontdue)
//! - Lazily baked per-block glyph atlases with bounded size retry
//! - Tab/newline zero-width special casing
//! - System font discovery

pub mod atlas;
pub mod glyphset;
pub mod loader;
pub mod raster;

pub use atlas::AtlasImage;
pub use glyphset::{AtlasLimits, GlyphMetrics, GlyphSet, GLYPHS_PER_SET};
pub use loader::{load_system_font, Font, MAX_GLYPHSETS};
pub use raster::{AtlasTooSmall, FontdueRaster, Rasterizer, VerticalMetrics};

use thiserror::Error;

/// Errors that can occur while loading fonts or baking glyphs.
#[derive(Debug, Error)]
pub enum FontError {
    /// The font file could not be read.
    #[error("failed to read font: {0}")]
    Io(#[from] std::io::Error),
    /// The rasterizer rejected the font data.
    #[error("failed to parse font: {0}")]
    Parse(String),
    /// A glyph block did not fit the largest permitted atlas.
    #[error("glyph block {block} overflowed the maximum {max}x{max} atlas")]
    AtlasOverflow { block: usize, max: usize },
}

/// Convenient result alias for font operations.
pub type Result<T> = std::result::Result<T, FontError>;
