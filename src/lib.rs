//! Font loading and glyph atlas caching for text renderers
//!
//! Loads a font file, bakes glyph bitmaps into fixed-size atlas images on
//! demand, and caches each baked atlas for the font's lifetime. Atlases are
//! keyed by 256-codepoint block; a bake that runs out of room retries with a
//! doubled image up to a configurable cap.
//!
//! ```no_run
//! use renfont::Font;
//!
//! fn main() -> renfont::Result<()> {
//!     let mut font = Font::load("/usr/share/fonts/TTF/DejaVuSansMono.ttf", 14.0)?;
//!     let glyph = *font.glyph('A' as u32)?;
//!     println!("advance: {}px, line height: {}px", glyph.advance, font.height());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod font;

pub use config::Config;
pub use font::{
    AtlasImage, AtlasLimits, Font, FontError, GlyphMetrics, GlyphSet, Rasterizer, Result,
    VerticalMetrics,
};
