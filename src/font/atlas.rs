//! Atlas pixel buffers
//!
//! A baked glyphset owns one `AtlasImage`. The buffer is allocated at RGBA8
//! size up front; while a bake is in progress the rasterizer writes raw 8-bit
//! coverage into the front of it, and a successful bake widens that data to
//! RGBA8 in place.

use std::fmt;

/// Square pixel buffer holding one glyphset's baked bitmaps.
pub struct AtlasImage {
    width: usize,
    height: usize,
    /// Pixel storage, sized for RGBA8. The first `width * height` bytes act
    /// as the 8-bit coverage target during baking; `expand_rgba()` widens
    /// them to the full buffer.
    pixels: Vec<u8>,
}

impl AtlasImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 8-bit coverage view used as the bake target, row-major.
    pub fn alpha_mut(&mut self) -> &mut [u8] {
        let len = self.width * self.height;
        &mut self.pixels[..len]
    }

    /// RGBA8 pixel data, row-major. Meaningful once the bake has finished
    /// and the buffer was expanded.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Widen the baked coverage bytes to RGBA8 (opaque white tinted by the
    /// coverage value) within the same allocation.
    ///
    /// Must walk from the last pixel to the first: the 4-byte record for
    /// pixel `i` starts at byte `4*i` and would clobber coverage bytes that
    /// a forward walk has not read yet.
    pub(crate) fn expand_rgba(&mut self) {
        let len = self.width * self.height;
        for i in (0..len).rev() {
            let coverage = self.pixels[i];
            self.pixels[i * 4..i * 4 + 4].copy_from_slice(&[255, 255, 255, coverage]);
        }
    }
}

impl fmt::Debug for AtlasImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtlasImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_expand(coverage: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(coverage.len() * 4);
        for &a in coverage {
            out.extend_from_slice(&[255, 255, 255, a]);
        }
        out
    }

    #[test]
    fn test_backward_expansion_matches_forward_pass() {
        for (w, h) in [(1, 1), (3, 5), (7, 7), (16, 4), (128, 128)] {
            let mut image = AtlasImage::new(w, h);
            for (i, p) in image.alpha_mut().iter_mut().enumerate() {
                *p = (i * 37 % 256) as u8;
            }
            let snapshot = image.alpha_mut().to_vec();
            let expected = forward_expand(&snapshot);
            image.expand_rgba();
            assert_eq!(image.pixels(), expected.as_slice(), "{}x{}", w, h);
        }
    }

    #[test]
    fn test_expanded_pixels_are_opaque_white() {
        let mut image = AtlasImage::new(2, 2);
        image.alpha_mut().copy_from_slice(&[0, 1, 127, 255]);
        image.expand_rgba();
        #[rustfmt::skip]
        assert_eq!(
            image.pixels(),
            &[255, 255, 255, 0,
              255, 255, 255, 1,
              255, 255, 255, 127,
              255, 255, 255, 255]
        );
    }

    #[test]
    fn test_new_image_is_transparent() {
        let image = AtlasImage::new(4, 3);
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 3);
        assert!(image.pixels().iter().all(|&p| p == 0));
    }
}
