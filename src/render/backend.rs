use crate::composition::model::PageClip;
use crate::foundation::error::ShortsResult;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha** by default. The `premultiplied` flag is included to make
/// this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Premultiplied RGBA of the pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data
            .get(i..i + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }
}

/// Draws one page clip at a page-local time.
///
/// Backends may cache per-clip resources (decoded images, shaped captions) between calls for the
/// same clip; [`RenderBackend::release_page`] drops them.
pub trait RenderBackend {
    fn render_page(&mut self, clip: &PageClip, local_t: f64) -> ShortsResult<FrameRGBA>;

    /// Drop resources cached for the current clip.
    fn release_page(&mut self) {}
}
