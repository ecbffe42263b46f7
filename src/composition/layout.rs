//! Page-number dependent geometry.
//!
//! Every number here is derived from the canvas size, so the same rules hold for any portrait
//! resolution. The cover page shows a small centered image in the lower part of the frame with
//! the caption near the top; later pages show a wide banner near the top that pans right to
//! left, with the caption below it.

use crate::config::TextColors;
use crate::foundation::core::{Canvas, Point, Rgba8};

const COVER_IMAGE_WIDTH_FRAC: f64 = 0.5;
const COVER_IMAGE_CENTER_Y_FRAC: f64 = 0.7;
const COVER_CAPTION_TOP_FRAC: f64 = 0.15;

const BODY_IMAGE_WIDTH_FRAC: f64 = 1.4;
const BODY_IMAGE_HEIGHT_FRAC: f64 = 0.5;
const BODY_IMAGE_TOP_FRAC: f64 = 0.1;
const BODY_CAPTION_TOP_FRAC: f64 = 0.65;

const CAPTION_WIDTH_FRAC: f64 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutVariant {
    /// Page 1.
    Cover,
    /// Pages 2 and later.
    Body,
}

impl LayoutVariant {
    /// Total over all page numbers; 0 is treated like the first page.
    pub fn for_page(page_number: u32) -> Self {
        match page_number {
            0 | 1 => LayoutVariant::Cover,
            _ => LayoutVariant::Body,
        }
    }

    pub fn highlight_color(self, colors: &TextColors) -> Rgba8 {
        match self {
            LayoutVariant::Cover => colors.cover_highlight,
            LayoutVariant::Body => colors.highlight,
        }
    }

    /// Only the cover accepts the legacy `=word=` marker.
    pub fn accepts_legacy_marker(self) -> bool {
        self == LayoutVariant::Cover
    }
}

/// Image placement for one variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageGeometry {
    /// Square side the source is scaled to.
    pub side: u32,
    /// Visible height after center crop, when cropped.
    pub crop_height: Option<u32>,
    /// Top-left at page-local time 0.
    pub start: Point,
    /// Top-left at the end of the page; equal to `start` for static images.
    pub end: Point,
}

impl ImageGeometry {
    pub fn visible_height(&self) -> u32 {
        self.crop_height.unwrap_or(self.side)
    }

    pub fn pans(&self) -> bool {
        self.start != self.end
    }
}

/// Caption box: centered horizontally, wrapped at `max_width`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptionGeometry {
    pub top: f64,
    /// Lower bound of the caption region.
    pub bottom: f64,
    pub left: f64,
    pub max_width: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageLayout {
    pub variant: LayoutVariant,
    pub image: ImageGeometry,
    pub caption: CaptionGeometry,
}

impl PageLayout {
    pub fn new(canvas: Canvas, variant: LayoutVariant) -> Self {
        let (w, h) = (canvas.w(), canvas.h());
        let max_width = frac_px(w, CAPTION_WIDTH_FRAC);
        let left = ((w - max_width) / 2.0).floor();

        match variant {
            LayoutVariant::Cover => {
                let side = frac_px(w, COVER_IMAGE_WIDTH_FRAC);
                let pos = Point::new(
                    ((w - side) / 2.0).floor(),
                    (h * COVER_IMAGE_CENTER_Y_FRAC - side / 2.0).floor(),
                );
                Self {
                    variant,
                    image: ImageGeometry {
                        side: side as u32,
                        crop_height: None,
                        start: pos,
                        end: pos,
                    },
                    caption: CaptionGeometry {
                        top: frac_px(h, COVER_CAPTION_TOP_FRAC),
                        bottom: pos.y,
                        left,
                        max_width,
                    },
                }
            }
            LayoutVariant::Body => {
                let side = frac_px(w, BODY_IMAGE_WIDTH_FRAC);
                let crop = frac_px(h, BODY_IMAGE_HEIGHT_FRAC).min(side);
                let y = frac_px(h, BODY_IMAGE_TOP_FRAC);
                Self {
                    variant,
                    image: ImageGeometry {
                        side: side as u32,
                        crop_height: Some(crop as u32),
                        // right edges aligned, then left edges aligned
                        start: Point::new(w - side, y),
                        end: Point::new(0.0, y),
                    },
                    caption: CaptionGeometry {
                        top: frac_px(h, BODY_CAPTION_TOP_FRAC),
                        bottom: h,
                        left,
                        max_width,
                    },
                }
            }
        }
    }

    pub fn for_page(canvas: Canvas, page_number: u32) -> Self {
        Self::new(canvas, LayoutVariant::for_page(page_number))
    }
}

/// Whole pixels covered by `frac` of `total`; the epsilon keeps `1.4 * 1080` at 1512.
fn frac_px(total: f64, frac: f64) -> f64 {
    (total * frac + 1e-9).floor()
}

#[cfg(test)]
#[path = "../../tests/unit/composition/layout.rs"]
mod tests;
