use std::{ops::Range, path::PathBuf};

use crate::foundation::{
    core::{Canvas, Point, Rect, Rgba8, Size},
    error::{ShortsError, ShortsResult},
    math::{lerp, progress},
};

/// One script page as handed to the compositor.
#[derive(Clone, Debug, PartialEq)]
pub struct PageRecord {
    /// Caption text, may contain `##highlight##` markup.
    pub text: String,
    pub image_path: Option<PathBuf>,
    pub audio_path: Option<PathBuf>,
    /// On-screen seconds, > 0.
    pub duration: f64,
    /// 1-based; selects the layout variant.
    pub page_number: u32,
    pub font_size: f32,
    /// Color of the normal caption run.
    pub base_color: Rgba8,
}

impl PageRecord {
    pub fn new(page_number: u32, text: impl Into<String>, duration: f64) -> ShortsResult<Self> {
        let rec = Self {
            text: text.into(),
            image_path: None,
            audio_path: None,
            duration,
            page_number,
            font_size: 64.0,
            base_color: Rgba8::BLACK,
        };
        rec.validate()?;
        Ok(rec)
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    pub fn with_audio(mut self, path: impl Into<PathBuf>) -> Self {
        self.audio_path = Some(path.into());
        self
    }

    pub fn with_style(mut self, font_size: f32, base_color: Rgba8) -> Self {
        self.font_size = font_size;
        self.base_color = base_color;
        self
    }

    pub fn validate(&self) -> ShortsResult<()> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(ShortsError::validation(format!(
                "page {} duration must be finite and > 0 (got {})",
                self.page_number, self.duration
            )));
        }
        if self.page_number == 0 {
            return Err(ShortsError::validation("page_number is 1-based"));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(ShortsError::validation(format!(
                "page {} font_size must be > 0",
                self.page_number
            )));
        }
        Ok(())
    }
}

/// Horizontal pan evaluated as a pure function of page-local time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanPath {
    pub from: Point,
    pub to: Point,
    /// Seconds over which `from` moves to `to`; the end position holds afterwards.
    pub duration: f64,
}

impl PanPath {
    pub fn at(&self, t: f64) -> Point {
        let p = progress(t, self.duration);
        Point::new(
            lerp(self.from.x, self.to.x, p),
            lerp(self.from.y, self.to.y, p),
        )
    }
}

/// Top-left position of a layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    Fixed(Point),
    Pan(PanPath),
}

impl Placement {
    pub fn position_at(&self, t: f64) -> Point {
        match self {
            Placement::Fixed(p) => *p,
            Placement::Pan(path) => path.at(t),
        }
    }
}

/// Page image drawn at its layout size.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageContent {
    pub path: PathBuf,
    /// Square side the source is scaled to.
    pub scaled_side: u32,
    /// Rows kept around the vertical center after scaling.
    pub crop_height: Option<u32>,
}

/// One caption run laid out over the full marker-stripped caption.
///
/// Both runs of a page share `layout_text`, so they shape to identical glyph positions; only the
/// characters flagged in `painted` are drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    /// Run text with characters of the other run blanked.
    pub text: String,
    pub layout_text: String,
    /// One flag per char of `layout_text`.
    pub painted: Vec<bool>,
    pub highlighted: bool,
    pub color: Rgba8,
    pub font_size: f32,
    pub max_width: f64,
}

impl TextBlock {
    /// Byte ranges of `layout_text` grouped into maximal painted / unpainted spans.
    pub fn brush_spans(&self) -> Vec<(Range<usize>, bool)> {
        let mut spans: Vec<(Range<usize>, bool)> = Vec::new();
        for ((byte, c), &paint) in self.layout_text.char_indices().zip(&self.painted) {
            let end = byte + c.len_utf8();
            match spans.last_mut() {
                Some((range, p)) if *p == paint => range.end = end,
                _ => spans.push((byte..end, paint)),
            }
        }
        spans
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LayerContent {
    Solid(Rgba8),
    Image(ImageContent),
    Text(TextBlock),
}

/// Positioned, time-bounded drawable.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualLayer {
    pub content: LayerContent,
    pub placement: Placement,
    pub size: Size,
    /// Page-local start, seconds.
    pub start: f64,
    pub duration: f64,
    /// Opacity ramps from 0 to 1 over this many seconds after `start`.
    pub fade_in: f64,
}

impl VisualLayer {
    pub fn is_active(&self, t: f64) -> bool {
        t >= self.start && t <= self.start + self.duration
    }

    pub fn bounds_at(&self, t: f64) -> Rect {
        Rect::from_origin_size(self.placement.position_at(t - self.start), self.size)
    }

    pub fn opacity_at(&self, t: f64) -> f32 {
        if self.fade_in <= 0.0 {
            return 1.0;
        }
        progress(t - self.start, self.fade_in) as f32
    }
}

/// Composed visual output for one page. Layers are in paint order (later on top).
#[derive(Clone, Debug, PartialEq)]
pub struct PageClip {
    pub canvas: Canvas,
    pub duration: f64,
    pub page_number: u32,
    pub layers: Vec<VisualLayer>,
}

impl PageClip {
    pub fn new(
        canvas: Canvas,
        duration: f64,
        page_number: u32,
        layers: Vec<VisualLayer>,
    ) -> ShortsResult<Self> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(ShortsError::validation("page clip duration must be > 0"));
        }
        if layers.is_empty() {
            return Err(ShortsError::validation(format!(
                "page {page_number} produced no layers"
            )));
        }
        Ok(Self {
            canvas,
            duration,
            page_number,
            layers,
        })
    }

    pub fn image_layer(&self) -> Option<&VisualLayer> {
        self.layers
            .iter()
            .find(|l| matches!(l.content, LayerContent::Image(_)))
    }

    pub fn text_layers(&self) -> impl Iterator<Item = &TextBlock> {
        self.layers.iter().filter_map(|l| match &l.content {
            LayerContent::Text(t) => Some(t),
            _ => None,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
