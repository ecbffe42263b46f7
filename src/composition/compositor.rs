use crate::{
    composition::{
        layout::PageLayout,
        model::{
            ImageContent, LayerContent, PageClip, PageRecord, PanPath, Placement, TextBlock,
            VisualLayer,
        },
    },
    config::TextColors,
    foundation::{
        core::{Canvas, Point, Rgba8, Size},
        error::ShortsResult,
    },
    text::markup::{MarkupScan, strip_legacy_markers},
};

/// Turns a [`PageRecord`] into a layered [`PageClip`].
///
/// Layers are emitted in paint order: full-canvas background, page image (when readable), then
/// the normal caption run and the highlighted run (when it has visible text).
#[derive(Clone, Debug)]
pub struct PageCompositor {
    canvas: Canvas,
    colors: TextColors,
    background: Rgba8,
    caption_fade_in: f64,
}

impl PageCompositor {
    pub fn new(canvas: Canvas, colors: TextColors) -> Self {
        Self {
            canvas,
            colors,
            background: Rgba8::WHITE,
            caption_fade_in: 0.0,
        }
    }

    pub fn with_background(mut self, color: Rgba8) -> Self {
        self.background = color;
        self
    }

    /// Caption fade-in seconds; capped per page at a third of its duration.
    pub fn with_caption_fade_in(mut self, secs: f64) -> Self {
        self.caption_fade_in = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
        self
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    #[tracing::instrument(skip(self, record), fields(page = record.page_number))]
    pub fn compose(&self, record: &PageRecord) -> ShortsResult<PageClip> {
        record.validate()?;
        let layout = PageLayout::for_page(self.canvas, record.page_number);
        let duration = record.duration;

        let mut layers = vec![VisualLayer {
            content: LayerContent::Solid(self.background),
            placement: Placement::Fixed(Point::ORIGIN),
            size: self.canvas.size(),
            start: 0.0,
            duration,
            fade_in: 0.0,
        }];

        if let Some(layer) = self.image_layer(record, &layout) {
            layers.push(layer);
        }
        layers.extend(self.caption_layers(record, &layout));

        tracing::debug!(
            variant = ?layout.variant,
            layers = layers.len(),
            duration,
            "composed page"
        );
        PageClip::new(self.canvas, duration, record.page_number, layers)
    }

    fn image_layer(&self, record: &PageRecord, layout: &PageLayout) -> Option<VisualLayer> {
        let path = record.image_path.as_ref()?;
        let geom = layout.image;
        if geom.side == 0 {
            return None;
        }
        // Header-only probe; pixels are decoded by the renderer when the page is drawn.
        if let Err(e) = image::image_dimensions(path) {
            tracing::warn!(
                page = record.page_number,
                path = %path.display(),
                "page image unreadable, composing without it: {e}"
            );
            return None;
        }

        let placement = if geom.pans() {
            Placement::Pan(PanPath {
                from: geom.start,
                to: geom.end,
                duration: record.duration,
            })
        } else {
            Placement::Fixed(geom.start)
        };

        Some(VisualLayer {
            content: LayerContent::Image(ImageContent {
                path: path.clone(),
                scaled_side: geom.side,
                crop_height: geom.crop_height,
            }),
            placement,
            size: Size::new(f64::from(geom.side), f64::from(geom.visible_height())),
            start: 0.0,
            duration: record.duration,
            fade_in: 0.0,
        })
    }

    fn caption_layers(&self, record: &PageRecord, layout: &PageLayout) -> Vec<VisualLayer> {
        let source = if layout.variant.accepts_legacy_marker() {
            strip_legacy_markers(&record.text)
        } else {
            record.text.clone()
        };
        let scan = MarkupScan::scan(&source);
        let layout_text = scan.text();
        if layout_text.trim().is_empty() {
            return Vec::new();
        }

        let caption = layout.caption;
        let size = Size::new(caption.max_width, (caption.bottom - caption.top).max(0.0));
        let placement = Placement::Fixed(Point::new(caption.left, caption.top));
        let fade_in = self.caption_fade_in.min(record.duration / 3.0);
        let highlight = layout.variant.highlight_color(&self.colors);

        scan.runs(record.base_color, highlight)
            .into_iter()
            .map(|run| {
                let painted = scan.mask().iter().map(|&h| h == run.highlighted).collect();
                VisualLayer {
                    content: LayerContent::Text(TextBlock {
                        text: run.text,
                        layout_text: layout_text.clone(),
                        painted,
                        highlighted: run.highlighted,
                        color: run.color,
                        font_size: record.font_size,
                        max_width: caption.max_width,
                    }),
                    placement,
                    size,
                    start: 0.0,
                    duration: record.duration,
                    fade_in,
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/compositor.rs"]
mod tests;
