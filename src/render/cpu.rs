use std::sync::Arc;

use crate::{
    assets::{
        decode::{PreparedImage, load_image, prepare_scaled},
        fonts::CaptionFont,
    },
    composition::model::{ImageContent, LayerContent, PageClip, TextBlock},
    foundation::{
        core::{Canvas, Point},
        error::{ShortsError, ShortsResult},
    },
    render::{
        backend::{FrameRGBA, RenderBackend},
        text::{TextBrushRgba8, TextLayoutEngine},
    },
};

/// Identity of the clip whose resources are cached.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ClipKey {
    page_number: u32,
    duration: f64,
    layers: usize,
}

impl ClipKey {
    fn of(clip: &PageClip) -> Self {
        Self {
            page_number: clip.page_number,
            duration: clip.duration,
            layers: clip.layers.len(),
        }
    }
}

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

#[derive(Clone)]
enum LayerPaint {
    Image(ImagePaint),
    Text(Arc<parley::Layout<TextBrushRgba8>>),
    /// Resource failed to load; the layer is skipped.
    Skipped,
}

struct ClipCache {
    key: ClipKey,
    layers: Vec<Option<LayerPaint>>,
}

/// CPU raster backend powered by `vello_cpu`.
pub struct CpuRenderer {
    canvas: Canvas,
    font: Option<CaptionFont>,
    font_data: Option<vello_cpu::peniko::FontData>,
    text_engine: Option<TextLayoutEngine>,
    ctx: Option<vello_cpu::RenderContext>,
    cache: Option<ClipCache>,
}

impl CpuRenderer {
    /// `font` is only required for pages that carry caption text.
    pub fn new(canvas: Canvas, font: Option<CaptionFont>) -> ShortsResult<Self> {
        canvas.validate()?;
        let font_data = font.as_ref().map(|f| {
            vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(f.bytes.as_ref().clone()),
                f.index,
            )
        });
        Ok(Self {
            canvas,
            font,
            font_data,
            text_engine: None,
            ctx: None,
            cache: None,
        })
    }

    fn layer_paint(
        &mut self,
        clip: &PageClip,
        layer_i: usize,
        content: &LayerContent,
    ) -> ShortsResult<Option<LayerPaint>> {
        let key = ClipKey::of(clip);
        if self.cache.as_ref().is_none_or(|c| c.key != key) {
            self.cache = Some(ClipCache {
                key,
                layers: vec![None; clip.layers.len()],
            });
        }
        if let Some(p) = self
            .cache
            .as_ref()
            .and_then(|c| c.layers.get(layer_i).cloned().flatten())
        {
            return Ok(Some(p));
        }

        let paint = match content {
            LayerContent::Solid(_) => return Ok(None),
            LayerContent::Image(img) => match image_paint_for(img) {
                Ok(p) => LayerPaint::Image(p),
                Err(e) => {
                    tracing::warn!(
                        page = clip.page_number,
                        path = %img.path.display(),
                        "page image failed to decode, drawing without it: {e}"
                    );
                    LayerPaint::Skipped
                }
            },
            LayerContent::Text(block) => LayerPaint::Text(Arc::new(self.text_for(block)?)),
        };

        if let Some(slot) = self
            .cache
            .as_mut()
            .and_then(|c| c.layers.get_mut(layer_i))
        {
            *slot = Some(paint.clone());
        }
        Ok(Some(paint))
    }

    fn text_for(&mut self, block: &TextBlock) -> ShortsResult<parley::Layout<TextBrushRgba8>> {
        if self.text_engine.is_none() {
            let font = self
                .font
                .as_ref()
                .ok_or_else(|| ShortsError::render("caption text needs a font, none available"))?;
            self.text_engine = Some(TextLayoutEngine::new(font)?);
        }
        match self.text_engine.as_mut() {
            Some(engine) => engine.layout_block(block),
            None => Err(ShortsError::render("text layout engine unavailable")),
        }
    }

    fn draw(
        &mut self,
        clip: &PageClip,
        local_t: f64,
        ctx: &mut vello_cpu::RenderContext,
    ) -> ShortsResult<()> {
        for (i, layer) in clip.layers.iter().enumerate() {
            if !layer.is_active(local_t) {
                continue;
            }
            let opacity = layer.opacity_at(local_t);
            if opacity <= 0.0 {
                continue;
            }
            let pos = layer.placement.position_at(local_t - layer.start);
            let paint = self.layer_paint(clip, i, &layer.content)?;

            if opacity < 1.0 {
                ctx.push_opacity_layer(opacity);
            }
            match (&layer.content, paint) {
                (LayerContent::Solid(c), _) => {
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        pos.x,
                        pos.y,
                        pos.x + layer.size.width,
                        pos.y + layer.size.height,
                    ));
                }
                (_, Some(LayerPaint::Image(p))) => {
                    ctx.set_transform(translate(pos));
                    ctx.set_paint(p.paint);
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        0.0,
                        0.0,
                        f64::from(p.w),
                        f64::from(p.h),
                    ));
                }
                (_, Some(LayerPaint::Text(layout))) => {
                    let font = self
                        .font_data
                        .as_ref()
                        .ok_or_else(|| ShortsError::render("caption font data missing"))?;
                    ctx.set_transform(translate(pos));
                    draw_layout(ctx, &layout, font);
                }
                _ => {}
            }
            if opacity < 1.0 {
                ctx.pop_layer();
            }
        }
        Ok(())
    }
}

impl RenderBackend for CpuRenderer {
    fn render_page(&mut self, clip: &PageClip, local_t: f64) -> ShortsResult<FrameRGBA> {
        if clip.canvas != self.canvas {
            return Err(ShortsError::render(format!(
                "clip canvas {}x{} does not match renderer canvas {}x{}",
                clip.canvas.width, clip.canvas.height, self.canvas.width, self.canvas.height
            )));
        }
        let w = self.canvas.width as u16;
        let h = self.canvas.height as u16;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        let drawn = self.draw(clip, local_t, &mut ctx);
        let out = drawn.map(|()| {
            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            ctx.render_to_pixmap(&mut pixmap);
            FrameRGBA {
                width: self.canvas.width,
                height: self.canvas.height,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            }
        });
        self.ctx = Some(ctx);
        out
    }

    fn release_page(&mut self) {
        self.cache = None;
    }
}

fn image_paint_for(img: &ImageContent) -> ShortsResult<ImagePaint> {
    let src = load_image(&img.path)?;
    let prepared = prepare_scaled(&src, img.scaled_side, img.scaled_side, img.crop_height)?;
    let pixmap = pixmap_from_premul(&prepared)?;
    Ok(ImagePaint {
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        w: prepared.width,
        h: prepared.height,
    })
}

fn draw_layout(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrushRgba8>,
    font: &vello_cpu::peniko::FontData,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            if !brush.is_visible() {
                continue;
            }
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

fn translate(p: Point) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::translate((p.x, p.y))
}

fn pixmap_from_premul(img: &PreparedImage) -> ShortsResult<vello_cpu::Pixmap> {
    let w: u16 = img
        .width
        .try_into()
        .map_err(|_| ShortsError::render("pixmap width exceeds u16"))?;
    let h: u16 = img
        .height
        .try_into()
        .map_err(|_| ShortsError::render("pixmap height exceeds u16"))?;
    let bytes = img.rgba8_premul.as_slice();
    if bytes.len()
        != (img.width as usize)
            .saturating_mul(img.height as usize)
            .saturating_mul(4)
    {
        return Err(ShortsError::render("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
