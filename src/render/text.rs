use std::borrow::Cow;

use crate::assets::fonts::CaptionFont;
use crate::composition::model::TextBlock;
use crate::foundation::error::{ShortsError, ShortsResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout. Alpha 0 marks glyphs that are shaped but not
/// painted.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl TextBrushRgba8 {
    pub(crate) const HIDDEN: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub(crate) fn is_visible(self) -> bool {
        self.a > 0
    }
}

/// Parley contexts with the caption font registered once.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
}

impl TextLayoutEngine {
    pub(crate) fn new(font: &CaptionFont) -> ShortsResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.as_ref().clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| ShortsError::render("no font families registered from font bytes"))?;

        let family_name = match &font.family {
            Some(name) => name.clone(),
            None => font_ctx
                .collection
                .family_name(family_id)
                .ok_or_else(|| ShortsError::render("registered font family has no name"))?
                .to_string(),
        };

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    /// Shape the block's full `layout_text`, painting only the characters of this run.
    ///
    /// Lines wrap at `max_width` and are centered within it.
    pub(crate) fn layout_block(
        &mut self,
        block: &TextBlock,
    ) -> ShortsResult<parley::Layout<TextBrushRgba8>> {
        if !block.font_size.is_finite() || block.font_size <= 0.0 {
            return Err(ShortsError::validation(
                "caption font size must be finite and > 0",
            ));
        }
        let text = block.layout_text.as_str();
        let c = block.color;
        let paint = TextBrushRgba8 {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(block.font_size));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8::HIDDEN));
        for (range, painted) in block.brush_spans() {
            if painted {
                builder.push(parley::style::StyleProperty::Brush(paint), range);
            }
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        let w = block.max_width as f32;
        layout.break_all_lines(Some(w));
        layout.align(
            Some(w),
            parley::Alignment::Center,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }
}
