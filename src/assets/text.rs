use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::render::caption::TextMeasure;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// One shaped glyph, positioned relative to the line origin on the baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// Read a font file into memory.
pub fn load_font(path: impl AsRef<Path>) -> SlidecastResult<Arc<Vec<u8>>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
    Ok(Arc::new(bytes))
}

/// Parley layout contexts bound to a single caption font.
///
/// The font is registered once; every layout uses it as the sole font stack entry.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font_bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for TextLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayoutEngine")
            .field("family_name", &self.family_name)
            .field("font_len", &self.font_bytes.len())
            .finish()
    }
}

impl TextLayoutEngine {
    pub fn new(font_bytes: Arc<Vec<u8>>) -> SlidecastResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.as_ref().clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            SlidecastError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SlidecastError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font_bytes,
        })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub fn font_bytes(&self) -> &Arc<Vec<u8>> {
        &self.font_bytes
    }

    /// Shape and lay out `text` on a single unbroken line.
    pub fn layout_plain(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> SlidecastResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SlidecastError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Advance width of `text` at `size_px`.
    pub fn measure(&mut self, text: &str, size_px: f32) -> SlidecastResult<f32> {
        Ok(self
            .layout_plain(text, size_px, TextBrushRgba8::default())?
            .width())
    }

    /// Glyphs of the first line of `text`, with `y` relative to that line's baseline.
    pub fn shape_line(&mut self, text: &str, size_px: f32) -> SlidecastResult<Vec<ShapedGlyph>> {
        let layout = self.layout_plain(text, size_px, TextBrushRgba8::default())?;
        let mut out = Vec::new();
        let Some(line) = layout.lines().next() else {
            return Ok(out);
        };
        let baseline = line.metrics().baseline;
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            out.extend(run.positioned_glyphs().map(|g| ShapedGlyph {
                id: g.id,
                x: g.x,
                y: g.y - baseline,
            }));
        }
        Ok(out)
    }
}

/// [`TextMeasure`] backed by real font shaping.
#[derive(Debug)]
pub struct ParleyMeasure {
    engine: TextLayoutEngine,
    size_px: f32,
}

impl ParleyMeasure {
    pub fn new(engine: TextLayoutEngine, size_px: f32) -> Self {
        Self { engine, size_px }
    }
}

impl TextMeasure for ParleyMeasure {
    fn measure(&mut self, text: &str) -> f32 {
        match self.engine.measure(text, self.size_px) {
            Ok(w) => w,
            Err(e) => {
                tracing::debug!(error = %e, "text measure failed");
                0.0
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
