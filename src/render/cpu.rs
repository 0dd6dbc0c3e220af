use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::image::ImageSet;
use crate::assets::text::{ShapedGlyph, TextLayoutEngine};
use crate::foundation::core::{Rect, Rgba8Premul};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::foundation::math::lerp_u8;
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::frame::{DrawOp, FramePlan};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ImageKey {
    scene: usize,
    pixels: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    top: [u8; 4],
    bottom: [u8; 4],
    w: u32,
    h: u32,
    ramp_row: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct GlyphKey {
    text: String,
    size_bits: u32,
}

struct CaptionFont {
    engine: TextLayoutEngine,
    font: vello_cpu::peniko::FontData,
}

/// CPU raster backend powered by `vello_cpu`.
///
/// Captions are drawn as glyph runs only when a font is configured; otherwise they are skipped.
pub struct CpuBackend {
    ctx: Option<vello_cpu::RenderContext>,
    image_cache: HashMap<ImageKey, vello_cpu::Image>,
    gradient_cache: HashMap<GradientKey, vello_cpu::Image>,
    glyph_cache: HashMap<GlyphKey, Arc<Vec<ShapedGlyph>>>,
    font: Option<CaptionFont>,
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            ctx: None,
            image_cache: HashMap::new(),
            gradient_cache: HashMap::new(),
            glyph_cache: HashMap::new(),
            font: None,
        }
    }

    /// Enable caption glyph rendering with the given font bytes.
    pub fn with_font(mut self, font_bytes: Arc<Vec<u8>>) -> SlidecastResult<Self> {
        let engine = TextLayoutEngine::new(font_bytes.clone())?;
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
            0,
        );
        self.font = Some(CaptionFont { engine, font });
        self.glyph_cache.clear();
        Ok(self)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> SlidecastResult<R>,
    ) -> SlidecastResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn image_paint_for(
        &mut self,
        images: &ImageSet,
        scene: usize,
    ) -> SlidecastResult<Option<(vello_cpu::Image, u32, u32)>> {
        let Some(handle) = images.get(scene) else {
            return Ok(None);
        };
        let (w, h) = (handle.natural_width, handle.natural_height);
        let key = ImageKey {
            scene,
            pixels: Arc::as_ptr(&handle.rgba8_premul) as usize,
        };
        if let Some(img) = self.image_cache.get(&key).cloned() {
            return Ok(Some((img, w, h)));
        }
        let img = rgba_premul_to_image(&handle.rgba8_premul, w, h)?;
        self.image_cache.insert(key, img.clone());
        Ok(Some((img, w, h)))
    }

    fn gradient_paint(
        &mut self,
        rect: Rect,
        ramp_start_y: f64,
        top: Rgba8Premul,
        bottom: Rgba8Premul,
    ) -> SlidecastResult<vello_cpu::Image> {
        let w = rect.width().round().max(1.0) as u32;
        let h = rect.height().round().max(1.0) as u32;
        let ramp_row = (ramp_start_y - rect.y0).round().clamp(0.0, f64::from(h)) as u32;
        let key = GradientKey {
            top: top.to_array(),
            bottom: bottom.to_array(),
            w,
            h,
            ramp_row,
        };
        if let Some(img) = self.gradient_cache.get(&key).cloned() {
            return Ok(img);
        }

        let span = h.saturating_sub(ramp_row).saturating_sub(1);
        let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
        for y in 0..h {
            let t = if y < ramp_row {
                0.0
            } else if span == 0 {
                1.0
            } else {
                f64::from(y - ramp_row) / f64::from(span)
            };
            let c = [
                lerp_u8(top.r, bottom.r, t),
                lerp_u8(top.g, bottom.g, t),
                lerp_u8(top.b, bottom.b, t),
                lerp_u8(top.a, bottom.a, t),
            ];
            let row = (y as usize) * (w as usize) * 4;
            for px in bytes[row..row + (w as usize) * 4].chunks_exact_mut(4) {
                px.copy_from_slice(&c);
            }
        }
        let img = rgba_premul_to_image(&bytes, w, h)?;
        self.gradient_cache.insert(key, img.clone());
        Ok(img)
    }

    fn glyphs_for(&mut self, text: &str, size_px: f32) -> Option<Arc<Vec<ShapedGlyph>>> {
        let key = GlyphKey {
            text: text.to_string(),
            size_bits: size_px.to_bits(),
        };
        if let Some(g) = self.glyph_cache.get(&key) {
            return Some(g.clone());
        }
        let font = self.font.as_mut()?;
        match font.engine.shape_line(text, size_px) {
            Ok(glyphs) => {
                let glyphs = Arc::new(glyphs);
                self.glyph_cache.insert(key, glyphs.clone());
                Some(glyphs)
            }
            Err(e) => {
                tracing::debug!(error = %e, "caption shaping failed");
                None
            }
        }
    }

    fn draw_op(
        &mut self,
        op: &DrawOp,
        images: &ImageSet,
        canvas_rect: Rect,
        ctx: &mut vello_cpu::RenderContext,
    ) -> SlidecastResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match op {
            DrawOp::Clear(c) => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(solid(*c));
                ctx.fill_rect(&rect_to_cpu(canvas_rect));
            }
            DrawOp::Image { scene, rect } => {
                let Some((img, w, h)) = self.image_paint_for(images, *scene)? else {
                    return Ok(());
                };
                let sx = rect.width() / f64::from(w);
                let sy = rect.height() / f64::from(h);
                ctx.set_transform(
                    vello_cpu::kurbo::Affine::translate((rect.x0, rect.y0))
                        * vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy),
                );
                ctx.set_paint(img);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(w),
                    f64::from(h),
                ));
            }
            DrawOp::Gradient {
                rect,
                ramp_start_y,
                top,
                bottom,
            } => {
                let img = self.gradient_paint(*rect, *ramp_start_y, *top, *bottom)?;
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((rect.x0, rect.y0)));
                ctx.set_paint(img);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    rect.width(),
                    rect.height(),
                ));
            }
            DrawOp::Caption {
                line,
                size_px,
                color,
            } => {
                let Some(glyphs) = self.glyphs_for(&line.text, *size_px) else {
                    return Ok(());
                };
                let Some(font) = self.font.as_ref() else {
                    return Ok(());
                };
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((line.x, line.baseline_y)));
                ctx.set_paint(solid(*color));
                ctx.glyph_run(&font.font)
                    .font_size(*size_px)
                    .fill_glyphs(glyphs.iter().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    }));
            }
            DrawOp::FillRect { rect, color } => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(solid(*color));
                ctx.fill_rect(&rect_to_cpu(*rect));
            }
        }
        Ok(())
    }
}

impl RenderBackend for CpuBackend {
    fn render_plan(&mut self, plan: &FramePlan, images: &ImageSet) -> SlidecastResult<FrameRGBA> {
        let width: u16 = plan
            .canvas
            .width
            .try_into()
            .map_err(|_| SlidecastError::validation("canvas width exceeds u16"))?;
        let height: u16 = plan
            .canvas
            .height
            .try_into()
            .map_err(|_| SlidecastError::validation("canvas height exceeds u16"))?;
        let canvas_rect = Rect::new(0.0, 0.0, f64::from(width), f64::from(height));

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        self.with_ctx_mut(width, height, |this, ctx| {
            for op in &plan.ops {
                this.draw_op(op, images, canvas_rect, ctx)?;
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(())
        })?;

        Ok(FrameRGBA {
            width: u32::from(width),
            height: u32::from(height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn solid(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = unpremul(c);
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn unpremul(c: Rgba8Premul) -> [u8; 4] {
    let a = u16::from(c.a);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |v: u8| ((u16::from(v) * 255 + a / 2) / a).min(255) as u8;
    [un(c.r), un(c.g), un(c.b), c.a]
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> SlidecastResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SlidecastError::validation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SlidecastError::validation("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(SlidecastError::validation("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> SlidecastResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
