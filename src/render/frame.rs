use crate::assets::image::ImageSet;
use crate::foundation::core::{Canvas, Rect, Rgba8Premul};
use crate::foundation::math::safe_ratio;
use crate::render::camera::{CameraParams, cover_rect, interpolate};
use crate::render::caption::{CaptionLine, CaptionStyle, TextMeasure, layout_caption};
use crate::scene::catalog::SceneCatalog;
use crate::timeline::resolve::{ResolvedScene, resolve};

/// Solid background behind every frame (`#0b1020`).
pub const BACKGROUND: [u8; 4] = [0x0b, 0x10, 0x20, 0xff];
/// Progress fill color (`#22d3ee`).
pub const PROGRESS_FILL: [u8; 4] = [0x22, 0xd3, 0xee, 0xff];
/// Progress track color, straight alpha.
pub const PROGRESS_TRACK: [u8; 4] = [0xff, 0xff, 0xff, 64];
/// Bottom color of the caption scrim, straight alpha.
pub const SCRIM_BOTTOM: [u8; 4] = [0, 0, 0, 179];

/// A single drawing command, in paint order.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear(Rgba8Premul),
    /// Scene image stretched into `rect` (canvas coordinates, may exceed the canvas).
    Image {
        scene: usize,
        rect: Rect,
    },
    /// Vertical scrim over `rect`: fully `top` above `ramp_start_y`, then ramping to `bottom`.
    Gradient {
        rect: Rect,
        ramp_start_y: f64,
        top: Rgba8Premul,
        bottom: Rgba8Premul,
    },
    Caption {
        line: CaptionLine,
        size_px: f32,
        color: Rgba8Premul,
    },
    FillRect {
        rect: Rect,
        color: Rgba8Premul,
    },
}

/// Everything needed to rasterize one frame, plus the values the caller commits.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub canvas: Canvas,
    pub elapsed_ms: f64,
    /// `min(elapsed / total, 1)`.
    pub progress: f64,
    pub scene: ResolvedScene,
    pub camera: CameraParams,
    pub ops: Vec<DrawOp>,
}

impl FramePlan {
    pub fn captions(&self) -> impl Iterator<Item = &CaptionLine> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Caption { line, .. } => Some(line),
            _ => None,
        })
    }
}

/// Builds [`FramePlan`]s from elapsed time.
///
/// Planning is pure with respect to playback state: it reads the catalog and caches caption
/// layouts per scene, nothing else.
#[derive(Debug)]
pub struct FrameRenderer {
    canvas: Canvas,
    style: CaptionStyle,
    caption_cache: Vec<Option<Vec<CaptionLine>>>,
}

impl FrameRenderer {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            style: CaptionStyle::default(),
            caption_cache: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: CaptionStyle) -> Self {
        self.style = style;
        self.caption_cache.clear();
        self
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    #[tracing::instrument(level = "trace", skip_all, fields(elapsed_ms))]
    pub fn plan(
        &mut self,
        catalog: &SceneCatalog,
        elapsed_ms: f64,
        images: &ImageSet,
        measure: &mut dyn TextMeasure,
    ) -> FramePlan {
        let canvas = self.canvas;
        let w = canvas.width_f64();
        let h = canvas.height_f64();
        let total = catalog.total_duration_ms() as f64;
        let elapsed_ms = if elapsed_ms.is_nan() {
            0.0
        } else {
            elapsed_ms.clamp(0.0, total)
        };
        let progress = safe_ratio(elapsed_ms, total).min(1.0);

        let scene = resolve(catalog, elapsed_ms);
        let camera = catalog
            .get(scene.index)
            .map(|s| interpolate(s, scene.progress))
            .unwrap_or(CameraParams::IDENTITY);

        let mut ops = Vec::with_capacity(8);
        ops.push(DrawOp::Clear(Rgba8Premul::from_straight(BACKGROUND)));

        if let Some(img) = images.get(scene.index)
            && let Some(rect) = cover_rect(camera, img.natural_width, img.natural_height, canvas)
        {
            ops.push(DrawOp::Image {
                scene: scene.index,
                rect,
            });
        }

        ops.push(DrawOp::Gradient {
            rect: Rect::new(0.0, h * 0.55, w, h),
            ramp_start_y: h * 0.65,
            top: Rgba8Premul::transparent(),
            bottom: Rgba8Premul::from_straight(SCRIM_BOTTOM),
        });

        let size_px = self.style.font_size_px;
        let color = self.style.color;
        for line in self.captions_for(catalog, scene.index, measure) {
            ops.push(DrawOp::Caption {
                line: line.clone(),
                size_px,
                color,
            });
        }

        let track = Rect::new(24.0, h - 8.0, w - 24.0, h - 4.0);
        ops.push(DrawOp::FillRect {
            rect: track,
            color: Rgba8Premul::from_straight(PROGRESS_TRACK),
        });
        if progress > 0.0 {
            ops.push(DrawOp::FillRect {
                rect: Rect::new(track.x0, track.y0, track.x0 + track.width() * progress, track.y1),
                color: Rgba8Premul::from_straight(PROGRESS_FILL),
            });
        }

        FramePlan {
            canvas,
            elapsed_ms,
            progress,
            scene,
            camera,
            ops,
        }
    }

    fn captions_for(
        &mut self,
        catalog: &SceneCatalog,
        index: usize,
        measure: &mut dyn TextMeasure,
    ) -> &[CaptionLine] {
        if self.caption_cache.len() != catalog.len() {
            self.caption_cache.clear();
            self.caption_cache.resize_with(catalog.len(), || None);
        }
        let (canvas, style) = (self.canvas, self.style);
        let Some(slot) = self.caption_cache.get_mut(index) else {
            return &[];
        };
        slot.get_or_insert_with(|| {
            catalog
                .get(index)
                .map(|s| layout_caption(&s.caption, canvas, &style, measure))
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
