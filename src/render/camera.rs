use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::math::lerp;
use crate::scene::model::Scene;

/// Fraction of the canvas extent that a full-scale pan (`±1`) moves the image center.
pub const PAN_DAMPING: f64 = 0.15;

/// Interpolated camera for one scene-local progress value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraParams {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl CameraParams {
    pub const IDENTITY: CameraParams = CameraParams {
        scale: 1.0,
        pan_x: 0.0,
        pan_y: 0.0,
    };
}

/// Linear Ken Burns move; `progress` is clamped and the endpoints are reproduced exactly.
pub fn interpolate(scene: &Scene, progress: f64) -> CameraParams {
    CameraParams {
        scale: lerp(scene.zoom_start, scene.zoom_end, progress),
        pan_x: lerp(scene.pan_x_start, scene.pan_x_end, progress),
        pan_y: lerp(scene.pan_y_start, scene.pan_y_end, progress),
    }
}

/// Destination rectangle that covers `canvas` with an image of the given natural size.
///
/// Wider-than-canvas images are fitted by height, others by width, then scaled by the camera
/// and offset by the damped pan. Returns `None` for a zero-sized image.
pub fn cover_rect(
    camera: CameraParams,
    image_width: u32,
    image_height: u32,
    canvas: Canvas,
) -> Option<Rect> {
    if image_width == 0 || image_height == 0 {
        return None;
    }
    let aspect = f64::from(image_width) / f64::from(image_height);
    let (w, h) = if aspect > canvas.aspect() {
        let h = canvas.height_f64() * camera.scale;
        (h * aspect, h)
    } else {
        let w = canvas.width_f64() * camera.scale;
        (w, w / aspect)
    };

    let c = canvas.center();
    let center = Point::new(
        c.x + camera.pan_x * canvas.width_f64() * PAN_DAMPING,
        c.y + camera.pan_y * canvas.height_f64() * PAN_DAMPING,
    );
    Some(Rect::from_center_size(center, (w, h)))
}

#[cfg(test)]
#[path = "../../tests/unit/render/camera.rs"]
mod tests;
