use crate::foundation::error::{SlidecastError, SlidecastResult};

fn unit_zoom() -> f64 {
    1.0
}

/// One catalog entry: an image, its caption, a time budget and a linear camera move.
///
/// Pan values are normalized offsets in `[-1, 1]`; the renderer damps them to a fraction of the
/// canvas extent.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    /// Image reference, relative to the catalog file (or a URL, which is never fetched).
    pub image: String,
    /// Caption text, spoken by the narrator and drawn over the image.
    pub caption: String,
    /// Exclusive time budget of the scene.
    pub duration_ms: u64,
    #[serde(default = "unit_zoom")]
    pub zoom_start: f64,
    #[serde(default = "unit_zoom")]
    pub zoom_end: f64,
    #[serde(default)]
    pub pan_x_start: f64,
    #[serde(default)]
    pub pan_x_end: f64,
    #[serde(default)]
    pub pan_y_start: f64,
    #[serde(default)]
    pub pan_y_end: f64,
}

impl Scene {
    /// Scene with a static camera (zoom 1, no pan).
    pub fn still(image: impl Into<String>, caption: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            image: image.into(),
            caption: caption.into(),
            duration_ms,
            zoom_start: 1.0,
            zoom_end: 1.0,
            pan_x_start: 0.0,
            pan_x_end: 0.0,
            pan_y_start: 0.0,
            pan_y_end: 0.0,
        }
    }

    pub fn with_zoom(mut self, start: f64, end: f64) -> Self {
        self.zoom_start = start;
        self.zoom_end = end;
        self
    }

    pub fn with_pan_x(mut self, start: f64, end: f64) -> Self {
        self.pan_x_start = start;
        self.pan_x_end = end;
        self
    }

    pub fn with_pan_y(mut self, start: f64, end: f64) -> Self {
        self.pan_y_start = start;
        self.pan_y_end = end;
        self
    }

    pub fn validate(&self) -> SlidecastResult<()> {
        if self.caption.trim().is_empty() {
            return Err(SlidecastError::validation("scene caption must be non-empty"));
        }
        if self.duration_ms == 0 {
            return Err(SlidecastError::validation(
                "scene duration_ms must be positive",
            ));
        }
        for (name, z) in [("zoom_start", self.zoom_start), ("zoom_end", self.zoom_end)] {
            if !z.is_finite() || z <= 0.0 {
                return Err(SlidecastError::validation(format!(
                    "scene {name} must be finite and > 0 (got {z})"
                )));
            }
        }
        for (name, p) in [
            ("pan_x_start", self.pan_x_start),
            ("pan_x_end", self.pan_x_end),
            ("pan_y_start", self.pan_y_start),
            ("pan_y_end", self.pan_y_end),
        ] {
            if !p.is_finite() || !(-1.0..=1.0).contains(&p) {
                return Err(SlidecastError::validation(format!(
                    "scene {name} must be within [-1, 1] (got {p})"
                )));
            }
        }
        Ok(())
    }
}
