use std::path::PathBuf;

use crate::capture::controller::CaptureOpts;
use crate::foundation::core::{Canvas, Fps};
use crate::narration::sequencer::NarrationOpts;

/// Options controlling a [`crate::Player`].
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerOpts {
    /// Rendering surface size.
    pub canvas: Canvas,
    /// Animation-frame rate while playing.
    pub frame_hz: u32,
    /// Pause between seek(0) and play on restart.
    pub restart_gap_ms: f64,
    pub narration: NarrationOpts,
    pub capture: CaptureOpts,
    /// Caption font; captions are not drawn without one.
    pub font_path: Option<PathBuf>,
}

impl Default for PlayerOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::HD_720,
            frame_hz: 60,
            restart_gap_ms: 50.0,
            narration: NarrationOpts::default(),
            capture: CaptureOpts::default(),
            font_path: None,
        }
    }
}

impl PlayerOpts {
    /// Defaults with overrides from `SLIDECAST_CAPTURE_FPS`, `SLIDECAST_FRAME_HZ` and
    /// `SLIDECAST_FONT`. Unparseable or non-positive values are ignored.
    pub fn from_env() -> Self {
        Self::default().with_env(|k| std::env::var(k).ok())
    }

    pub(crate) fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(fps) = positive_u32(var("SLIDECAST_CAPTURE_FPS")) {
            self.capture.fps = Fps { num: fps, den: 1 };
        }
        if let Some(hz) = positive_u32(var("SLIDECAST_FRAME_HZ")) {
            self.frame_hz = hz;
        }
        if let Some(font) = var("SLIDECAST_FONT").filter(|v| !v.trim().is_empty()) {
            self.font_path = Some(PathBuf::from(font));
        }
        self
    }

    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / f64::from(self.frame_hz.max(1))
    }
}

fn positive_u32(v: Option<String>) -> Option<u32> {
    v.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
}
