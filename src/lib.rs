//! Slidecast plays narrated Ken Burns slideshows.
//!
//! A [`SceneCatalog`] is an ordered list of stills, each with a caption, a time budget and a
//! linear camera move. A [`Player`] drives one catalog:
//!
//! - Play, pause, seek and restart against a single timeline clock
//! - Render frames on the CPU into a [`FrameRGBA`] surface
//! - Narrate captions through a [`SpeechProvider`]
//! - Export a fixed-length capture of the surface through a [`MediaRecorder`]
#![forbid(unsafe_code)]

mod foundation;

pub mod assets;
/// Fixed-duration capture of the rendered surface.
pub mod capture;
pub mod narration;
/// Camera, caption and frame rendering.
pub mod render;
/// Scheduling primitives.
pub mod runtime;
/// Scene descriptors and catalogs.
pub mod scene;
/// Session-oriented playback API.
pub mod session;
/// Playback clock and scene resolution.
pub mod timeline;

pub use crate::foundation::core::{Canvas, Fps, Point, Rect, Rgba8Premul};
pub use crate::foundation::error::{SlidecastError, SlidecastResult};
pub use crate::foundation::math::lerp;

pub use crate::assets::image::{FileImageProvider, ImageHandle, ImageProvider, ImageSet};
pub use crate::assets::text::{ParleyMeasure, TextLayoutEngine, load_font};
pub use crate::capture::controller::{CaptureOpts, CaptureStatus};
pub use crate::capture::ffmpeg::{FfmpegRecorder, FfmpegRecorderOpts};
pub use crate::capture::recorder::{Artifact, InMemoryRecorder, MediaChunk, MediaRecorder};
pub use crate::narration::espeak::EspeakSpeech;
pub use crate::narration::sequencer::{NarrationOpts, NarrationState};
pub use crate::narration::speech::{SilentSpeech, SpeechProvider, Utterance, UtteranceId};
pub use crate::narration::voice::{Voice, pick_voice};
pub use crate::render::backend::{FrameRGBA, RenderBackend};
pub use crate::render::caption::{MonospaceMeasure, TextMeasure};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::frame::{FramePlan, FrameRenderer};
pub use crate::scene::catalog::SceneCatalog;
pub use crate::scene::model::Scene;
pub use crate::session::opts::PlayerOpts;
pub use crate::session::player::{Collaborators, Player};
pub use crate::timeline::resolve::{ResolvedScene, resolve, scene_offsets_ms};
