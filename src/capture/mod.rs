//! Fixed-duration recording of the rendered surface.

/// Capture state machine.
pub mod controller;
/// `ffmpeg`-backed WebM recorder.
pub mod ffmpeg;
/// Recorder trait, in-memory recorder and the finished artifact.
pub mod recorder;
