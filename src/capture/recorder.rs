use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Fps;
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::render::backend::FrameRGBA;

/// Configuration handed to a [`MediaRecorder`] when a capture starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecorderConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
}

/// One piece of encoded output, in emission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaChunk {
    pub seq: u64,
    pub bytes: Vec<u8>,
}

/// Video encoder/container boundary.
///
/// `push_frame` is called at the capture rate with frames in timeline order. Chunks may be
/// emitted at any call, including `stop`.
pub trait MediaRecorder {
    fn mime(&self) -> &str;
    fn file_extension(&self) -> &str;
    fn start(&mut self, cfg: RecorderConfig) -> SlidecastResult<()>;
    fn push_frame(&mut self, frame: &FrameRGBA) -> SlidecastResult<Vec<MediaChunk>>;
    fn stop(&mut self) -> SlidecastResult<Vec<MediaChunk>>;
}

/// Recorder that emits every frame as one raw RGBA chunk.
#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    cfg: Option<RecorderConfig>,
    next_seq: u64,
    frames: u64,
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `start`, if running.
    pub fn config(&self) -> Option<RecorderConfig> {
        self.cfg
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl MediaRecorder for InMemoryRecorder {
    fn mime(&self) -> &str {
        "video/x-raw-rgba"
    }

    fn file_extension(&self) -> &str {
        "rgba"
    }

    fn start(&mut self, cfg: RecorderConfig) -> SlidecastResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SlidecastError::capture_start(
                "recorder width/height must be non-zero",
            ));
        }
        self.cfg = Some(cfg);
        self.next_seq = 0;
        self.frames = 0;
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> SlidecastResult<Vec<MediaChunk>> {
        let cfg = self
            .cfg
            .ok_or_else(|| SlidecastError::capture("recorder not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(SlidecastError::capture(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let chunk = MediaChunk {
            seq: self.next_seq,
            bytes: frame.data.clone(),
        };
        self.next_seq += 1;
        self.frames += 1;
        Ok(vec![chunk])
    }

    fn stop(&mut self) -> SlidecastResult<Vec<MediaChunk>> {
        self.cfg
            .take()
            .ok_or_else(|| SlidecastError::capture("recorder not started"))?;
        Ok(Vec::new())
    }
}

/// Finished capture: every chunk concatenated in order.
#[derive(Clone, Debug, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub chunk_count: usize,
    pub frame_count: u64,
    /// Time from arming to the forced stop.
    pub duration_ms: f64,
}

impl Artifact {
    pub fn assemble(
        file_name: impl Into<String>,
        mime: impl Into<String>,
        chunks: Vec<MediaChunk>,
        frame_count: u64,
        duration_ms: f64,
    ) -> Self {
        let chunk_count = chunks.len();
        let bytes = chunks.into_iter().flat_map(|c| c.bytes).collect();
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
            chunk_count,
            frame_count,
            duration_ms,
        }
    }

    /// Hex SHA-256 of the artifact bytes.
    pub fn sha256_hex(&self) -> String {
        use sha2::Digest as _;
        let digest = sha2::Sha256::digest(&self.bytes);
        let mut out = String::with_capacity(digest.len() * 2);
        for b in digest {
            out.push_str(&format!("{:02x}", b));
        }
        out
    }

    pub fn write_to(&self, path: &Path) -> SlidecastResult<()> {
        ensure_parent_dir(path)?;
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("write artifact '{}'", path.display()))?;
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SlidecastResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
