use crate::capture::recorder::{Artifact, MediaChunk, MediaRecorder, RecorderConfig};
use crate::foundation::core::Fps;
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::render::backend::FrameRGBA;

/// Capture timing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureOpts {
    pub fps: Fps,
    /// Armed -> Recording delay.
    pub startup_delay_ms: f64,
    /// Extra time recorded after the timeline ends.
    pub margin_ms: f64,
}

impl Default for CaptureOpts {
    fn default() -> Self {
        Self {
            fps: Fps { num: 30, den: 1 },
            startup_delay_ms: 100.0,
            margin_ms: 250.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureStatus {
    Idle,
    Armed,
    Recording,
    Finalizing,
}

/// One export in progress.
#[derive(Clone, Debug)]
pub struct RecordingSession {
    pub file_name: String,
    pub mime: String,
    pub armed_at_ms: f64,
    /// Forced stop time: `armed_at + total + margin`.
    pub deadline_ms: f64,
    pub buffer: Vec<MediaChunk>,
    pub frames: u64,
}

/// Absolute times the owner must schedule after a successful [`CaptureController::arm`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureSchedule {
    pub commit_at_ms: f64,
    pub deadline_ms: f64,
}

/// Drives one fixed-length recording at a time:
/// `Idle -> Armed -> Recording -> Finalizing -> Idle`.
///
/// The stop deadline depends only on the arm time and the timeline length, never on playback
/// state, so pausing or restarting mid-export still yields a complete capture.
#[derive(Debug)]
pub struct CaptureController {
    opts: CaptureOpts,
    status: CaptureStatus,
    session: Option<RecordingSession>,
}

impl CaptureController {
    pub fn new(opts: CaptureOpts) -> Self {
        Self {
            opts,
            status: CaptureStatus::Idle,
            session: None,
        }
    }

    pub fn opts(&self) -> CaptureOpts {
        self.opts
    }

    pub fn status(&self) -> CaptureStatus {
        self.status
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.status == CaptureStatus::Idle
    }

    /// Start the recorder and enter Armed.
    ///
    /// Rejected while another export is running. A recorder failure leaves the controller Idle.
    pub fn arm(
        &mut self,
        recorder: &mut dyn MediaRecorder,
        width: u32,
        height: u32,
        total_ms: f64,
        now_ms: f64,
        file_stem: &str,
    ) -> SlidecastResult<CaptureSchedule> {
        if self.status != CaptureStatus::Idle {
            return Err(SlidecastError::validation(
                "an export is already in progress",
            ));
        }
        recorder.start(RecorderConfig {
            width,
            height,
            fps: self.opts.fps,
        })?;

        let deadline_ms = now_ms + total_ms + self.opts.margin_ms;
        self.session = Some(RecordingSession {
            file_name: format!("{file_stem}.{}", recorder.file_extension()),
            mime: recorder.mime().to_string(),
            armed_at_ms: now_ms,
            deadline_ms,
            buffer: Vec::new(),
            frames: 0,
        });
        self.status = CaptureStatus::Armed;
        tracing::info!(armed_at_ms = now_ms, deadline_ms, "capture armed");
        Ok(CaptureSchedule {
            commit_at_ms: now_ms + self.opts.startup_delay_ms,
            deadline_ms,
        })
    }

    /// Armed -> Recording. Returns `false` in any other state.
    pub fn commit(&mut self) -> bool {
        if self.status != CaptureStatus::Armed {
            return false;
        }
        self.status = CaptureStatus::Recording;
        tracing::debug!("capture recording");
        true
    }

    /// Encode one sampled frame. Chunks accumulate from arming on; ignored when Idle or
    /// Finalizing.
    pub fn capture_frame(
        &mut self,
        recorder: &mut dyn MediaRecorder,
        frame: &FrameRGBA,
    ) -> SlidecastResult<()> {
        if !matches!(self.status, CaptureStatus::Armed | CaptureStatus::Recording) {
            return Ok(());
        }
        let Some(session) = self.session.as_mut() else {
            return Err(SlidecastError::capture("capture without a session"));
        };
        let chunks = recorder.push_frame(frame)?;
        session.buffer.extend(chunks);
        session.frames += 1;
        Ok(())
    }

    /// Stop the recorder and assemble the artifact. Always ends Idle.
    pub fn finalize(
        &mut self,
        recorder: &mut dyn MediaRecorder,
        now_ms: f64,
    ) -> SlidecastResult<Artifact> {
        let Some(mut session) = self.session.take() else {
            self.status = CaptureStatus::Idle;
            return Err(SlidecastError::capture("no capture session to finalize"));
        };
        self.status = CaptureStatus::Finalizing;
        let stopped = recorder.stop();
        self.status = CaptureStatus::Idle;
        session.buffer.extend(stopped?);

        let artifact = Artifact::assemble(
            session.file_name,
            session.mime,
            session.buffer,
            session.frames,
            now_ms - session.armed_at_ms,
        );
        tracing::info!(
            file = %artifact.file_name,
            bytes = artifact.bytes.len(),
            frames = artifact.frame_count,
            duration_ms = artifact.duration_ms,
            "capture finalized"
        );
        Ok(artifact)
    }

    /// Discard the session after a fatal capture error.
    pub fn abort(&mut self, recorder: &mut dyn MediaRecorder) {
        if self.session.take().is_some() {
            if let Err(e) = recorder.stop() {
                tracing::debug!(error = %e, "recorder stop during abort failed");
            }
            tracing::warn!("capture aborted");
        }
        self.status = CaptureStatus::Idle;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/controller.rs"]
mod tests;
