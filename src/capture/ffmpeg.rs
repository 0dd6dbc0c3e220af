use std::io::Read;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc;

use crate::capture::recorder::{MediaChunk, MediaRecorder, RecorderConfig};
use crate::foundation::core::Fps;
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;

const READ_CHUNK: usize = 64 * 1024;

/// Options for [`FfmpegRecorder`].
#[derive(Clone, Debug)]
pub struct FfmpegRecorderOpts {
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// `libvpx-vp9` constant-quality value.
    pub crf: u8,
}

impl Default for FfmpegRecorderOpts {
    fn default() -> Self {
        Self {
            bg_rgba: [0x0b, 0x10, 0x20, 0xff],
            crf: 32,
        }
    }
}

/// Recorder that spawns the system `ffmpeg` and streams WebM (VP9) out of its stdout.
///
/// Raw frames go to stdin; encoded bytes are drained on a background thread and handed out as
/// chunks whenever a frame is pushed, the remainder on `stop`.
pub struct FfmpegRecorder {
    opts: FfmpegRecorderOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_rx: Option<mpsc::Receiver<std::io::Result<Vec<u8>>>>,
    stdout_drain: Option<std::thread::JoinHandle<()>>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<RecorderConfig>,
    next_seq: u64,
}

impl FfmpegRecorder {
    pub fn new(opts: FfmpegRecorderOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stdout_rx: None,
            stdout_drain: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            next_seq: 0,
        }
    }

    fn collect_ready(&mut self, chunks: &mut Vec<MediaChunk>) -> SlidecastResult<()> {
        let Some(rx) = self.stdout_rx.as_ref() else {
            return Ok(());
        };
        while let Ok(msg) = rx.try_recv() {
            let bytes =
                msg.map_err(|e| SlidecastError::capture(format!("ffmpeg stdout read failed: {e}")))?;
            chunks.push(MediaChunk {
                seq: self.next_seq,
                bytes,
            });
            self.next_seq += 1;
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.stdout_rx = None;
        if let Some(h) = self.stdout_drain.take() {
            let _ = h.join();
        }
        if let Some(h) = self.stderr_drain.take() {
            let _ = h.join();
        }
        self.cfg = None;
    }
}

impl Default for FfmpegRecorder {
    fn default() -> Self {
        Self::new(FfmpegRecorderOpts::default())
    }
}

impl MediaRecorder for FfmpegRecorder {
    fn mime(&self) -> &str {
        "video/webm"
    }

    fn file_extension(&self) -> &str {
        "webm"
    }

    fn start(&mut self, cfg: RecorderConfig) -> SlidecastResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SlidecastError::capture_start(
                "ffmpeg recorder width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(SlidecastError::capture_start(
                "ffmpeg recorder width/height must be even (required for yuv420p output)",
            ));
        }
        if self.child.is_some() {
            return Err(SlidecastError::capture_start("ffmpeg recorder already started"));
        }
        if !is_ffmpeg_on_path() {
            return Err(SlidecastError::capture_unsupported(
                "ffmpeg is required for video export, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Input: raw RGBA8 frames, flattened to opaque in push_frame.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        cmd.args([
            "-an",
            "-c:v",
            "libvpx-vp9",
            "-b:v",
            "0",
            "-crf",
            &self.opts.crf.to_string(),
            "-deadline",
            "realtime",
            "-pix_fmt",
            "yuv420p",
            "-f",
            "webm",
            "pipe:1",
        ]);

        let mut child = cmd.spawn().map_err(|e| {
            SlidecastError::capture_start(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SlidecastError::capture_start("failed to open ffmpeg stdin"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| SlidecastError::capture_start("failed to open ffmpeg stdout"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SlidecastError::capture_start("failed to open ffmpeg stderr"))?;

        let (tx, rx) = mpsc::channel();
        let stdout_drain = std::thread::spawn(move || {
            let mut buf = vec![0u8; READ_CHUNK];
            loop {
                match stdout.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(Ok(buf[..n].to_vec())).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        break;
                    }
                }
            }
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_rx = Some(rx);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.next_seq = 0;
        tracing::debug!(width = cfg.width, height = cfg.height, "ffmpeg recorder started");
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> SlidecastResult<Vec<MediaChunk>> {
        let cfg = self
            .cfg
            .ok_or_else(|| SlidecastError::capture("ffmpeg recorder not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(SlidecastError::capture(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(SlidecastError::capture(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SlidecastError::capture("ffmpeg recorder is already finalized"));
        };
        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            SlidecastError::capture(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;

        let mut chunks = Vec::new();
        self.collect_ready(&mut chunks)?;
        Ok(chunks)
    }

    fn stop(&mut self) -> SlidecastResult<Vec<MediaChunk>> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| SlidecastError::capture("ffmpeg recorder not started"))?;

        let status = child.wait().map_err(|e| {
            SlidecastError::capture(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        if let Some(h) = self.stdout_drain.take() {
            h.join()
                .map_err(|_| SlidecastError::capture("ffmpeg stdout drain thread panicked"))?;
        }
        let mut chunks = Vec::new();
        self.collect_ready(&mut chunks)?;
        self.stdout_rx = None;

        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SlidecastError::capture("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| SlidecastError::capture(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(SlidecastError::capture(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(chunks)
    }
}

impl Drop for FfmpegRecorder {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.shutdown();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` goes before `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> SlidecastResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(SlidecastError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/capture/ffmpeg.rs"]
mod tests;
