use std::collections::VecDeque;
use std::process::{Child, Command, Stdio};

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::narration::speech::{SpeechProvider, Utterance, UtteranceId};
use crate::narration::voice::Voice;

const ESPEAK: &str = "espeak-ng";
/// espeak-ng default speaking rate in words per minute.
const BASE_WPM: f32 = 175.0;
/// espeak-ng default pitch (0-99).
const BASE_PITCH: f32 = 50.0;
/// espeak-ng default amplitude (0-200).
const BASE_AMPLITUDE: f32 = 100.0;

/// Speech through the system `espeak-ng` binary, one process per utterance.
///
/// Completion is detected by polling the child process; there is no finish-time hint. A queued
/// utterance whose process cannot be started is reported finished on the next poll.
pub struct EspeakSpeech {
    program: String,
    on_path: Option<bool>,
    next_id: u64,
    queue: VecDeque<(UtteranceId, Utterance)>,
    current: Option<(UtteranceId, Child)>,
    skipped: Vec<UtteranceId>,
    voices: Option<Vec<Voice>>,
}

impl Default for EspeakSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl EspeakSpeech {
    pub fn new() -> Self {
        Self::with_program(ESPEAK)
    }

    /// Use another espeak-ng compatible binary.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            on_path: None,
            next_id: 0,
            queue: VecDeque::new(),
            current: None,
            skipped: Vec::new(),
            voices: None,
        }
    }

    /// Checked once, on first use.
    fn available(&mut self) -> bool {
        *self
            .on_path
            .get_or_insert_with(|| program_responds(&self.program))
    }

    fn spawn(&self, utterance: &Utterance) -> SlidecastResult<Child> {
        let mut cmd = Command::new(&self.program);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(v) = utterance.voice.as_ref() {
            cmd.args(["-v", voice_arg(v)]);
        }
        cmd.args([
            "-s",
            &scaled(BASE_WPM, utterance.rate, 80.0, 500.0),
            "-p",
            &scaled(BASE_PITCH, utterance.pitch, 0.0, 99.0),
            "-a",
            &scaled(BASE_AMPLITUDE, utterance.volume, 0.0, 200.0),
            "--",
        ])
        .arg(&utterance.text);
        cmd.spawn().map_err(|e| {
            SlidecastError::voice_unavailable(format!("failed to spawn {}: {e}", self.program))
        })
    }

    fn start_next(&mut self) {
        while self.current.is_none() {
            let Some((id, utt)) = self.queue.pop_front() else {
                return;
            };
            match self.spawn(&utt) {
                Ok(child) => self.current = Some((id, child)),
                Err(e) => {
                    tracing::warn!(error = %e, id = id.0, "utterance skipped");
                    self.skipped.push(id);
                }
            }
        }
    }
}

impl SpeechProvider for EspeakSpeech {
    fn voices(&mut self) -> Vec<Voice> {
        if let Some(v) = self.voices.as_ref() {
            return v.clone();
        }
        let listed = Command::new(&self.program)
            .arg("--voices")
            .stderr(Stdio::null())
            .output()
            .ok()
            .filter(|o| o.status.success())
            .map(|o| parse_voice_list(&String::from_utf8_lossy(&o.stdout)))
            .unwrap_or_default();
        if !listed.is_empty() {
            self.voices = Some(listed.clone());
        }
        listed
    }

    fn speak(&mut self, utterance: Utterance, _now_ms: f64) -> SlidecastResult<UtteranceId> {
        if !self.available() {
            return Err(SlidecastError::voice_unavailable(format!(
                "{} was not found on PATH",
                self.program
            )));
        }
        let id = UtteranceId(self.next_id);
        if self.current.is_none() && self.queue.is_empty() {
            let child = self.spawn(&utterance)?;
            self.current = Some((id, child));
        } else {
            self.queue.push_back((id, utterance));
        }
        self.next_id += 1;
        Ok(id)
    }

    fn cancel(&mut self) {
        self.queue.clear();
        self.skipped.clear();
        if let Some((_, mut child)) = self.current.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn poll_finished(&mut self, _now_ms: f64) -> Vec<UtteranceId> {
        let mut done = std::mem::take(&mut self.skipped);
        loop {
            let Some((id, child)) = self.current.as_mut() else {
                break;
            };
            match child.try_wait() {
                Ok(Some(_)) | Err(_) => {
                    done.push(*id);
                    self.current = None;
                    self.start_next();
                    done.append(&mut self.skipped);
                }
                Ok(None) => break,
            }
        }
        done
    }

    fn next_finish_hint_ms(&self) -> Option<f64> {
        None
    }
}

impl Drop for EspeakSpeech {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn voice_arg(v: &Voice) -> &str {
    if v.lang.is_empty() { &v.name } else { &v.lang }
}

fn scaled(base: f32, factor: f32, min: f32, max: f32) -> String {
    let f = if factor.is_finite() { factor } else { 1.0 };
    format!("{}", (base * f).round().clamp(min, max) as i32)
}

/// Parse `espeak-ng --voices` output.
///
/// Columns are `Pty Language Age/Gender VoiceName File [Other Languages]`; the header line is
/// skipped.
pub fn parse_voice_list(text: &str) -> Vec<Voice> {
    text.lines()
        .skip_while(|l| !l.trim_start().starts_with("Pty"))
        .skip(1)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let _pty = cols.next()?;
            let lang = cols.next()?;
            let _age_gender = cols.next()?;
            let name = cols.next()?;
            Some(Voice::new(name.replace('_', " "), lang))
        })
        .collect()
}

/// Return `true` when `espeak-ng` can be invoked from `PATH`.
pub fn is_espeak_on_path() -> bool {
    program_responds(ESPEAK)
}

fn program_responds(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
