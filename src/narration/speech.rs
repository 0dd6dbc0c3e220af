use std::collections::VecDeque;

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::narration::voice::Voice;

/// Identifier of one spoken utterance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

/// Text to speak with its voice settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// `None` speaks with the engine default voice.
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Text-to-speech engine boundary.
///
/// Completion is polled: the owner calls [`SpeechProvider::poll_finished`] whenever it wakes up
/// and uses [`SpeechProvider::next_finish_hint_ms`] to decide when to wake up next.
pub trait SpeechProvider {
    /// Currently installed voices. May be empty and may grow over time.
    fn voices(&mut self) -> Vec<Voice>;

    /// Queue an utterance. Utterances are spoken one after another in queue order.
    fn speak(&mut self, utterance: Utterance, now_ms: f64) -> SlidecastResult<UtteranceId>;

    /// Stop the current utterance and drop everything queued. Cancelled utterances never
    /// report completion.
    fn cancel(&mut self);

    /// Utterances that finished speaking at or before `now_ms`, in completion order.
    fn poll_finished(&mut self, now_ms: f64) -> Vec<UtteranceId>;

    /// Time at which the next completion is expected, if the engine can predict it.
    fn next_finish_hint_ms(&self) -> Option<f64>;
}

/// Words per minute of a typical narrator at rate `1.0`.
pub const NARRATION_WPM: f64 = 165.0;

/// Estimated speaking time of `text` at `rate`.
pub fn estimate_speech_ms(text: &str, rate: f32) -> f64 {
    let words = text.split_whitespace().count().max(1) as f64;
    let rate = if rate.is_finite() && rate > 0.0 {
        f64::from(rate)
    } else {
        1.0
    };
    (words * 60_000.0 / NARRATION_WPM / rate).round()
}

#[derive(Clone, Debug)]
struct Queued {
    id: UtteranceId,
    duration_ms: f64,
}

/// Speech engine that produces no audio.
///
/// Each utterance "speaks" for its estimated duration, so narration pacing behaves like a real
/// engine under virtual time. Every accepted utterance is recorded for inspection.
#[derive(Clone, Debug, Default)]
pub struct SilentSpeech {
    voices: Vec<Voice>,
    next_id: u64,
    queue: VecDeque<Queued>,
    /// Finish time of the queue head, once it started speaking.
    head_finish_ms: Option<f64>,
    spoken: Vec<Utterance>,
    fail_speak: bool,
}

impl SilentSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }

    /// Make every `speak` call fail (engine errors are non-fatal to playback).
    pub fn failing(mut self) -> Self {
        self.fail_speak = true;
        self
    }

    /// Utterances accepted so far, in order.
    pub fn spoken(&self) -> &[Utterance] {
        &self.spoken
    }

    pub fn is_speaking(&self) -> bool {
        !self.queue.is_empty()
    }
}

impl SpeechProvider for SilentSpeech {
    fn voices(&mut self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&mut self, utterance: Utterance, now_ms: f64) -> SlidecastResult<UtteranceId> {
        if self.fail_speak {
            return Err(SlidecastError::voice_unavailable(
                "speech engine rejected the utterance",
            ));
        }
        let id = UtteranceId(self.next_id);
        self.next_id += 1;
        let duration_ms = estimate_speech_ms(&utterance.text, utterance.rate);
        if self.queue.is_empty() {
            self.head_finish_ms = Some(now_ms + duration_ms);
        }
        self.queue.push_back(Queued { id, duration_ms });
        self.spoken.push(utterance);
        Ok(id)
    }

    fn cancel(&mut self) {
        self.queue.clear();
        self.head_finish_ms = None;
    }

    fn poll_finished(&mut self, now_ms: f64) -> Vec<UtteranceId> {
        let mut done = Vec::new();
        while let Some(finish) = self.head_finish_ms {
            if finish > now_ms {
                break;
            }
            let Some(head) = self.queue.pop_front() else {
                self.head_finish_ms = None;
                break;
            };
            done.push(head.id);
            self.head_finish_ms = self.queue.front().map(|next| finish + next.duration_ms);
        }
        done
    }

    fn next_finish_hint_ms(&self) -> Option<f64> {
        self.head_finish_ms
    }
}

#[cfg(test)]
#[path = "../../tests/unit/narration/speech.rs"]
mod tests;
