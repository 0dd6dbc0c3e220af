use crate::narration::speech::{SpeechProvider, Utterance, UtteranceId};
use crate::narration::voice::{DEFAULT_PREFERRED_VOICES, Voice, pick_voice};
use crate::scene::catalog::SceneCatalog;

/// Narration settings.
#[derive(Clone, Debug, PartialEq)]
pub struct NarrationOpts {
    /// Delay between entering Playing and the first utterance, letting voices load.
    pub settle_delay_ms: f64,
    pub preferred_voices: Vec<String>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for NarrationOpts {
    fn default() -> Self {
        Self {
            settle_delay_ms: 250.0,
            preferred_voices: DEFAULT_PREFERRED_VOICES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rate: 0.95,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NarrationState {
    Stopped,
    /// Waiting for the settle timer of the given generation.
    Settling,
    /// Speaking the caption of scene `index`.
    Speaking(usize),
}

/// Request to arm the settle timer; hand the generation back to [`NarrationSequencer::on_settled`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SettleRequest {
    pub delay_ms: f64,
    pub generation: u64,
}

/// Speaks scene captions in order while playback runs.
///
/// Every play/pause transition starts a new generation; settle timers and utterance completions
/// from older generations are ignored. Narration always starts from the first scene and is not
/// re-aligned with the visual timeline.
#[derive(Debug)]
pub struct NarrationSequencer {
    captions: Vec<String>,
    opts: NarrationOpts,
    state: NarrationState,
    generation: u64,
    in_flight: Option<UtteranceId>,
    voice: Option<Voice>,
}

impl NarrationSequencer {
    pub fn new(captions: Vec<String>, opts: NarrationOpts) -> Self {
        Self {
            captions,
            opts,
            state: NarrationState::Stopped,
            generation: 0,
            in_flight: None,
            voice: None,
        }
    }

    pub fn for_catalog(catalog: &SceneCatalog, opts: NarrationOpts) -> Self {
        Self::new(
            catalog.scenes().iter().map(|s| s.caption.clone()).collect(),
            opts,
        )
    }

    pub fn state(&self) -> NarrationState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn in_flight(&self) -> Option<UtteranceId> {
        self.in_flight
    }

    /// Voice chosen when the current narration started (`None`: engine default).
    pub fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }

    /// React to a play-state transition.
    ///
    /// Entering Playing restarts narration and asks for a settle timer. Leaving it cancels any
    /// in-flight speech and stops.
    pub fn on_play_state(
        &mut self,
        playing: bool,
        speech: &mut dyn SpeechProvider,
    ) -> Option<SettleRequest> {
        if self.state != NarrationState::Stopped || self.in_flight.is_some() {
            speech.cancel();
            tracing::debug!(generation = self.generation, "narration cancelled");
        }
        self.generation += 1;
        self.in_flight = None;
        if !playing {
            self.state = NarrationState::Stopped;
            return None;
        }
        self.state = NarrationState::Settling;
        Some(SettleRequest {
            delay_ms: self.opts.settle_delay_ms,
            generation: self.generation,
        })
    }

    /// Settle timer fired. Returns `true` if narration started.
    pub fn on_settled(
        &mut self,
        generation: u64,
        playing: bool,
        speech: &mut dyn SpeechProvider,
        now_ms: f64,
    ) -> bool {
        if generation != self.generation || self.state != NarrationState::Settling || !playing {
            return false;
        }
        let voices = speech.voices();
        self.voice = pick_voice(&voices, &self.opts.preferred_voices).cloned();
        match self.voice.as_ref() {
            Some(v) => tracing::debug!(voice = %v.name, lang = %v.lang, "narration voice"),
            None => tracing::info!(
                available = voices.len(),
                "no preferred narration voice; using engine default"
            ),
        }
        self.speak_scene(0, speech, now_ms)
    }

    /// An utterance finished. Advances to the next caption when it was the in-flight one.
    pub fn on_utterance_end(
        &mut self,
        id: UtteranceId,
        playing: bool,
        speech: &mut dyn SpeechProvider,
        now_ms: f64,
    ) {
        if self.in_flight != Some(id) {
            return;
        }
        self.in_flight = None;
        let NarrationState::Speaking(index) = self.state else {
            return;
        };
        if !playing {
            self.state = NarrationState::Stopped;
            return;
        }
        let next = index + 1;
        if next >= self.captions.len() {
            tracing::debug!("narration finished");
            self.state = NarrationState::Stopped;
            return;
        }
        self.speak_scene(next, speech, now_ms);
    }

    fn speak_scene(&mut self, index: usize, speech: &mut dyn SpeechProvider, now_ms: f64) -> bool {
        let Some(text) = self.captions.get(index) else {
            self.state = NarrationState::Stopped;
            return false;
        };
        let utterance = Utterance {
            text: text.clone(),
            voice: self.voice.clone(),
            rate: self.opts.rate,
            pitch: self.opts.pitch,
            volume: self.opts.volume,
        };
        match speech.speak(utterance, now_ms) {
            Ok(id) => {
                tracing::debug!(scene = index, "narrating");
                self.in_flight = Some(id);
                self.state = NarrationState::Speaking(index);
                true
            }
            Err(e) => {
                tracing::warn!(scene = index, error = %e, "narration stopped");
                self.state = NarrationState::Stopped;
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/narration/sequencer.rs"]
mod tests;
