use std::path::Path;
use std::time::{Duration, Instant};

use crate::assets::image::{FileImageProvider, ImageSet};
use crate::assets::text::{ParleyMeasure, TextLayoutEngine, load_font};
use crate::capture::controller::{CaptureController, CaptureStatus};
use crate::capture::recorder::{Artifact, InMemoryRecorder, MediaRecorder};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::narration::sequencer::{NarrationSequencer, NarrationState};
use crate::narration::speech::{SilentSpeech, SpeechProvider};
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::caption::{CaptionStyle, MonospaceMeasure, TextMeasure};
use crate::render::cpu::CpuBackend;
use crate::render::frame::{FramePlan, FrameRenderer};
use crate::runtime::scheduler::{Scheduler, TimerId};
use crate::scene::catalog::SceneCatalog;
use crate::session::opts::PlayerOpts;
use crate::timeline::clock::TimelineClock;

/// Poll interval for speech engines that cannot predict when an utterance ends.
const SPEECH_POLL_MS: f64 = 50.0;
/// Upper bound on events dispatched at a single instant before `advance_to` gives up.
const MAX_EVENTS_PER_INSTANT: u32 = 10_000;
/// Longest single sleep in [`Player::run_realtime`], so the stop predicate stays responsive.
const MAX_REALTIME_SLEEP_MS: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Event {
    FrameTick,
    RestartResume,
    NarrationSettle { generation: u64 },
    SpeechPoll,
    CaptureCommit,
    CaptureFrame { index: u64 },
    CaptureDeadline,
}

/// External boundaries a [`Player`] drives.
pub struct Collaborators {
    pub images: ImageSet,
    pub backend: Box<dyn RenderBackend>,
    pub measure: Box<dyn TextMeasure>,
    pub speech: Box<dyn SpeechProvider>,
    pub recorder: Box<dyn MediaRecorder>,
}

impl Collaborators {
    /// No images, no font, silent speech and an in-memory recorder.
    pub fn headless(catalog: &SceneCatalog) -> Self {
        Self {
            images: ImageSet::unavailable(catalog),
            backend: Box::new(CpuBackend::new()),
            measure: Box::new(MonospaceMeasure::default()),
            speech: Box::new(SilentSpeech::new()),
            recorder: Box::new(InMemoryRecorder::new()),
        }
    }

    /// Headless collaborators upgraded with the configured font and images under `image_root`.
    pub fn from_opts(
        catalog: &SceneCatalog,
        opts: &PlayerOpts,
        image_root: Option<&Path>,
    ) -> SlidecastResult<Self> {
        let mut out = Self::headless(catalog);
        if let Some(root) = image_root {
            out.images = ImageSet::load(catalog, &mut FileImageProvider::new(root));
        }
        if let Some(path) = opts.font_path.as_deref() {
            let font = load_font(path)?;
            let engine = TextLayoutEngine::new(font.clone())?;
            out.measure = Box::new(ParleyMeasure::new(
                engine,
                CaptionStyle::default().font_size_px,
            ));
            out.backend = Box::new(CpuBackend::new().with_font(font)?);
        }
        Ok(out)
    }
}

/// Owns every playback state object and dispatches scheduled events against them.
///
/// All user controls and timers run on one logical thread. Time comes from the internal
/// [`Scheduler`]: [`Player::advance_to`] moves it forward virtually, [`Player::run_realtime`]
/// paces it against the wall clock.
pub struct Player {
    catalog: SceneCatalog,
    opts: PlayerOpts,
    clock: TimelineClock,
    scheduler: Scheduler<Event>,
    renderer: FrameRenderer,
    backend: Box<dyn RenderBackend>,
    images: ImageSet,
    measure: Box<dyn TextMeasure>,
    speech: Box<dyn SpeechProvider>,
    recorder: Box<dyn MediaRecorder>,
    narration: NarrationSequencer,
    capture: CaptureController,

    surface: Option<FrameRGBA>,
    current_scene: Option<usize>,
    frames_presented: u64,

    frame_timer: Option<TimerId>,
    tick_anchor_ms: f64,
    tick_count: u64,
    restart_timer: Option<TimerId>,
    settle_timer: Option<TimerId>,
    speech_timer: Option<TimerId>,
    capture_commit_timer: Option<TimerId>,
    capture_frame_timer: Option<TimerId>,
    capture_deadline_timer: Option<TimerId>,
    capture_anchor_ms: f64,

    last_error: Option<String>,
    artifact: Option<Artifact>,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("now_ms", &self.scheduler.now_ms())
            .field("clock", &self.clock)
            .field("narration", &self.narration.state())
            .field("capture", &self.capture.status())
            .field("frames_presented", &self.frames_presented)
            .finish_non_exhaustive()
    }
}

impl Player {
    pub fn new(catalog: SceneCatalog, opts: PlayerOpts, parts: Collaborators) -> Self {
        let clock = TimelineClock::new(catalog.total_duration_ms());
        let narration = NarrationSequencer::for_catalog(&catalog, opts.narration.clone());
        let capture = CaptureController::new(opts.capture);
        let renderer = FrameRenderer::new(opts.canvas);
        Self {
            catalog,
            opts,
            clock,
            scheduler: Scheduler::new(0.0),
            renderer,
            backend: parts.backend,
            images: parts.images,
            measure: parts.measure,
            speech: parts.speech,
            recorder: parts.recorder,
            narration,
            capture,
            surface: None,
            current_scene: None,
            frames_presented: 0,
            frame_timer: None,
            tick_anchor_ms: 0.0,
            tick_count: 0,
            restart_timer: None,
            settle_timer: None,
            speech_timer: None,
            capture_commit_timer: None,
            capture_frame_timer: None,
            capture_deadline_timer: None,
            capture_anchor_ms: 0.0,
            last_error: None,
            artifact: None,
        }
    }

    pub fn headless(catalog: SceneCatalog, opts: PlayerOpts) -> Self {
        let parts = Collaborators::headless(&catalog);
        Self::new(catalog, opts, parts)
    }

    pub fn catalog(&self) -> &SceneCatalog {
        &self.catalog
    }

    pub fn opts(&self) -> &PlayerOpts {
        &self.opts
    }

    pub fn clock(&self) -> &TimelineClock {
        &self.clock
    }

    pub fn now_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.clock.elapsed_ms(self.scheduler.now_ms())
    }

    pub fn progress(&self) -> f64 {
        self.clock.progress_at(self.scheduler.now_ms())
    }

    pub fn narration(&self) -> &NarrationSequencer {
        &self.narration
    }

    pub fn capture_status(&self) -> CaptureStatus {
        self.capture.status()
    }

    /// Last presented frame.
    pub fn surface(&self) -> Option<&FrameRGBA> {
        self.surface.as_ref()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// User-visible message of the last failed export, cleared by `play` and `export`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Take the artifact of the last finished export.
    pub fn take_artifact(&mut self) -> Option<Artifact> {
        self.artifact.take()
    }

    pub fn speech(&self) -> &dyn SpeechProvider {
        self.speech.as_ref()
    }

    pub fn play(&mut self) {
        self.last_error = None;
        self.start_playing();
    }

    pub fn pause(&mut self) {
        let now = self.scheduler.now_ms();
        cancel(&mut self.scheduler, &mut self.restart_timer);
        if self.clock.pause(now) {
            tracing::info!(progress = self.clock.progress(), "pause");
            self.stop_playback_side_effects();
            self.present_quietly();
        }
    }

    pub fn seek(&mut self, progress: f64) -> SlidecastResult<()> {
        let now = self.scheduler.now_ms();
        self.clock.seek(progress, now)?;
        tracing::debug!(progress = self.clock.progress(), "seek");
        if !self.clock.is_playing() {
            self.present_quietly();
        }
        Ok(())
    }

    /// Pause, rewind, and resume after the configured gap.
    pub fn restart(&mut self) {
        let now = self.scheduler.now_ms();
        cancel(&mut self.scheduler, &mut self.restart_timer);
        if self.clock.pause(now) {
            self.stop_playback_side_effects();
        }
        self.clock.rewind(now);
        self.present_quietly();
        self.restart_timer = Some(
            self.scheduler
                .schedule_after(self.opts.restart_gap_ms, Event::RestartResume),
        );
        tracing::info!(gap_ms = self.opts.restart_gap_ms, "restart");
    }

    /// Arm a capture and play the timeline from the start.
    ///
    /// Rejected while another export runs. Arming failures are reported through
    /// [`Player::last_error`] and leave playback untouched.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn export(&mut self) -> SlidecastResult<()> {
        if !self.capture.is_idle() {
            return Err(SlidecastError::validation(
                "an export is already in progress",
            ));
        }
        self.last_error = None;
        self.artifact = None;
        let now = self.scheduler.now_ms();
        let canvas = self.renderer.canvas();
        let schedule = match self.capture.arm(
            self.recorder.as_mut(),
            canvas.width,
            canvas.height,
            self.clock.total_ms(),
            now,
            &self.catalog.slug(),
        ) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "export could not start");
                self.last_error = Some(e.user_message());
                return Err(e);
            }
        };

        cancel(&mut self.scheduler, &mut self.restart_timer);
        self.clock.rewind(now);
        self.present_quietly();
        self.start_playing();

        // Sampling starts with the t=0 frame; the commit only marks Recording.
        self.capture_anchor_ms = now;
        self.capture_frame_timer = Some(
            self.scheduler
                .schedule_at(now, Event::CaptureFrame { index: 0 }),
        );
        self.capture_commit_timer = Some(
            self.scheduler
                .schedule_at(schedule.commit_at_ms, Event::CaptureCommit),
        );
        self.capture_deadline_timer = Some(
            self.scheduler
                .schedule_at(schedule.deadline_ms, Event::CaptureDeadline),
        );
        Ok(())
    }

    /// Render the frame for the current clock position and make it the surface.
    pub fn present(&mut self) -> SlidecastResult<&FrameRGBA> {
        let elapsed = self.clock.elapsed_ms(self.scheduler.now_ms());
        self.present_at(elapsed)?;
        self.surface
            .as_ref()
            .ok_or_else(|| SlidecastError::validation("no frame presented"))
    }

    /// Dispatch every event due up to `until_ms` in (due, insertion) order, then move time to
    /// `until_ms`.
    pub fn advance_to(&mut self, until_ms: f64) {
        let mut last_due = f64::NEG_INFINITY;
        let mut same_instant = 0u32;
        while let Some(due) = self.scheduler.next_due_ms() {
            if due > until_ms {
                break;
            }
            if due == last_due {
                same_instant += 1;
                if same_instant > MAX_EVENTS_PER_INSTANT {
                    tracing::warn!(due_ms = due, "event storm; stopping dispatch");
                    break;
                }
            } else {
                last_due = due;
                same_instant = 0;
            }
            let Some((_, event)) = self.scheduler.pop_due(until_ms) else {
                break;
            };
            self.dispatch(event);
        }
        if until_ms > self.scheduler.now_ms() {
            self.scheduler.advance_to(until_ms);
        }
    }

    /// Advance by `delta_ms` of virtual time.
    pub fn advance_by(&mut self, delta_ms: f64) {
        let until = self.scheduler.now_ms() + delta_ms.max(0.0);
        self.advance_to(until);
    }

    /// Run an export to completion in virtual time and return its artifact.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn export_offline(&mut self) -> SlidecastResult<Artifact> {
        self.export()?;
        while !self.capture.is_idle() {
            let Some(due) = self.scheduler.next_due_ms() else {
                self.capture.abort(self.recorder.as_mut());
                return Err(SlidecastError::capture("capture stalled with no pending events"));
            };
            self.advance_to(due);
        }
        if let Some(artifact) = self.artifact.take() {
            return Ok(artifact);
        }
        Err(SlidecastError::capture(
            self.last_error
                .clone()
                .unwrap_or_else(|| "capture produced no artifact".to_string()),
        ))
    }

    /// Pace the event queue against the wall clock until `stop` returns `true` or nothing is
    /// left to do.
    pub fn run_realtime(&mut self, mut stop: impl FnMut(&Player) -> bool) {
        let started = Instant::now();
        let base_ms = self.scheduler.now_ms();
        loop {
            let now = base_ms + started.elapsed().as_secs_f64() * 1000.0;
            self.advance_to(now);
            if stop(self) {
                break;
            }
            let Some(due) = self.scheduler.next_due_ms() else {
                break;
            };
            let wait_ms = (due - now).clamp(0.0, MAX_REALTIME_SLEEP_MS);
            if wait_ms > 0.0 {
                std::thread::sleep(Duration::from_secs_f64(wait_ms / 1000.0));
            }
        }
    }

    /// Nothing is playing, narrating, capturing or pending a restart.
    pub fn is_quiescent(&self) -> bool {
        !self.clock.is_playing()
            && self.narration.state() == NarrationState::Stopped
            && self.capture.is_idle()
            && self.restart_timer.is_none()
    }

    fn dispatch(&mut self, event: Event) {
        let now = self.scheduler.now_ms();
        match event {
            Event::FrameTick => {
                self.frame_timer = None;
                self.on_frame_tick(now);
            }
            Event::RestartResume => {
                self.restart_timer = None;
                self.start_playing();
            }
            Event::NarrationSettle { generation } => {
                self.settle_timer = None;
                self.narration.on_settled(
                    generation,
                    self.clock.is_playing(),
                    self.speech.as_mut(),
                    now,
                );
            }
            Event::SpeechPoll => {
                self.speech_timer = None;
            }
            Event::CaptureCommit => {
                self.capture_commit_timer = None;
                self.capture.commit();
            }
            Event::CaptureFrame { index } => {
                self.capture_frame_timer = None;
                self.on_capture_frame(index);
            }
            Event::CaptureDeadline => {
                self.capture_deadline_timer = None;
                self.on_capture_deadline(now);
            }
        }
        self.sync_speech(now);
    }

    /// Plan and present one frame, then commit its progress to the clock.
    fn on_frame_tick(&mut self, now: f64) {
        if !self.clock.is_playing() {
            return;
        }
        let elapsed = self.clock.elapsed_ms(now);
        let progress = match self.present_at(elapsed) {
            Ok(plan_progress) => plan_progress,
            Err(e) => {
                tracing::debug!(error = %e, "frame render failed; keeping previous surface");
                self.clock.progress_at(now)
            }
        };
        let commit = self.clock.commit_frame(progress, now);
        if commit.ended {
            tracing::info!(elapsed_ms = commit.elapsed_ms, "playback ended");
            self.stop_playback_side_effects();
            return;
        }
        self.schedule_next_tick(now);
    }

    fn on_capture_frame(&mut self, index: u64) {
        if !matches!(
            self.capture.status(),
            CaptureStatus::Armed | CaptureStatus::Recording
        ) {
            return;
        }
        if self.surface.is_none() {
            self.present_quietly();
        }
        if let Some(frame) = self.surface.as_ref()
            && let Err(e) = self.capture.capture_frame(self.recorder.as_mut(), frame)
        {
            self.fail_capture(e);
            return;
        }
        let next = index + 1;
        let due = self.opts.capture.fps.frame_time_ms(self.capture_anchor_ms, next);
        self.capture_frame_timer = Some(
            self.scheduler
                .schedule_at(due, Event::CaptureFrame { index: next }),
        );
    }

    fn on_capture_deadline(&mut self, now: f64) {
        cancel(&mut self.scheduler, &mut self.capture_frame_timer);
        cancel(&mut self.scheduler, &mut self.capture_commit_timer);
        cancel(&mut self.scheduler, &mut self.restart_timer);
        if self.clock.pause(now) {
            self.stop_playback_side_effects();
        }
        match self.capture.finalize(self.recorder.as_mut(), now) {
            Ok(artifact) => self.artifact = Some(artifact),
            Err(e) => self.fail_capture(e),
        }
    }

    fn fail_capture(&mut self, e: SlidecastError) {
        tracing::warn!(error = %e, "capture failed");
        cancel(&mut self.scheduler, &mut self.capture_frame_timer);
        cancel(&mut self.scheduler, &mut self.capture_commit_timer);
        cancel(&mut self.scheduler, &mut self.capture_deadline_timer);
        self.capture.abort(self.recorder.as_mut());
        self.last_error = Some(e.user_message());
    }

    fn start_playing(&mut self) {
        let now = self.scheduler.now_ms();
        if !self.clock.play(now) {
            return;
        }
        tracing::info!(progress = self.clock.progress(), "play");
        cancel(&mut self.scheduler, &mut self.frame_timer);
        self.tick_anchor_ms = now;
        self.tick_count = 0;
        self.frame_timer = Some(self.scheduler.schedule_at(now, Event::FrameTick));

        cancel(&mut self.scheduler, &mut self.settle_timer);
        if let Some(req) = self.narration.on_play_state(true, self.speech.as_mut()) {
            self.settle_timer = Some(self.scheduler.schedule_after(
                req.delay_ms,
                Event::NarrationSettle {
                    generation: req.generation,
                },
            ));
        }
    }

    /// Frame ticks and narration stop whenever the clock leaves Playing. Capture keeps running.
    fn stop_playback_side_effects(&mut self) {
        cancel(&mut self.scheduler, &mut self.frame_timer);
        cancel(&mut self.scheduler, &mut self.settle_timer);
        cancel(&mut self.scheduler, &mut self.speech_timer);
        self.narration.on_play_state(false, self.speech.as_mut());
    }

    fn schedule_next_tick(&mut self, now: f64) {
        let interval = self.opts.frame_interval_ms();
        // Skip ticks that are already late instead of bursting to catch up.
        let mut due;
        loop {
            self.tick_count += 1;
            due = self.tick_anchor_ms + self.tick_count as f64 * interval;
            if due > now {
                break;
            }
        }
        self.frame_timer = Some(self.scheduler.schedule_at(due, Event::FrameTick));
    }

    /// Deliver finished utterances and keep a poll timer armed while narration speaks.
    fn sync_speech(&mut self, now: f64) {
        for id in self.speech.poll_finished(now) {
            self.narration.on_utterance_end(
                id,
                self.clock.is_playing(),
                self.speech.as_mut(),
                now,
            );
        }
        cancel(&mut self.scheduler, &mut self.speech_timer);
        if !matches!(self.narration.state(), NarrationState::Speaking(_)) {
            return;
        }
        let due = self
            .speech
            .next_finish_hint_ms()
            .unwrap_or(now + SPEECH_POLL_MS)
            .max(now);
        self.speech_timer = Some(self.scheduler.schedule_at(due, Event::SpeechPoll));
    }

    fn present_at(&mut self, elapsed_ms: f64) -> SlidecastResult<f64> {
        let plan = self.renderer.plan(
            &self.catalog,
            elapsed_ms,
            &self.images,
            self.measure.as_mut(),
        );
        self.note_scene(&plan);
        let frame = self.backend.render_plan(&plan, &self.images)?;
        self.surface = Some(frame);
        self.frames_presented += 1;
        Ok(plan.progress)
    }

    fn present_quietly(&mut self) {
        let elapsed = self.clock.elapsed_ms(self.scheduler.now_ms());
        if let Err(e) = self.present_at(elapsed) {
            tracing::debug!(error = %e, "frame render failed");
        }
    }

    fn note_scene(&mut self, plan: &FramePlan) {
        if self.current_scene != Some(plan.scene.index) {
            self.current_scene = Some(plan.scene.index);
            tracing::debug!(
                scene = plan.scene.index,
                elapsed_ms = plan.elapsed_ms,
                "scene"
            );
        }
    }
}

fn cancel(scheduler: &mut Scheduler<Event>, slot: &mut Option<TimerId>) {
    if let Some(id) = slot.take() {
        scheduler.cancel(id);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/player.rs"]
mod tests;
