use super::*;
use crate::foundation::core::Canvas;
use crate::scene::model::Scene;

fn small_opts() -> PlayerOpts {
    PlayerOpts {
        canvas: Canvas::new(64, 36).unwrap(),
        ..PlayerOpts::default()
    }
}

fn short_catalog() -> SceneCatalog {
    SceneCatalog::new(vec![
        Scene::still("a.png", "first scene", 200),
        Scene::still("b.png", "second scene", 300),
    ])
    .unwrap()
    .with_title("Short Story")
}

fn narrated_catalog() -> SceneCatalog {
    SceneCatalog::new(vec![
        Scene::still("a.png", "alpha", 2000),
        Scene::still("b.png", "beta", 2000),
    ])
    .unwrap()
}

struct RefusingRecorder;

impl MediaRecorder for RefusingRecorder {
    fn mime(&self) -> &str {
        "video/none"
    }
    fn file_extension(&self) -> &str {
        "none"
    }
    fn start(&mut self, _cfg: crate::capture::recorder::RecorderConfig) -> SlidecastResult<()> {
        Err(SlidecastError::capture_unsupported("no encoder available"))
    }
    fn push_frame(
        &mut self,
        _frame: &FrameRGBA,
    ) -> SlidecastResult<Vec<crate::capture::recorder::MediaChunk>> {
        Ok(Vec::new())
    }
    fn stop(&mut self) -> SlidecastResult<Vec<crate::capture::recorder::MediaChunk>> {
        Ok(Vec::new())
    }
}

#[test]
fn play_runs_to_the_end_and_pauses() {
    let mut p = Player::headless(short_catalog(), small_opts());
    p.play();
    assert!(p.is_playing());
    p.advance_to(250.0);
    assert!(p.is_playing());
    assert!((p.elapsed_ms() - 250.0).abs() < 1e-9);

    p.advance_to(1000.0);
    assert!(!p.is_playing());
    assert_eq!(p.clock().progress(), 1.0);
    assert_eq!(p.narration().state(), NarrationState::Stopped);
    assert!(p.frame_timer.is_none());
    assert!(p.is_quiescent());
}

#[test]
fn pause_stops_frame_ticks() {
    let mut p = Player::headless(short_catalog(), small_opts());
    p.play();
    p.advance_to(100.0);
    p.pause();
    let frozen = p.elapsed_ms();
    let presented = p.frames_presented();
    p.advance_to(400.0);
    assert_eq!(p.frames_presented(), presented);
    assert_eq!(p.elapsed_ms(), frozen);
    assert!((frozen - 100.0).abs() < 1e-9);
}

#[test]
fn pause_then_play_resumes_without_a_jump() {
    let mut p = Player::headless(short_catalog(), small_opts());
    p.play();
    p.advance_to(120.0);
    p.pause();
    p.advance_to(5000.0);
    p.play();
    assert!((p.elapsed_ms() - 120.0).abs() < 1e-9);
    p.advance_by(30.0);
    assert!((p.elapsed_ms() - 150.0).abs() < 1e-9);
}

#[test]
fn seek_while_paused_presents_the_new_position() {
    let mut p = Player::headless(short_catalog(), small_opts());
    p.seek(0.5).unwrap();
    assert_eq!(p.elapsed_ms(), 250.0);
    assert_eq!(p.current_scene, Some(1));
    assert!(p.surface().is_some());
    assert!(p.seek(f64::NAN).is_err());
    assert_eq!(p.elapsed_ms(), 250.0);
}

#[test]
fn restart_rewinds_and_resumes_after_the_gap() {
    let mut p = Player::headless(short_catalog(), small_opts());
    p.play();
    p.advance_to(150.0);
    p.restart();
    assert!(!p.is_playing());
    assert_eq!(p.elapsed_ms(), 0.0);

    p.advance_to(190.0);
    assert!(!p.is_playing());
    p.advance_to(200.0);
    assert!(p.is_playing());
    assert_eq!(p.elapsed_ms(), 0.0);
}

#[test]
fn pause_cancels_a_pending_restart() {
    let mut p = Player::headless(short_catalog(), small_opts());
    p.play();
    p.advance_to(50.0);
    p.restart();
    p.pause();
    p.advance_to(500.0);
    assert!(!p.is_playing());
    assert!(p.restart_timer.is_none());
}

#[test]
fn narration_walks_captions_in_order() {
    let mut p = Player::headless(narrated_catalog(), small_opts());
    p.play();
    assert_eq!(p.narration().state(), NarrationState::Settling);
    p.advance_to(200.0);
    assert_eq!(p.narration().state(), NarrationState::Settling);

    // "alpha" and "beta" are estimated at 383 ms each.
    p.advance_to(300.0);
    assert_eq!(p.narration().state(), NarrationState::Speaking(0));
    p.advance_to(700.0);
    assert_eq!(p.narration().state(), NarrationState::Speaking(1));
    p.advance_to(1100.0);
    assert_eq!(p.narration().state(), NarrationState::Stopped);
    assert!(p.is_playing());
}

#[test]
fn pause_cancels_narration_and_settle() {
    let mut p = Player::headless(narrated_catalog(), small_opts());
    p.play();
    p.advance_to(100.0);
    p.pause();
    assert_eq!(p.narration().state(), NarrationState::Stopped);
    assert!(p.settle_timer.is_none());
    p.advance_to(1000.0);
    assert_eq!(p.narration().state(), NarrationState::Stopped);
}

#[test]
fn export_records_for_total_plus_margin() {
    let mut p = Player::headless(short_catalog(), small_opts());
    let art = p.export_offline().unwrap();
    assert_eq!(art.file_name, "short_story.rgba");
    assert_eq!(art.duration_ms, 750.0);
    // Frames every 33.3 ms from arming at 0 until the 750 ms deadline.
    assert_eq!(art.frame_count, 23);
    assert_eq!(art.bytes.len(), 23 * 64 * 36 * 4);
    assert!(!p.is_playing());
    assert!(p.capture_status() == CaptureStatus::Idle);
    assert!(p.last_error().is_none());
}

#[test]
fn export_samples_frames_during_the_startup_delay() {
    let mut p = Player::headless(short_catalog(), small_opts());
    p.export().unwrap();
    p.advance_to(0.0);
    assert_eq!(p.capture_status(), CaptureStatus::Armed);
    assert_eq!(p.capture.session().unwrap().frames, 1);
    p.advance_to(50.0);
    assert_eq!(p.capture.session().unwrap().frames, 2);
    p.advance_to(110.0);
    assert_eq!(p.capture_status(), CaptureStatus::Recording);
    assert_eq!(p.capture.session().unwrap().frames, 4);
}

#[test]
fn export_deadline_ignores_pause_and_restart() {
    let mut p = Player::headless(short_catalog(), small_opts());
    p.export().unwrap();
    assert!(p.is_playing());
    p.advance_to(200.0);
    p.pause();
    p.advance_to(300.0);
    p.restart();
    p.advance_to(749.0);
    assert_eq!(p.capture_status(), CaptureStatus::Recording);
    p.advance_to(750.0);
    assert_eq!(p.capture_status(), CaptureStatus::Idle);
    let art = p.take_artifact().unwrap();
    assert_eq!(art.duration_ms, 750.0);
    assert!(!p.is_playing());
}

#[test]
fn second_export_is_rejected() {
    let mut p = Player::headless(short_catalog(), small_opts());
    p.export().unwrap();
    p.advance_to(150.0);
    let err = p.export().unwrap_err();
    assert!(matches!(err, SlidecastError::Validation(_)));
    assert_eq!(p.capture_status(), CaptureStatus::Recording);
    p.advance_to(2000.0);
    assert!(p.take_artifact().is_some());
}

#[test]
fn export_start_failure_leaves_clock_untouched() {
    let catalog = short_catalog();
    let mut parts = Collaborators::headless(&catalog);
    parts.recorder = Box::new(RefusingRecorder);
    let mut p = Player::new(catalog, small_opts(), parts);
    p.seek(0.4).unwrap();

    assert!(p.export().is_err());
    assert!(!p.is_playing());
    assert_eq!(p.elapsed_ms(), 200.0);
    assert_eq!(p.capture_status(), CaptureStatus::Idle);
    assert!(
        p.last_error()
            .unwrap()
            .starts_with("Video export is not supported")
    );

    p.play();
    assert!(p.last_error().is_none());
}

#[test]
fn offline_export_is_deterministic() {
    let a = Player::headless(short_catalog(), small_opts())
        .export_offline()
        .unwrap();
    let b = Player::headless(short_catalog(), small_opts())
        .export_offline()
        .unwrap();
    assert_eq!(a.sha256_hex(), b.sha256_hex());
}
