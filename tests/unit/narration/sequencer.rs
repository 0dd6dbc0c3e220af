use super::*;
use crate::narration::speech::SilentSpeech;

fn seq() -> NarrationSequencer {
    NarrationSequencer::new(
        vec!["one".into(), "two two".into(), "three".into()],
        NarrationOpts::default(),
    )
}

fn finish_current(s: &mut NarrationSequencer, speech: &mut SilentSpeech, now: f64) {
    for id in speech.poll_finished(now) {
        s.on_utterance_end(id, true, speech, now);
    }
}

#[test]
fn play_requests_a_settle_timer() {
    let mut s = seq();
    let mut speech = SilentSpeech::new();
    let req = s.on_play_state(true, &mut speech).unwrap();
    assert_eq!(req.delay_ms, 250.0);
    assert_eq!(req.generation, s.generation());
    assert_eq!(s.state(), NarrationState::Settling);
    assert!(speech.spoken().is_empty());
}

#[test]
fn settled_narration_speaks_scenes_in_order() {
    let mut s = seq();
    let mut speech = SilentSpeech::new();
    let req = s.on_play_state(true, &mut speech).unwrap();
    assert!(s.on_settled(req.generation, true, &mut speech, 250.0));
    assert_eq!(s.state(), NarrationState::Speaking(0));

    finish_current(&mut s, &mut speech, 1e6);
    assert_eq!(s.state(), NarrationState::Speaking(1));
    finish_current(&mut s, &mut speech, 2e6);
    assert_eq!(s.state(), NarrationState::Speaking(2));
    finish_current(&mut s, &mut speech, 3e6);
    assert_eq!(s.state(), NarrationState::Stopped);

    let texts = speech.spoken().iter().map(|u| u.text.as_str()).collect::<Vec<_>>();
    assert_eq!(texts, vec!["one", "two two", "three"]);
    assert!(speech.spoken().iter().all(|u| u.rate == 0.95 && u.pitch == 1.0 && u.volume == 1.0));
}

#[test]
fn pause_cancels_and_stale_events_are_ignored() {
    let mut s = seq();
    let mut speech = SilentSpeech::new();
    let req = s.on_play_state(true, &mut speech).unwrap();
    s.on_settled(req.generation, true, &mut speech, 250.0);
    let stale = s.in_flight().unwrap();

    assert!(s.on_play_state(false, &mut speech).is_none());
    assert_eq!(s.state(), NarrationState::Stopped);
    assert!(!speech.is_speaking());

    s.on_utterance_end(stale, true, &mut speech, 1e6);
    assert_eq!(s.state(), NarrationState::Stopped);
    assert!(!s.on_settled(req.generation, true, &mut speech, 1e6));
    assert_eq!(speech.spoken().len(), 1);
}

#[test]
fn replay_restarts_from_first_scene() {
    let mut s = seq();
    let mut speech = SilentSpeech::new();
    let req = s.on_play_state(true, &mut speech).unwrap();
    s.on_settled(req.generation, true, &mut speech, 0.0);
    finish_current(&mut s, &mut speech, 1e6);
    assert_eq!(s.state(), NarrationState::Speaking(1));

    s.on_play_state(false, &mut speech);
    let again = s.on_play_state(true, &mut speech).unwrap();
    assert!(again.generation > req.generation);
    assert!(!s.on_settled(req.generation, true, &mut speech, 2e6));
    assert!(s.on_settled(again.generation, true, &mut speech, 2e6));
    assert_eq!(s.state(), NarrationState::Speaking(0));
    assert_eq!(speech.spoken().last().unwrap().text, "one");
}

#[test]
fn settle_while_paused_does_nothing() {
    let mut s = seq();
    let mut speech = SilentSpeech::new();
    let req = s.on_play_state(true, &mut speech).unwrap();
    assert!(!s.on_settled(req.generation, false, &mut speech, 0.0));
    assert!(speech.spoken().is_empty());
}

#[test]
fn voice_is_picked_from_provider() {
    let mut s = seq();
    let mut speech = SilentSpeech::new().with_voices(vec![
        Voice::new("Thomas", "fr-FR"),
        Voice::new("Microsoft Heera", "en-IN"),
    ]);
    let req = s.on_play_state(true, &mut speech).unwrap();
    s.on_settled(req.generation, true, &mut speech, 0.0);
    assert_eq!(s.voice().unwrap().name, "Microsoft Heera");
    assert_eq!(
        speech.spoken()[0].voice.as_ref().unwrap().name,
        "Microsoft Heera"
    );
}

#[test]
fn missing_voice_uses_engine_default() {
    let mut s = seq();
    let mut speech = SilentSpeech::new();
    let req = s.on_play_state(true, &mut speech).unwrap();
    assert!(s.on_settled(req.generation, true, &mut speech, 0.0));
    assert!(s.voice().is_none());
    assert!(speech.spoken()[0].voice.is_none());
}

#[test]
fn speak_failure_stops_narration_quietly() {
    let mut s = seq();
    let mut speech = SilentSpeech::new().failing();
    let req = s.on_play_state(true, &mut speech).unwrap();
    assert!(!s.on_settled(req.generation, true, &mut speech, 0.0));
    assert_eq!(s.state(), NarrationState::Stopped);
}
