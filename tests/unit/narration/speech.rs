use super::*;

fn utt(text: &str) -> Utterance {
    Utterance {
        text: text.to_string(),
        voice: None,
        rate: 1.0,
        pitch: 1.0,
        volume: 1.0,
    }
}

#[test]
fn estimate_scales_with_words_and_rate() {
    let one = estimate_speech_ms("word", 1.0);
    assert_eq!(estimate_speech_ms("a b c d", 1.0), (4.0 * 60_000.0 / NARRATION_WPM).round());
    assert!(estimate_speech_ms("word", 0.5) > one);
    assert_eq!(estimate_speech_ms("", 1.0), one);
    assert_eq!(estimate_speech_ms("word", f32::NAN), one);
}

#[test]
fn utterances_finish_back_to_back() {
    let mut s = SilentSpeech::new();
    let a = s.speak(utt("one two"), 100.0).unwrap();
    let b = s.speak(utt("three"), 150.0).unwrap();
    let da = estimate_speech_ms("one two", 1.0);
    let db = estimate_speech_ms("three", 1.0);

    assert_eq!(s.next_finish_hint_ms(), Some(100.0 + da));
    assert!(s.poll_finished(100.0 + da - 1.0).is_empty());
    assert_eq!(s.poll_finished(100.0 + da), vec![a]);
    assert_eq!(s.next_finish_hint_ms(), Some(100.0 + da + db));
    assert_eq!(s.poll_finished(1e9), vec![b]);
    assert!(!s.is_speaking());
    assert_eq!(s.next_finish_hint_ms(), None);
    assert_eq!(s.spoken().len(), 2);
}

#[test]
fn cancel_drops_queue_without_completions() {
    let mut s = SilentSpeech::new();
    s.speak(utt("one"), 0.0).unwrap();
    s.speak(utt("two"), 0.0).unwrap();
    s.cancel();
    assert!(s.poll_finished(1e9).is_empty());
    assert_eq!(s.next_finish_hint_ms(), None);

    let c = s.speak(utt("three"), 5000.0).unwrap();
    assert_eq!(
        s.poll_finished(5000.0 + estimate_speech_ms("three", 1.0)),
        vec![c]
    );
}

#[test]
fn failing_engine_reports_voice_unavailable() {
    let mut s = SilentSpeech::new().failing();
    let err = s.speak(utt("x"), 0.0).unwrap_err();
    assert!(err.is_degraded_mode());
    assert!(s.spoken().is_empty());
}
