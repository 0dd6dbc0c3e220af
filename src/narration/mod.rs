//! Spoken captions, sequenced against play/pause transitions.

/// espeak-ng process speech engine.
pub mod espeak;
/// Narration state machine.
pub mod sequencer;
/// Speech engine boundary and the silent engine.
pub mod speech;
/// Voice selection.
pub mod voice;
