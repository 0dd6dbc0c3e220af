/// Player configuration and environment overrides.
pub mod opts;
/// Playback orchestration.
pub mod player;
