/// Play/pause/seek clock over a fixed total duration.
pub mod clock;
/// Elapsed time to active scene mapping.
pub mod resolve;
