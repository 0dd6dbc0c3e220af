use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::foundation::math::safe_ratio;

/// Mutable playback state owned by [`TimelineClock`].
///
/// While playing, elapsed time is `now - origin_ms`. While paused it is frozen at
/// `progress * total`, and `progress` is authoritative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Fraction of the total duration elapsed, in `[0, 1]`.
    pub progress: f64,
    /// Wall-clock reference used while playing.
    pub origin_ms: f64,
}

/// Result of committing one presented frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameCommit {
    pub elapsed_ms: f64,
    /// The clock reached the end while playing and paused itself.
    pub ended: bool,
}

/// Converts wall-clock samples into one elapsed-time scalar in `[0, total]`.
///
/// All operations take the current time explicitly so the clock can run against wall time or a
/// virtual scheduler time alike.
#[derive(Clone, Debug)]
pub struct TimelineClock {
    total_ms: f64,
    state: PlaybackState,
}

impl TimelineClock {
    pub fn new(total_duration_ms: u64) -> Self {
        Self {
            total_ms: total_duration_ms as f64,
            state: PlaybackState {
                is_playing: false,
                progress: 0.0,
                origin_ms: 0.0,
            },
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }

    /// Stored progress; authoritative while paused, last committed value while playing.
    pub fn progress(&self) -> f64 {
        self.state.progress
    }

    /// Elapsed time at `now_ms`, clamped to `[0, total]`.
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        let raw = if self.state.is_playing {
            now_ms - self.state.origin_ms
        } else {
            self.state.progress * self.total_ms
        };
        if raw.is_nan() {
            return 0.0;
        }
        raw.clamp(0.0, self.total_ms)
    }

    /// Normalized elapsed fraction at `now_ms`.
    pub fn progress_at(&self, now_ms: f64) -> f64 {
        safe_ratio(self.elapsed_ms(now_ms), self.total_ms).clamp(0.0, 1.0)
    }

    /// Paused -> Playing, continuing from the current progress. Returns `false` if already playing.
    pub fn play(&mut self, now_ms: f64) -> bool {
        if self.state.is_playing {
            return false;
        }
        self.state.origin_ms = now_ms - self.state.progress * self.total_ms;
        self.state.is_playing = true;
        true
    }

    /// Playing -> Paused, freezing progress at the instantaneous elapsed fraction.
    /// Returns `false` if already paused.
    pub fn pause(&mut self, now_ms: f64) -> bool {
        if !self.state.is_playing {
            return false;
        }
        self.state.progress = self.progress_at(now_ms);
        self.state.is_playing = false;
        true
    }

    /// Set progress directly; legal in either state.
    pub fn seek(&mut self, progress: f64, now_ms: f64) -> SlidecastResult<()> {
        if !progress.is_finite() {
            return Err(SlidecastError::validation(format!(
                "seek progress must be finite (got {progress})"
            )));
        }
        let p = progress.clamp(0.0, 1.0);
        self.state.progress = p;
        if self.state.is_playing {
            self.state.origin_ms = now_ms - p * self.total_ms;
        }
        Ok(())
    }

    /// Back to progress 0 in either state.
    pub(crate) fn rewind(&mut self, now_ms: f64) {
        self.state.progress = 0.0;
        if self.state.is_playing {
            self.state.origin_ms = now_ms;
        }
    }

    /// Commit the progress computed for a presented frame.
    ///
    /// Reaching the upper bound while playing pauses the clock (end of playback).
    pub fn commit_frame(&mut self, progress: f64, now_ms: f64) -> FrameCommit {
        if !self.state.is_playing {
            return FrameCommit {
                elapsed_ms: self.elapsed_ms(now_ms),
                ended: false,
            };
        }
        self.state.progress = progress.clamp(0.0, 1.0);
        let elapsed_ms = self.elapsed_ms(now_ms);
        let ended = elapsed_ms >= self.total_ms;
        if ended {
            self.state.progress = 1.0;
            self.state.is_playing = false;
        }
        FrameCommit { elapsed_ms, ended }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/clock.rs"]
mod tests;
