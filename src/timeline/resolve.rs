use crate::foundation::math::safe_ratio;
use crate::scene::catalog::SceneCatalog;
use crate::scene::model::Scene;

/// Active scene for one elapsed-time sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedScene {
    /// Index into the catalog.
    pub index: usize,
    /// Time since the scene started, in `[0, duration]`.
    pub local_ms: f64,
    /// `local_ms / duration`, or `0` for a zero-length scene.
    pub progress: f64,
}

/// Map elapsed time to the active scene of a (non-empty) catalog.
pub fn resolve(catalog: &SceneCatalog, elapsed_ms: f64) -> ResolvedScene {
    resolve_scenes(catalog.scenes(), elapsed_ms).unwrap_or(ResolvedScene {
        index: 0,
        local_ms: 0.0,
        progress: 0.0,
    })
}

/// Scan scenes in order; the first half-open window `[acc, acc + duration)` containing `t` wins.
///
/// `t` at or past the end resolves to the last scene with `local_ms == duration`. Negative and
/// NaN times resolve as `0`. Returns `None` only for an empty slice.
pub fn resolve_scenes(scenes: &[Scene], elapsed_ms: f64) -> Option<ResolvedScene> {
    let last = scenes.len().checked_sub(1)?;
    let t = if elapsed_ms.is_nan() {
        0.0
    } else {
        elapsed_ms.max(0.0)
    };

    let mut acc = 0.0;
    for (index, scene) in scenes.iter().enumerate() {
        let duration = scene.duration_ms as f64;
        if t < acc + duration {
            let local_ms = (t - acc).clamp(0.0, duration);
            return Some(ResolvedScene {
                index,
                local_ms,
                progress: safe_ratio(local_ms, duration),
            });
        }
        acc += duration;
    }

    let duration = scenes[last].duration_ms as f64;
    Some(ResolvedScene {
        index: last,
        local_ms: duration,
        progress: if duration > 0.0 { 1.0 } else { 0.0 },
    })
}

/// Start offset of each scene on the timeline.
pub fn scene_offsets_ms(scenes: &[Scene]) -> Vec<u64> {
    let mut acc = 0u64;
    scenes
        .iter()
        .map(|s| {
            let start = acc;
            acc = acc.saturating_add(s.duration_ms);
            start
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/resolve.rs"]
mod tests;
