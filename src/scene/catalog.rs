use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::scene::model::Scene;

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    title: Option<String>,
    scenes: Vec<Scene>,
}

/// Ordered, immutable, non-empty list of scenes.
///
/// The total duration is computed once at construction and never changes.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneCatalog {
    title: Option<String>,
    scenes: Vec<Scene>,
    total_duration_ms: u64,
}

impl SceneCatalog {
    /// Build a validated catalog.
    pub fn new(scenes: Vec<Scene>) -> SlidecastResult<Self> {
        if scenes.is_empty() {
            return Err(SlidecastError::validation(
                "scene catalog must contain at least one scene",
            ));
        }
        for (i, scene) in scenes.iter().enumerate() {
            scene.validate().map_err(|e| match e {
                SlidecastError::Validation(msg) => {
                    SlidecastError::validation(format!("scene {i}: {msg}"))
                }
                other => other,
            })?;
        }
        Ok(Self::from_parts(None, scenes))
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn from_parts(title: Option<String>, scenes: Vec<Scene>) -> Self {
        let total_duration_ms = scenes.iter().map(|s| s.duration_ms).sum();
        Self {
            title,
            scenes,
            total_duration_ms,
        }
    }

    /// Parse and validate a catalog from JSON text.
    pub fn from_json_str(json: &str) -> SlidecastResult<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| SlidecastError::serde(e.to_string()))?;
        let catalog = Self::new(file.scenes)?;
        Ok(match file.title {
            Some(title) => catalog.with_title(title),
            None => catalog,
        })
    }

    /// Read, parse and validate a catalog JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> SlidecastResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read scene catalog '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Serialize back to the catalog file format.
    pub fn to_json_pretty(&self) -> SlidecastResult<String> {
        let file = CatalogFile {
            title: self.title.clone(),
            scenes: self.scenes.clone(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| SlidecastError::serde(e.to_string()))
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms
    }

    /// File-name friendly form of the title (`"untitled"` when there is none).
    pub fn slug(&self) -> String {
        let Some(title) = self.title.as_deref() else {
            return "untitled".to_owned();
        };
        let mut out = String::with_capacity(title.len());
        for ch in title.chars() {
            if ch.is_ascii_alphanumeric() {
                out.push(ch.to_ascii_lowercase());
            } else if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
        }
        let trimmed = out.trim_end_matches('_');
        if trimmed.is_empty() {
            "untitled".to_owned()
        } else {
            trimmed.to_owned()
        }
    }

    /// Built-in demo story: the Konark Sun Temple told by its chief architect.
    pub fn konark() -> Self {
        const BASE: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb";
        let scenes = vec![
            Scene::still(
                format!("{BASE}/6/68/Konark_Temple.JPG/1280px-Konark_Temple.JPG"),
                "I am the chief sthapati, leading the great wheel of Surya's chariot to rise from stone.",
                5000,
            )
            .with_zoom(1.0, 1.15)
            .with_pan_x(-0.1, 0.1),
            Scene::still(
                format!(
                    "{BASE}/5/5f/Konark_Temple_-_Another_View.jpg/1280px-Konark_Temple_-_Another_View.jpg"
                ),
                "Our craftsmen carve chlorite and khondalite, chisels singing as the sun crosses the sky.",
                5200,
            )
            .with_zoom(1.05, 1.2)
            .with_pan_y(-0.05, 0.05),
            Scene::still(
                format!(
                    "{BASE}/6/66/Konark_Sun_Temple_Front_View.jpg/1280px-Konark_Sun_Temple_Front_View.jpg"
                ),
                "Twelve pairs of stone wheels mark the hours; each spoke a measure of time and devotion.",
                5200,
            )
            .with_zoom(1.0, 1.1)
            .with_pan_x(-0.05, 0.05)
            .with_pan_y(0.02, -0.02),
            Scene::still(
                format!(
                    "{BASE}/9/97/Konark_Sun_Temple_Stone_Wheel.jpg/1280px-Konark_Sun_Temple_Stone_Wheel.jpg"
                ),
                "Each wheel is a cosmos: axle, rim, and spokes aligned with the cycles of life.",
                5200,
            )
            .with_zoom(1.1, 1.2)
            .with_pan_x(0.05, -0.05),
            Scene::still(
                format!(
                    "{BASE}/d/d3/Konark_Sun_Temple_Sculptures.jpg/1280px-Konark_Sun_Temple_Sculptures.jpg"
                ),
                "Dancers and musicians emerge from stone: ritual, rhythm, and the warmth of Surya.",
                5200,
            )
            .with_zoom(1.0, 1.12)
            .with_pan_y(0.05, -0.05),
            Scene::still(
                format!("{BASE}/f/f9/Konark_temple_ruins.JPG/1280px-Konark_temple_ruins.JPG"),
                "We raise the natamandira and jagamohana first; the sanctum will crown the journey.",
                5200,
            )
            .with_zoom(1.0, 1.1)
            .with_pan_x(0.05, -0.05),
            Scene::still(
                format!(
                    "{BASE}/e/e4/Konark_Sun_Temple_Wheel.jpg/1280px-Konark_Sun_Temple_Wheel.jpg"
                ),
                "Iron clamps bind the blocks; hidden channels drain the monsoon, strength in every joint.",
                5200,
            )
            .with_zoom(1.1, 1.18)
            .with_pan_x(-0.04, 0.04)
            .with_pan_y(0.02, -0.02),
            Scene::still(
                format!(
                    "{BASE}/1/10/Konark_Sun_Temple_Nataplan.jpg/1024px-Konark_Sun_Temple_Nataplan.jpg"
                ),
                "Proportions follow shilpa shastra; each measure aligns with the course of the sun.",
                5200,
            )
            .with_zoom(1.0, 1.1)
            .with_pan_y(-0.03, 0.03),
            Scene::still(
                format!(
                    "{BASE}/7/7d/Konark_Sun_Temple_Ruins.jpg/1280px-Konark_Sun_Temple_Ruins.jpg"
                ),
                "As the chariot nears completion, we consecrate the space with light and mantra.",
                5200,
            )
            .with_zoom(1.05, 1.18)
            .with_pan_x(0.03, -0.03),
        ];
        Self::from_parts(Some("Konark Maker Story".to_owned()), scenes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/catalog.rs"]
mod tests;
