use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::scene::catalog::SceneCatalog;

/// Decoded image, premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Load result for one image reference.
///
/// A handle that is not `ready` stays that way; the renderer simply skips the image.
#[derive(Clone, Debug)]
pub struct ImageHandle {
    pub source: String,
    pub ready: bool,
    pub natural_width: u32,
    pub natural_height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl ImageHandle {
    pub fn unavailable(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ready: false,
            natural_width: 0,
            natural_height: 0,
            rgba8_premul: Arc::new(Vec::new()),
        }
    }

    pub fn from_prepared(source: impl Into<String>, img: PreparedImage) -> Self {
        Self {
            source: source.into(),
            ready: img.width > 0 && img.height > 0,
            natural_width: img.width,
            natural_height: img.height,
            rgba8_premul: img.rgba8_premul,
        }
    }

    /// Solid-color image, mostly for tests and placeholders.
    pub fn solid(source: impl Into<String>, width: u32, height: u32, rgba_premul: [u8; 4]) -> Self {
        let n = (width as usize).saturating_mul(height as usize);
        let bytes = rgba_premul.repeat(n);
        Self::from_prepared(
            source,
            PreparedImage {
                width,
                height,
                rgba8_premul: Arc::new(bytes),
            },
        )
    }
}

/// Resolves scene image references.
pub trait ImageProvider {
    /// Never fails: problems are reported as an unavailable handle.
    fn load(&mut self, source: &str) -> ImageHandle;
}

/// Reads images from the local filesystem relative to `root`.
///
/// Remote references (`http://`, `https://`) are not fetched and load as unavailable.
#[derive(Clone, Debug)]
pub struct FileImageProvider {
    root: PathBuf,
}

impl FileImageProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn try_load(&self, source: &str) -> SlidecastResult<PreparedImage> {
        if is_remote(source) {
            return Err(SlidecastError::image_unavailable(format!(
                "remote image '{source}' is not fetched"
            )));
        }
        let rel = normalize_rel_path(source)?;
        let path = self.root.join(Path::new(&rel));
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read image '{}'", path.display()))?;
        decode_image(&bytes)
    }
}

impl ImageProvider for FileImageProvider {
    fn load(&mut self, source: &str) -> ImageHandle {
        match self.try_load(source) {
            Ok(img) => ImageHandle::from_prepared(source, img),
            Err(e) => {
                tracing::warn!(source, error = %e, "image unavailable");
                ImageHandle::unavailable(source)
            }
        }
    }
}

/// Per-scene image handles, loaded once up front.
#[derive(Clone, Debug, Default)]
pub struct ImageSet {
    handles: Vec<ImageHandle>,
}

impl ImageSet {
    /// Load every scene image; repeated references are loaded once.
    pub fn load(catalog: &SceneCatalog, provider: &mut dyn ImageProvider) -> Self {
        let mut seen = HashMap::<&str, ImageHandle>::new();
        let handles = catalog
            .scenes()
            .iter()
            .map(|scene| {
                seen.entry(scene.image.as_str())
                    .or_insert_with(|| provider.load(&scene.image))
                    .clone()
            })
            .collect::<Vec<_>>();
        let ready = handles.iter().filter(|h| h.ready).count();
        tracing::debug!(ready, total = handles.len(), "scene images loaded");
        Self { handles }
    }

    pub fn from_handles(handles: Vec<ImageHandle>) -> Self {
        Self { handles }
    }

    /// Every scene image unavailable.
    pub fn unavailable(catalog: &SceneCatalog) -> Self {
        Self {
            handles: catalog
                .scenes()
                .iter()
                .map(|s| ImageHandle::unavailable(&s.image))
                .collect(),
        }
    }

    /// Ready image for a scene, if any.
    pub fn get(&self, scene_index: usize) -> Option<&ImageHandle> {
        self.handles.get(scene_index).filter(|h| h.ready)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Normalize a catalog-relative image path.
///
/// Uses `/` separators, drops `.` segments and rejects absolute paths or `..` traversal.
pub(crate) fn normalize_rel_path(source: &str) -> SlidecastResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(SlidecastError::validation("image paths must be relative"));
    }
    if s.is_empty() {
        return Err(SlidecastError::validation("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(SlidecastError::validation("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(SlidecastError::validation(
            "image path must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

pub fn decode_image(bytes: &[u8]) -> SlidecastResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image.rs"]
mod tests;
