use std::io::Cursor;

use super::*;
use crate::scene::model::Scene;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("slidecast_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_garbage_is_an_error() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("/etc/passwd").is_err());
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./.").is_err());
}

#[test]
fn file_provider_loads_local_png() {
    let dir = temp_dir("provider_ok");
    std::fs::write(dir.join("red.png"), png_bytes(4, 3, [255, 0, 0, 255])).unwrap();

    let mut provider = FileImageProvider::new(&dir);
    let h = provider.load("red.png");
    assert!(h.ready);
    assert_eq!((h.natural_width, h.natural_height), (4, 3));
    assert_eq!(&h.rgba8_premul[..4], &[255, 0, 0, 255]);
}

#[test]
fn missing_and_remote_images_are_unavailable() {
    let dir = temp_dir("provider_missing");
    let mut provider = FileImageProvider::new(&dir);
    assert!(!provider.load("nope.png").ready);
    assert!(!provider.load("https://example.org/a.jpg").ready);
    assert!(!provider.load("../escape.png").ready);
}

struct CountingProvider {
    calls: usize,
}

impl ImageProvider for CountingProvider {
    fn load(&mut self, source: &str) -> ImageHandle {
        self.calls += 1;
        if source == "bad.png" {
            ImageHandle::unavailable(source)
        } else {
            ImageHandle::solid(source, 2, 2, [1, 2, 3, 255])
        }
    }
}

#[test]
fn image_set_dedupes_and_hides_unready_handles() {
    let catalog = SceneCatalog::new(vec![
        Scene::still("a.png", "one", 10),
        Scene::still("bad.png", "two", 10),
        Scene::still("a.png", "three", 10),
    ])
    .unwrap();
    let mut provider = CountingProvider { calls: 0 };
    let set = ImageSet::load(&catalog, &mut provider);
    assert_eq!(provider.calls, 2);
    assert_eq!(set.len(), 3);
    assert!(set.get(0).is_some());
    assert!(set.get(1).is_none());
    assert!(set.get(2).is_some());
    assert!(set.get(3).is_none());

    let none = ImageSet::unavailable(&catalog);
    assert!((0..3).all(|i| none.get(i).is_none()));
}
