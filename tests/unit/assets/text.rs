use super::*;

const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

fn engine_if_present() -> Option<TextLayoutEngine> {
    let bytes = load_font(SYSTEM_FONT).ok()?;
    Some(TextLayoutEngine::new(bytes).unwrap())
}

#[test]
fn garbage_font_bytes_are_rejected() {
    assert!(TextLayoutEngine::new(Arc::new(b"definitely not a font".to_vec())).is_err());
}

#[test]
fn missing_font_file_is_an_error() {
    assert!(load_font("/nonexistent/slidecast/font.ttf").is_err());
}

#[test]
fn text_layout_smoke_with_local_font_if_present() {
    let Some(mut engine) = engine_if_present() else {
        return;
    };
    assert!(!engine.family_name().is_empty());

    let layout = engine
        .layout_plain(
            "hello",
            24.0,
            TextBrushRgba8 {
                r: 255,
                g: 255,
                b: 255,
                a: 255,
            },
        )
        .unwrap();
    assert!(layout.lines().next().is_some());
    assert!(engine.layout_plain("x", 0.0, TextBrushRgba8::default()).is_err());
}

#[test]
fn measure_grows_with_text_if_font_present() {
    let Some(engine) = engine_if_present() else {
        return;
    };
    let mut m = ParleyMeasure::new(engine, 24.0);
    let short = m.measure("Konark");
    let long = m.measure("Konark Sun Temple");
    assert!(short > 0.0);
    assert!(long > short);
}

#[test]
fn shaped_glyphs_sit_on_the_baseline_if_font_present() {
    let Some(mut engine) = engine_if_present() else {
        return;
    };
    let glyphs = engine.shape_line("abc", 24.0).unwrap();
    assert_eq!(glyphs.len(), 3);
    assert!(glyphs.windows(2).all(|w| w[1].x > w[0].x));
    assert!(glyphs.iter().all(|g| g.y.abs() < 1e-3));
}
