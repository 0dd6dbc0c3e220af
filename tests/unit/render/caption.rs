use super::*;

fn mono(advance: f32) -> MonospaceMeasure {
    MonospaceMeasure {
        advance_px: advance,
    }
}

#[test]
fn short_text_fits_on_one_line() {
    let lines = wrap_caption("hello world", 1000.0, &mut mono(10.0));
    assert_eq!(lines, vec!["hello world".to_string()]);
}

#[test]
fn greedy_packing_breaks_at_width() {
    // "aa bb" = 50px, "aa bb cc" = 80px
    let lines = wrap_caption("aa bb cc dd", 50.0, &mut mono(10.0));
    assert_eq!(lines, vec!["aa bb", "cc dd"]);
}

#[test]
fn tiny_width_puts_each_word_on_its_own_line() {
    let text = "  The   Sun Temple\tat Konark\n was built  ";
    let lines = wrap_caption(text, 1.0, &mut mono(10.0));
    assert_eq!(lines, vec!["The", "Sun", "Temple", "at", "Konark", "was", "built"]);
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    assert_eq!(lines.join(" "), normalized);
}

#[test]
fn oversized_word_is_kept() {
    let lines = wrap_caption("a incomprehensibilities b", 30.0, &mut mono(10.0));
    assert_eq!(lines, vec!["a", "incomprehensibilities", "b"]);
}

#[test]
fn blank_text_yields_no_lines() {
    assert!(wrap_caption("   \n\t", 100.0, &mut mono(10.0)).is_empty());
}

#[test]
fn lines_are_laid_out_bottom_up() {
    let canvas = Canvas::HD_720;
    let style = CaptionStyle::default();
    let text = "word ".repeat(120);
    let lines = layout_caption(&text, canvas, &style, &mut MonospaceMeasure::default());
    assert!(lines.len() >= 2);

    let last = lines.last().unwrap();
    assert_eq!(last.baseline_y, 720.0 - 24.0);
    for pair in lines.windows(2) {
        assert_eq!(pair[1].baseline_y - pair[0].baseline_y, 30.0);
    }
    for line in &lines {
        assert_eq!(line.x, 24.0);
        assert!(MonospaceMeasure::default().measure(&line.text) <= style.max_line_width(canvas));
    }
}

#[test]
fn max_line_width_leaves_margins() {
    let style = CaptionStyle::default();
    assert_eq!(style.max_line_width(Canvas::HD_720), 1280.0 - 48.0);
}
