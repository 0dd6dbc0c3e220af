use crate::foundation::core::{Canvas, Rgba8Premul};

/// Measures the advance width of a run of text in pixels.
pub trait TextMeasure {
    fn measure(&mut self, text: &str) -> f32;
}

/// Fixed advance per character.
///
/// Deterministic stand-in when no font is configured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasure {
    pub advance_px: f32,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        // Average advance of a 24 px sans face.
        Self { advance_px: 12.0 }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&mut self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance_px
    }
}

/// Caption typography and placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptionStyle {
    pub font_size_px: f32,
    /// Left margin and distance of the last baseline from the bottom edge.
    pub margin_px: f64,
    /// Baseline-to-baseline distance.
    pub line_pitch_px: f64,
    pub color: Rgba8Premul,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_size_px: 24.0,
            margin_px: 24.0,
            line_pitch_px: 30.0,
            color: Rgba8Premul::from_straight_rgba(255, 255, 255, 255),
        }
    }
}

impl CaptionStyle {
    pub fn max_line_width(&self, canvas: Canvas) -> f32 {
        (canvas.width_f64() - 2.0 * self.margin_px).max(0.0) as f32
    }
}

/// One positioned caption line; `baseline_y` is the text baseline.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionLine {
    pub text: String,
    pub x: f64,
    pub baseline_y: f64,
}

/// Greedy word wrap.
///
/// Words are separated by any whitespace and re-joined with single spaces. A word wider than
/// `max_width` still gets a line of its own; no word is ever dropped or split.
pub fn wrap_caption(text: &str, max_width: f32, measure: &mut dyn TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure.measure(&candidate) > max_width {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Wrap and place a caption bottom-up: the last line sits `margin` above the bottom edge and each
/// earlier line one pitch higher.
pub fn layout_caption(
    text: &str,
    canvas: Canvas,
    style: &CaptionStyle,
    measure: &mut dyn TextMeasure,
) -> Vec<CaptionLine> {
    let lines = wrap_caption(text, style.max_line_width(canvas), measure);
    let last_baseline = canvas.height_f64() - style.margin_px;
    let n = lines.len();
    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| CaptionLine {
            text,
            x: style.margin_px,
            baseline_y: last_baseline - (n - 1 - i) as f64 * style.line_pitch_px,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/caption.rs"]
mod tests;
