//! Text layout and rasterization.
//!
//! Lines split on `\n` are laid out top-down from the element's top edge,
//! `font_size * line_height` apart, each anchored left, center, or right
//! inside the element box. A line wider than the box is condensed
//! horizontally to fit.

use rusttype::{point, Font, Scale};
use slidecast_project_model::{ElementFrame, TextAlign, TextProps};
use tiny_skia::{Color, ColorU8, Pixmap};

/// Placement of one text line in canvas space.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    pub text: String,
    /// Left edge of the drawn line.
    pub x: f64,
    /// Top of the line box.
    pub y: f64,
    /// Unscaled advance width of the line.
    pub natural_width: f64,
    /// Horizontal squeeze in `(0, 1]` applied when the line overflows.
    pub condense: f64,
}

impl LineLayout {
    /// Width after condensing.
    pub fn drawn_width(&self) -> f64 {
        self.natural_width * self.condense
    }
}

/// Lay out text lines. `measure` returns the advance width of a line at the
/// element's font size.
pub fn layout_lines(
    props: &TextProps,
    frame: &ElementFrame,
    measure: impl Fn(&str) -> f64,
) -> Vec<LineLayout> {
    let advance = props.font_size * props.line_height;

    props
        .content
        .split('\n')
        .enumerate()
        .map(|(i, raw)| {
            let text = raw.trim_end_matches('\r').to_string();
            let natural_width = measure(&text).max(0.0);
            let condense = if natural_width > frame.width && natural_width > 0.0 {
                frame.width / natural_width
            } else {
                1.0
            };
            let drawn = natural_width * condense;
            let x = match props.text_align {
                TextAlign::Left => frame.x,
                TextAlign::Center => frame.x + frame.width / 2.0 - drawn / 2.0,
                TextAlign::Right => frame.right() - drawn,
            };
            LineLayout {
                text,
                x,
                y: frame.y + i as f64 * advance,
                natural_width,
                condense,
            }
        })
        .collect()
}

/// Advance width of `text` at `px` pixels.
pub fn measure_line(font: &Font<'_>, text: &str, px: f32) -> f64 {
    let scale = Scale::uniform(px);
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
        .max(0.0) as f64
}

/// Longest side, in pixels, of a single rasterized line.
pub const MAX_LINE_EXTENT: u32 = 4096;

/// Rasterize one line into its own pixmap, top edge at y = 0. Returns
/// `None` for empty lines and for lines too large to rasterize.
pub fn rasterize_line(font: &Font<'_>, text: &str, px: f32, color: Color) -> Option<Pixmap> {
    if !px.is_finite() || px <= 0.0 {
        return None;
    }
    let scale = Scale::uniform(px);
    let v = font.v_metrics(scale);

    let width = measure_line(font, text, px).ceil();
    let height = (v.ascent - v.descent).ceil();
    if width < 1.0 || height < 1.0 {
        return None;
    }
    let limit = MAX_LINE_EXTENT as f32;
    if width as f32 > limit || height > limit {
        tracing::warn!(
            font_size = px,
            width,
            height,
            "Text line too large to rasterize; skipping"
        );
        return None;
    }
    let (width, height) = (width as u32, height as u32);
    let cells = usize::try_from(width.checked_mul(height)?).ok()?;

    let glyphs: Vec<_> = font.layout(text, scale, point(0.0, v.ascent)).collect();
    let mut coverage = vec![0f32; cells];
    for glyph in &glyphs {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, v| {
            let x = bb.min.x + gx as i32;
            let y = bb.min.y + gy as i32;
            if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                return;
            }
            let cell = &mut coverage[(y as u32 * width + x as u32) as usize];
            *cell = cell.max(v);
        });
    }

    let mut pixmap = Pixmap::new(width, height)?;
    let ink = color.to_color_u8();
    for (dst, cov) in pixmap.pixels_mut().iter_mut().zip(&coverage) {
        let alpha = (cov.clamp(0.0, 1.0) * ink.alpha() as f32).round() as u8;
        *dst = ColorU8::from_rgba(ink.red(), ink.green(), ink.blue(), alpha).premultiply();
    }
    Some(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(content: &str, align: TextAlign) -> TextProps {
        TextProps {
            content: content.to_string(),
            font_size: 20.0,
            line_height: 1.5,
            text_align: align,
            ..TextProps::default()
        }
    }

    // 10px per character
    fn mono(s: &str) -> f64 {
        s.chars().count() as f64 * 10.0
    }

    fn frame() -> ElementFrame {
        ElementFrame::new(100.0, 50.0, 200.0, 80.0, 0.0)
    }

    #[test]
    fn test_lines_advance_by_line_height() {
        let lines = layout_lines(&props("one\ntwo\n\nfour", TextAlign::Left), &frame(), mono);
        let ys: Vec<f64> = lines.iter().map(|l| l.y).collect();
        assert_eq!(ys, vec![50.0, 80.0, 110.0, 140.0]);
        assert_eq!(lines[2].text, "");
        assert!(lines.iter().all(|l| l.x == 100.0));
    }

    #[test]
    fn test_alignment_anchors() {
        let center = layout_lines(&props("abcd", TextAlign::Center), &frame(), mono);
        assert_eq!(center[0].x, 180.0);
        let right = layout_lines(&props("abcd", TextAlign::Right), &frame(), mono);
        assert_eq!(right[0].x, 260.0);
    }

    #[test]
    fn test_overflowing_line_is_condensed_to_box() {
        let text = "x".repeat(40); // 400px into a 200px box
        for align in [TextAlign::Left, TextAlign::Center, TextAlign::Right] {
            let line = &layout_lines(&props(&text, align), &frame(), mono)[0];
            assert_eq!(line.condense, 0.5);
            assert_eq!(line.drawn_width(), 200.0);
            assert_eq!(line.x, 100.0);
        }
    }

    fn dejavu() -> Font<'static> {
        let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../fixtures/fonts/DejaVuSans.ttf");
        Font::try_from_vec(std::fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn test_rasterized_line_has_ink() {
        let font = dejavu();
        let raster = rasterize_line(&font, "Hello", 24.0, Color::BLACK).unwrap();
        assert!(raster.width() as f64 >= measure_line(&font, "Hello", 24.0).floor());
        assert!(raster.pixels().iter().any(|p| p.alpha() > 128));
        assert!(rasterize_line(&font, "", 24.0, Color::BLACK).is_none());
    }

    #[test]
    fn test_oversized_line_is_skipped() {
        let font = dejavu();
        assert!(rasterize_line(&font, "New Text", 200_000.0, Color::BLACK).is_none());
        assert!(rasterize_line(&font, "x", f32::INFINITY, Color::BLACK).is_none());
        assert!(rasterize_line(&font, "x", 3000.0, Color::BLACK).is_some());
    }

    #[test]
    fn test_crlf_content() {
        let lines = layout_lines(&props("a\r\nb", TextAlign::Left), &frame(), mono);
        assert_eq!(lines[0].text, "a");
        assert_eq!(lines[0].natural_width, 10.0);
    }
}
