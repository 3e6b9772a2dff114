//! Information banner composited along the bottom edge of a photo.
//!
//! [`BannerSpec`] holds the geometry, derived from the image height alone.
//! [`compose`] issues the drawing sequence against any [`BannerCanvas`]; the
//! production canvas is [`RasterCanvas`](raster::RasterCanvas).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                                                          │
//! │                        photo                             │
//! ├──────────────────────────────────────────────────────────┤ ← banner_top, 1px line
//! │ copyright                                      location  │ ← line1_y
//! │ camera + lens @ exposure                      date/time  │ ← line2_y
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod font;
pub mod raster;

use crate::config::BannerConfig;

/// Banner geometry for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BannerSpec {
    /// 5% of the image height.
    pub height: u32,
    pub margin: u32,
    /// First row of the banner; also where the divider line is drawn.
    pub top: u32,
    /// Text pixel size.
    pub font_size: u32,
    pub line1_y: f32,
    pub line2_y: f32,
}

impl BannerSpec {
    /// Geometry for an image `image_height` pixels tall.
    ///
    /// Returns None when the image is too short to fit a line of text
    /// (under 60px).
    pub fn for_height(image_height: u32) -> Option<Self> {
        let height = image_height * 5 / 100;
        let font_size = height / 3;
        if font_size == 0 {
            return None;
        }

        let margin = height / 6;
        let top = image_height - height;
        let line1_y = top as f32 + margin as f32 / 2.0;
        let line2_y = line1_y + font_size as f32 + margin as f32;

        Some(Self {
            height,
            margin,
            top,
            font_size,
            line1_y,
            line2_y,
        })
    }

    /// The banner rectangle for an image `width` pixels wide.
    pub fn region(&self, width: u32) -> Region {
        Region {
            x: 0,
            y: self.top,
            width,
            height: self.height,
        }
    }
}

/// A pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where a banner line goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    LeftLine1,
    LeftLine2,
    RightLine1,
    RightLine2,
}

impl Slot {
    /// Short label for progress output: row number and alignment arrow.
    pub fn label(self) -> &'static str {
        match self {
            Slot::LeftLine1 => "1<",
            Slot::LeftLine2 => "2<",
            Slot::RightLine1 => "1>",
            Slot::RightLine2 => "2>",
        }
    }
}

/// The four banner lines. Blank lines are not drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayLines {
    /// Copyright.
    pub left_line1: String,
    /// Camera, lens and exposure.
    pub left_line2: String,
    /// GPS location.
    pub right_line1: String,
    /// Capture date and time.
    pub right_line2: String,
}

impl DisplayLines {
    /// Non-blank lines with their slot, in drawing order.
    pub fn visible(&self) -> Vec<(Slot, &str)> {
        [
            (Slot::LeftLine1, self.left_line1.as_str()),
            (Slot::LeftLine2, self.left_line2.as_str()),
            (Slot::RightLine1, self.right_line1.as_str()),
            (Slot::RightLine2, self.right_line2.as_str()),
        ]
        .into_iter()
        .filter(|(_, line)| !line.trim().is_empty())
        .collect()
    }
}

/// Drawing primitives the banner needs. All drawing is in white.
pub trait BannerCanvas {
    fn width(&self) -> u32;

    fn blur_region(&mut self, region: Region, sigma: f32);

    /// Multiply every channel in `region` by `factor`.
    fn brighten_region(&mut self, region: Region, factor: f32);

    /// 1px line across the full width.
    fn draw_horizontal_line(&mut self, y: u32);

    /// Draw `text` with its top-left corner at (`x`, `y`).
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32);

    /// Rendered width of `text` in pixels.
    fn measure_text(&self, text: &str, size: f32) -> f32;
}

/// Draw the banner: blur, darken, divider line, then the text lines.
pub fn compose<C: BannerCanvas + ?Sized>(
    canvas: &mut C,
    spec: &BannerSpec,
    lines: &DisplayLines,
    config: &BannerConfig,
) {
    let width = canvas.width();
    let region = spec.region(width);
    let size = spec.font_size as f32;
    let margin = spec.margin as f32;

    canvas.blur_region(region, config.blur_sigma);
    canvas.brighten_region(region, config.brightness);
    canvas.draw_horizontal_line(spec.top);

    for (slot, text) in lines.visible() {
        let (x, y) = match slot {
            Slot::LeftLine1 => (margin, spec.line1_y),
            Slot::LeftLine2 => (margin, spec.line2_y),
            Slot::RightLine1 => (right_aligned_x(canvas, text, size, width, margin), spec.line1_y),
            Slot::RightLine2 => (right_aligned_x(canvas, text, size, width, margin), spec.line2_y),
        };
        canvas.draw_text(text, x, y, size);
    }
}

fn right_aligned_x<C: BannerCanvas + ?Sized>(
    canvas: &C,
    text: &str,
    size: f32,
    width: u32,
    margin: f32,
) -> f32 {
    width as f32 - canvas.measure_text(text, size) - margin
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Canvas that records operations without drawing.
    /// Text is measured as 10px per character.
    pub struct RecordingCanvas {
        pub width: u32,
        pub ops: Vec<RecordedOp>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Blur(Region, f32),
        Brighten(Region, f32),
        Line(u32),
        Text { text: String, x: f32, y: f32, size: f32 },
    }

    impl RecordingCanvas {
        pub fn new(width: u32) -> Self {
            Self {
                width,
                ops: Vec::new(),
            }
        }
    }

    impl BannerCanvas for RecordingCanvas {
        fn width(&self) -> u32 {
            self.width
        }

        fn blur_region(&mut self, region: Region, sigma: f32) {
            self.ops.push(RecordedOp::Blur(region, sigma));
        }

        fn brighten_region(&mut self, region: Region, factor: f32) {
            self.ops.push(RecordedOp::Brighten(region, factor));
        }

        fn draw_horizontal_line(&mut self, y: u32) {
            self.ops.push(RecordedOp::Line(y));
        }

        fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32) {
            self.ops.push(RecordedOp::Text {
                text: text.to_string(),
                x,
                y,
                size,
            });
        }

        fn measure_text(&self, text: &str, _size: f32) -> f32 {
            text.chars().count() as f32 * 10.0
        }
    }

    // ── BannerSpec ───────────────────────────────────────────────────

    #[test]
    fn geometry_for_1000px() {
        let spec = BannerSpec::for_height(1000).unwrap();
        assert_eq!(spec.height, 50);
        assert_eq!(spec.margin, 8);
        assert_eq!(spec.top, 950);
        assert_eq!(spec.font_size, 16);
        assert_eq!(spec.line1_y, 954.0);
        assert_eq!(spec.line2_y, 978.0);
    }

    #[test]
    fn geometry_uses_integer_truncation() {
        let spec = BannerSpec::for_height(4000 + 39).unwrap();
        assert_eq!(spec.height, 201);
        assert_eq!(spec.margin, 33);
        assert_eq!(spec.top, 3838);
        assert_eq!(spec.font_size, 67);
        assert_eq!(spec.line1_y, 3854.5);
        assert_eq!(spec.line2_y, 3954.5);
    }

    #[test]
    fn geometry_stays_inside_image() {
        for h in [60, 61, 99, 480, 1080, 3456, 6000] {
            let spec = BannerSpec::for_height(h).unwrap();
            assert!(spec.top < h, "top out of bounds for {h}");
            assert_eq!(spec.top + spec.height, h);
            assert!(spec.line2_y > spec.line1_y);
        }
    }

    #[test]
    fn tiny_images_get_no_banner() {
        assert!(BannerSpec::for_height(59).is_none());
        assert!(BannerSpec::for_height(0).is_none());
    }

    // ── DisplayLines ─────────────────────────────────────────────────

    #[test]
    fn visible_skips_blank_lines() {
        let lines = DisplayLines {
            left_line1: "© Jane".into(),
            left_line2: "   ".into(),
            right_line1: String::new(),
            right_line2: "2020/01/02 03:04:05".into(),
        };
        let visible = lines.visible();
        assert_eq!(
            visible,
            vec![
                (Slot::LeftLine1, "© Jane"),
                (Slot::RightLine2, "2020/01/02 03:04:05"),
            ]
        );
        assert_eq!(visible[0].0.label(), "1<");
        assert_eq!(visible[1].0.label(), "2>");
    }

    // ── compose ──────────────────────────────────────────────────────

    #[test]
    fn compose_draw_sequence() {
        let spec = BannerSpec::for_height(1000).unwrap();
        let lines = DisplayLines {
            left_line1: "copy".into(),
            left_line2: "cam @ 50mm".into(),
            right_line1: "loc".into(),
            right_line2: "date".into(),
        };
        let mut canvas = RecordingCanvas::new(800);

        compose(&mut canvas, &spec, &lines, &BannerConfig::default());

        let region = Region {
            x: 0,
            y: 950,
            width: 800,
            height: 50,
        };
        assert_eq!(
            canvas.ops,
            vec![
                RecordedOp::Blur(region, 50.0),
                RecordedOp::Brighten(region, 0.5),
                RecordedOp::Line(950),
                RecordedOp::Text { text: "copy".into(), x: 8.0, y: 954.0, size: 16.0 },
                RecordedOp::Text { text: "cam @ 50mm".into(), x: 8.0, y: 978.0, size: 16.0 },
                RecordedOp::Text { text: "loc".into(), x: 762.0, y: 954.0, size: 16.0 },
                RecordedOp::Text { text: "date".into(), x: 752.0, y: 978.0, size: 16.0 },
            ]
        );
    }

    #[test]
    fn compose_with_no_text_still_draws_background() {
        let spec = BannerSpec::for_height(1000).unwrap();
        let mut canvas = RecordingCanvas::new(640);

        compose(&mut canvas, &spec, &DisplayLines::default(), &BannerConfig::default());

        assert_eq!(canvas.ops.len(), 3);
        assert!(matches!(canvas.ops[2], RecordedOp::Line(950)));
    }

    #[test]
    fn compose_uses_configured_effects() {
        let spec = BannerSpec::for_height(200).unwrap();
        let config = BannerConfig {
            blur_sigma: 4.0,
            brightness: 0.25,
            ..BannerConfig::default()
        };
        let mut canvas = RecordingCanvas::new(100);

        compose(&mut canvas, &spec, &DisplayLines::default(), &config);

        assert!(matches!(canvas.ops[0], RecordedOp::Blur(_, s) if s == 4.0));
        assert!(matches!(canvas.ops[1], RecordedOp::Brighten(_, f) if f == 0.25));
    }
}
