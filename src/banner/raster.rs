//! [`BannerCanvas`] over an in-memory RGB image.

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut, text_size};
use imageproc::filter::gaussian_blur_f32;

use super::{BannerCanvas, Region};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Draws the banner straight into a decoded image.
pub struct RasterCanvas<'a> {
    image: &'a mut RgbImage,
    font: &'a FontVec,
}

impl<'a> RasterCanvas<'a> {
    pub fn new(image: &'a mut RgbImage, font: &'a FontVec) -> Self {
        Self { image, font }
    }
}

impl BannerCanvas for RasterCanvas<'_> {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn blur_region(&mut self, region: Region, sigma: f32) {
        blur_region(self.image, region, sigma);
    }

    fn brighten_region(&mut self, region: Region, factor: f32) {
        brighten_region(self.image, region, factor);
    }

    fn draw_horizontal_line(&mut self, y: u32) {
        draw_horizontal_line(self.image, y);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32) {
        draw_text_mut(
            self.image,
            WHITE,
            x.round() as i32,
            y.round() as i32,
            PxScale::from(size),
            self.font,
            text,
        );
    }

    fn measure_text(&self, text: &str, size: f32) -> f32 {
        text_size(PxScale::from(size), self.font, text).0 as f32
    }
}

/// Clip `region` to the image. None if nothing is left.
fn clip(image: &RgbImage, region: Region) -> Option<Region> {
    let x = region.x.min(image.width());
    let y = region.y.min(image.height());
    let width = region.width.min(image.width() - x);
    let height = region.height.min(image.height() - y);
    (width > 0 && height > 0).then_some(Region { x, y, width, height })
}

/// Gaussian blur confined to `region`; pixels outside are neither read nor
/// written.
pub fn blur_region(image: &mut RgbImage, region: Region, sigma: f32) {
    // gaussian_blur_f32 asserts a positive sigma; NaN would slip past `<=`.
    if !sigma.is_finite() || sigma <= 0.0 {
        return;
    }
    let Some(r) = clip(image, region) else {
        return;
    };

    let strip = image::imageops::crop_imm(&*image, r.x, r.y, r.width, r.height).to_image();
    let blurred = gaussian_blur_f32(&strip, sigma);
    image::imageops::replace(image, &blurred, i64::from(r.x), i64::from(r.y));
}

/// Scale every channel inside `region` by `factor`.
pub fn brighten_region(image: &mut RgbImage, region: Region, factor: f32) {
    let Some(r) = clip(image, region) else {
        return;
    };

    for y in r.y..r.y + r.height {
        for x in r.x..r.x + r.width {
            let pixel = image.get_pixel_mut(x, y);
            for channel in pixel.0.iter_mut() {
                *channel = (f32::from(*channel) * factor).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// White 1px line across the full image width at row `y`.
pub fn draw_horizontal_line(image: &mut RgbImage, y: u32) {
    let width = image.width() as f32;
    let y = y as f32;
    draw_line_segment_mut(image, (0.0, y), (width, y), WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_font() -> FontVec {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts/DejaVuSans.ttf");
        FontVec::try_from_vec(std::fs::read(path).unwrap()).unwrap()
    }

    fn bottom_half(image: &RgbImage) -> Region {
        Region {
            x: 0,
            y: image.height() / 2,
            width: image.width(),
            height: image.height() / 2,
        }
    }

    #[test]
    fn brighten_halves_region_only() {
        let mut image = RgbImage::from_pixel(8, 8, Rgb([200, 100, 51]));
        let region = bottom_half(&image);

        brighten_region(&mut image, region, 0.5);

        assert_eq!(image.get_pixel(3, 3), &Rgb([200, 100, 51]));
        assert_eq!(image.get_pixel(3, 4), &Rgb([100, 50, 26]));
        assert_eq!(image.get_pixel(7, 7), &Rgb([100, 50, 26]));
    }

    #[test]
    fn blur_spreads_inside_region_only() {
        let mut image = RgbImage::new(16, 16);
        image.put_pixel(8, 12, WHITE);
        image.put_pixel(8, 3, WHITE);
        let region = bottom_half(&image);

        blur_region(&mut image, region, 1.0);

        let centre = image.get_pixel(8, 12)[0];
        assert!(centre < 255 && centre > 0);
        assert!(image.get_pixel(9, 12)[0] > 0);
        // Above the region: untouched, including the other bright pixel.
        assert_eq!(image.get_pixel(8, 3), &WHITE);
        assert_eq!(image.get_pixel(8, 7), &Rgb([0, 0, 0]));
    }

    #[test]
    fn blur_with_zero_sigma_is_noop() {
        let mut image = RgbImage::new(4, 4);
        image.put_pixel(1, 3, WHITE);
        let before = image.clone();

        blur_region(&mut image, bottom_half(&before), 0.0);

        assert_eq!(image, before);
    }

    #[test]
    fn blur_with_invalid_sigma_is_noop() {
        let mut image = RgbImage::new(4, 4);
        image.put_pixel(1, 3, WHITE);
        let before = image.clone();

        for sigma in [f32::NAN, f32::INFINITY, -1.0] {
            blur_region(&mut image, bottom_half(&before), sigma);
            assert_eq!(image, before, "sigma = {sigma}");
        }
    }

    #[test]
    fn regions_are_clipped() {
        let mut image = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
        let oversized = Region {
            x: 2,
            y: 2,
            width: 100,
            height: 100,
        };

        brighten_region(&mut image, oversized, 0.5);
        blur_region(&mut image, oversized, 1.0);

        assert_eq!(image.get_pixel(0, 0), &Rgb([100, 100, 100]));
        assert_eq!(image.get_pixel(3, 3), &Rgb([50, 50, 50]));

        let outside = Region {
            x: 10,
            y: 10,
            width: 5,
            height: 5,
        };
        brighten_region(&mut image, outside, 0.0);
        assert_eq!(image.get_pixel(3, 3), &Rgb([50, 50, 50]));
    }

    #[test]
    fn divider_line_spans_width() {
        let mut image = RgbImage::new(10, 6);

        draw_horizontal_line(&mut image, 4);

        for x in 0..10 {
            assert_eq!(image.get_pixel(x, 4), &WHITE, "x = {x}");
            assert_eq!(image.get_pixel(x, 3), &Rgb([0, 0, 0]));
            assert_eq!(image.get_pixel(x, 5), &Rgb([0, 0, 0]));
        }
    }

    // ── text ─────────────────────────────────────────────────────────

    #[test]
    fn measure_grows_with_text_and_size() {
        let font = test_font();
        let mut image = RgbImage::new(4, 4);
        let canvas = RasterCanvas::new(&mut image, &font);

        let short = canvas.measure_text("f/2.8", 20.0);
        let long = canvas.measure_text("f/2.8 1/250s ISO 400", 20.0);
        let bigger = canvas.measure_text("f/2.8", 40.0);

        assert!(short > 0.0);
        assert!(long > short);
        assert!(bigger > short);
        assert_eq!(canvas.measure_text("", 20.0), 0.0);
    }

    #[test]
    fn draw_text_paints_white_at_position() {
        let font = test_font();
        let mut image = RgbImage::new(120, 40);
        let mut canvas = RasterCanvas::new(&mut image, &font);

        canvas.draw_text("HHHH", 60.0, 5.0, 24.0);

        let lit = |x0: u32, x1: u32| {
            (x0..x1).any(|x| (0..40).any(|y| image.get_pixel(x, y)[0] > 128))
        };
        assert!(lit(60, 120));
        assert!(!lit(0, 60));
    }
}
