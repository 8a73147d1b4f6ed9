use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use rand::Rng;
use shared::{ColorOption, FinishOption};

use super::ImagingError;

/// Pixels brighter than this on all three channels count as backdrop and are
/// left untouched. Dark or colored backdrops are not detected; accepted.
const BACKGROUND_THRESHOLD: u8 = 240;

/// Decode, recolor and re-encode as PNG. The textured finish draws from the
/// thread RNG, so repeated calls are not byte-identical by design.
pub fn recolor_bytes(
    data: &[u8],
    color: Option<ColorOption>,
    finish: Option<FinishOption>,
) -> Result<Vec<u8>, ImagingError> {
    let img = image::load_from_memory(data).map_err(|e| ImagingError::Decode(e.to_string()))?;
    let out = recolor(&img, color, finish, &mut rand::rng());

    let mut buf = Cursor::new(Vec::new());
    out.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| ImagingError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Apply the color stage then the finish stage to every non-background pixel.
/// Alpha is never modified.
pub fn recolor(
    img: &DynamicImage,
    color: Option<ColorOption>,
    finish: Option<FinishOption>,
    rng: &mut impl Rng,
) -> RgbaImage {
    let mut out = img.to_rgba8();

    for px in out.pixels_mut() {
        let [r, g, b, _a] = px.0;
        if r > BACKGROUND_THRESHOLD && g > BACKGROUND_THRESHOLD && b > BACKGROUND_THRESHOLD {
            continue;
        }

        let mut c = (r as f32, g as f32, b as f32);
        if let Some(color) = color {
            c = clamp_rgb(apply_color(c, color));
        }
        if let Some(finish) = finish {
            c = clamp_rgb(apply_finish(c, finish, rng));
        }

        px.0[0] = c.0.round() as u8;
        px.0[1] = c.1.round() as u8;
        px.0[2] = c.2.round() as u8;
    }

    out
}

fn apply_color((r, g, b): (f32, f32, f32), color: ColorOption) -> (f32, f32, f32) {
    match color {
        ColorOption::Black => (r * 0.15, g * 0.15, b * 0.15),
        ColorOption::White => (r * 1.5 + 50.0, g * 1.5 + 50.0, b * 1.5 + 50.0),
        ColorOption::Gray => {
            let avg = (r + g + b) / 3.0;
            let v = avg * 0.7 + 40.0;
            (v, v, v)
        }
        ColorOption::Brown => with_hsl((r, g, b), |_h, s, l| (30.0, s.min(0.70), l * 0.8)),
        ColorOption::Blue => with_hsl((r, g, b), |_h, s, l| (220.0, (s + 0.20).min(0.80), l)),
        ColorOption::Beige => with_hsl((r, g, b), |_h, _s, l| (40.0, 0.30, l.max(0.70))),
    }
}

fn apply_finish(
    (r, g, b): (f32, f32, f32),
    finish: FinishOption,
    rng: &mut impl Rng,
) -> (f32, f32, f32) {
    match finish {
        FinishOption::Glossy => (r * 1.15 + 10.0, g * 1.15 + 10.0, b * 1.15 + 10.0),
        FinishOption::Textured => {
            let jitter = rng.random_range(-5.0..=5.0);
            (r + jitter, g + jitter, b + jitter)
        }
        FinishOption::Polished => (r * 1.08, g * 1.08, b * 1.08),
        FinishOption::Metallic => with_hsl((r, g, b), |h, s, l| (h, s * 0.7, l * 1.1)),
        FinishOption::Matte => (r, g, b),
    }
}

fn clamp_rgb((r, g, b): (f32, f32, f32)) -> (f32, f32, f32) {
    (
        r.clamp(0.0, 255.0),
        g.clamp(0.0, 255.0),
        b.clamp(0.0, 255.0),
    )
}

/// Round-trip a 0..255 RGB triple through HSL, letting `f` edit
/// (hue in degrees, saturation 0..1, lightness 0..1).
fn with_hsl(
    (r, g, b): (f32, f32, f32),
    f: impl FnOnce(f32, f32, f32) -> (f32, f32, f32),
) -> (f32, f32, f32) {
    let (h, s, l) = rgb_to_hsl(r / 255.0, g / 255.0, b / 255.0);
    let (h, s, l) = f(h, s, l);
    let (r, g, b) = hsl_to_rgb(h.rem_euclid(360.0), s.clamp(0.0, 1.0), l.clamp(0.0, 1.0));
    (r * 255.0, g * 255.0, b * 255.0)
}

fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    let d = max - min;
    if d < f32::EPSILON {
        return (0.0, 0.0, l);
    }

    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        ((g - b) / d).rem_euclid(6.0)
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h * 60.0, s, l)
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s <= 0.0 {
        return (l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let h = h / 360.0;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn single_pixel(r: u8, g: u8, b: u8, a: u8) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([r, g, b, a])))
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn no_options_is_identity() {
        let img = single_pixel(12, 99, 201, 255);
        let out = recolor(&img, None, None, &mut rng());
        assert_eq!(out.get_pixel(0, 0).0, [12, 99, 201, 255]);
    }

    #[test]
    fn background_pixels_survive_every_color() {
        for color in [
            ColorOption::Black,
            ColorOption::White,
            ColorOption::Gray,
            ColorOption::Brown,
            ColorOption::Blue,
            ColorOption::Beige,
        ] {
            let img = single_pixel(250, 245, 241, 255);
            let out = recolor(&img, Some(color), Some(FinishOption::Glossy), &mut rng());
            assert_eq!(out.get_pixel(0, 0).0, [250, 245, 241, 255]);
        }
    }

    #[test]
    fn black_scales_channels_by_point_fifteen() {
        let img = single_pixel(200, 100, 50, 255);
        let out = recolor(&img, Some(ColorOption::Black), None, &mut rng());
        assert_eq!(out.get_pixel(0, 0).0, [30, 15, 8, 255]);
    }

    #[test]
    fn white_clamps_at_full_brightness() {
        let img = single_pixel(200, 140, 10, 255);
        let out = recolor(&img, Some(ColorOption::White), None, &mut rng());
        // 200*1.5+50 and 140*1.5+50 both exceed 255
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 65, 255]);
    }

    #[test]
    fn alpha_is_never_touched() {
        let img = single_pixel(10, 20, 30, 128);
        let out = recolor(
            &img,
            Some(ColorOption::Blue),
            Some(FinishOption::Metallic),
            &mut rng(),
        );
        assert_eq!(out.get_pixel(0, 0).0[3], 128);
    }

    #[test]
    fn brown_then_glossy_matches_expected_gray_input() {
        // (200,200,200) has zero saturation, so brown only scales lightness:
        // 200 * 0.8 = 160, then glossy 160 * 1.15 + 10 = 194.
        let img = single_pixel(200, 200, 200, 255);
        let out = recolor(
            &img,
            Some(ColorOption::Brown),
            Some(FinishOption::Glossy),
            &mut rng(),
        );
        assert_eq!(out.get_pixel(0, 0).0, [194, 194, 194, 255]);
    }

    #[test]
    fn textured_jitter_stays_within_five() {
        let img = single_pixel(100, 100, 100, 255);
        let out = recolor(&img, None, Some(FinishOption::Textured), &mut rng());
        let [r, g, b, _] = out.get_pixel(0, 0).0;
        for c in [r, g, b] {
            assert!((95..=105).contains(&c), "channel {c} outside jitter range");
        }
        // the same jitter is applied to all three channels of a pixel
        assert!(r == g && g == b);
    }

    #[test]
    fn recolor_bytes_rejects_garbage() {
        let err = recolor_bytes(b"not an image", None, None).unwrap_err();
        assert!(matches!(err, ImagingError::Decode(_)));
    }
}
