//! Alpha compositing of the tiled watermark layer over the base image.
//!
//! Standard Porter-Duff "over" in straight (non-premultiplied) alpha:
//! `out_a = fg_a + bg_a * (1 - fg_a)`, with color channels weighted the
//! same way and un-premultiplied by `out_a`.

use image::{Rgba, RgbaImage};

/// Composite `overlay` over `base` and return the result.
///
/// The overlay's per-pixel alpha determines its contribution; fully
/// transparent overlay regions leave the base untouched. Both images must
/// have identical dimensions (the tiling step guarantees this for the
/// watermark layer).
#[must_use]
pub fn alpha_over(base: &RgbaImage, overlay: &RgbaImage) -> RgbaImage {
    debug_assert_eq!(
        base.dimensions(),
        overlay.dimensions(),
        "layers must have identical dimensions"
    );

    let mut out = base.clone();
    for (bottom, top) in out.pixels_mut().zip(overlay.pixels()) {
        *bottom = over_pixel(*bottom, *top);
    }
    out
}

/// Blend a single foreground pixel over a background pixel.
pub(crate) fn over_pixel(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = f32::from(foreground[3]) / 255.0;
    let bg_alpha = f32::from(background[3]) / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = f32::from(fg) / 255.0;
        let bg_f = f32::from(bg) / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (result * 255.0).round().clamp(0.0, 255.0) as u8
        }
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_overlay_replaces_base() {
        let base = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 255, 255]));
        let overlay = RgbaImage::from_pixel(3, 3, Rgba([255, 0, 0, 255]));
        let out = alpha_over(&base, &overlay);
        for px in out.pixels() {
            assert_eq!(*px, Rgba([255, 0, 0, 255]));
        }
    }

    #[test]
    fn transparent_overlay_leaves_base_untouched() {
        let base = RgbaImage::from_pixel(3, 3, Rgba([12, 34, 56, 255]));
        let overlay = RgbaImage::new(3, 3);
        let out = alpha_over(&base, &overlay);
        assert_eq!(out, base);
    }

    #[test]
    fn half_alpha_overlay_blends_proportionally() {
        let base = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let overlay = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 127]));
        let out = alpha_over(&base, &overlay);

        let px = out.get_pixel(0, 0);
        // 127/255 of white over black: each channel lands on ~127.
        for ch in 0..3 {
            assert!(
                (125..=129).contains(&px[ch]),
                "channel {ch} was {}",
                px[ch]
            );
        }
        assert_eq!(px[3], 255);
    }

    #[test]
    fn result_over_opaque_base_stays_opaque() {
        let base = RgbaImage::from_pixel(2, 2, Rgba([10, 10, 10, 255]));
        let overlay = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 0, 90]));
        let out = alpha_over(&base, &overlay);
        for px in out.pixels() {
            assert_eq!(px[3], 255);
        }
    }
}
