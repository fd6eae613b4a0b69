//! Seamless tiling of a watermark across a target canvas.

use image::imageops;
use image::RgbaImage;

/// Replicate `mark` across a canvas of exactly `target` size.
///
/// The tiling pitch is `(markW + spacing, markH + spacing)`. Tile counts
/// are `floor(target / pitch) + 1` per axis, over-provisioning by at least
/// one tile so the tiled canvas strictly covers the target regardless of
/// remainder; the result is then cropped to exactly `target`.
///
/// Each copy is pasted directly (pixels replaced, alpha included) rather
/// than blended against previously pasted tiles, so the mark's own alpha
/// is what the canvas ends up carrying. Pixels outside any tile stay fully
/// transparent. `spacing = 0` produces edge-to-edge tiling with no gaps.
///
/// The mark must have nonzero dimensions; callers guarantee this by
/// clamping the mark width before rescaling.
#[must_use]
pub fn tile(mark: &RgbaImage, target: (u32, u32), spacing: u32) -> RgbaImage {
    let (target_w, target_h) = target;
    let pitch_w = mark.width() + spacing;
    let pitch_h = mark.height() + spacing;
    debug_assert!(pitch_w > 0 && pitch_h > 0, "mark must have nonzero size");

    let cols = target_w / pitch_w + 1;
    let rows = target_h / pitch_h + 1;

    let mut canvas = RgbaImage::new(pitch_w * cols, pitch_h * rows);
    for col in 0..cols {
        for row in 0..rows {
            imageops::replace(
                &mut canvas,
                mark,
                i64::from(col * pitch_w),
                i64::from(row * pitch_h),
            );
        }
    }

    imageops::crop_imm(&canvas, 0, 0, target_w, target_h).to_image()
}
