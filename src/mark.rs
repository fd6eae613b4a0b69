//! Watermark preparation: uniform opacity and proportional rescaling.
//!
//! Both operations return new buffers and are used identically by the
//! preview and export paths, so the two only ever differ by resolution.

use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Resampling filter used for every rescale in the crate.
///
/// Preview, thumbnails, and export all go through the same filter so that
/// changing resolution never changes the character of the result.
const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Overwrite every pixel's alpha channel with a single uniform value.
///
/// The supplied `alpha` replaces whatever per-pixel alpha the image already
/// carried. A mark with its own transparent regions (an imported PNG logo,
/// say) loses that finer alpha information here; uniform overwrite is the
/// defined behavior, not multiplication against the existing channel.
#[must_use]
pub fn apply_opacity(image: &RgbaImage, alpha: u8) -> RgbaImage {
    let mut out = image.clone();
    for px in out.pixels_mut() {
        px[3] = alpha;
    }
    out
}

/// Rescale an image to `target_width`, preserving aspect ratio.
///
/// The new height is `max(round(height * target_width / width), 1)`; the
/// floor of 1 guards against zero-height results for extreme downscales
/// (a 1000x1 image rescaled to width 10 still has a row of pixels).
///
/// `target_width` must be positive; callers clamp degenerate sizes before
/// reaching this function.
#[must_use]
pub fn rescale(image: &RgbaImage, target_width: u32) -> RgbaImage {
    let ratio = f64::from(target_width) / f64::from(image.width());
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let height = ((f64::from(image.height()) * ratio).round() as u32).max(1);
    imageops::resize(image, target_width, height, RESAMPLE_FILTER)
}
