//! The compositing pipeline: resolve the watermark source, apply opacity,
//! rescale, tile, and blend over the base image.

use image::{Rgb, Rgba, RgbaImage};

use crate::blending;
use crate::error::Result;
use crate::mark;
use crate::text::TextFont;
use crate::tile;

/// Width the base image is rescaled to for interactive previews.
///
/// Pixel-denominated parameters are captured against this width and
/// rescaled linearly when applied at export resolution.
pub const PREVIEW_WIDTH: u32 = 500;

/// Width of base and watermark thumbnails.
pub const THUMBNAIL_WIDTH: u32 = 100;

/// The active watermark: an imported image or a line of styled text.
///
/// Exactly one variant is active at a time; switching variants replaces
/// the watermark atomically, so a stale text string can never pair with an
/// image mark or vice versa.
#[derive(Debug, Clone)]
pub enum WatermarkSource {
    /// A raster watermark loaded from a file or built in memory.
    Image(RgbaImage),
    /// A text watermark rendered from a font and fill color.
    Text {
        /// The string to render. Never empty.
        text: String,
        /// Font face used for rasterization.
        font: TextFont,
        /// Fill color; opacity is applied per composite, not stored here.
        color: Rgb<u8>,
    },
}

impl WatermarkSource {
    /// Resolve to an RGBA mark carrying the requested uniform opacity.
    ///
    /// Image marks get their alpha channel overwritten wholesale (any
    /// transparency the import carried is lost). Text marks are rasterized
    /// fresh with `alpha` as the fill alpha, which keeps glyph
    /// anti-aliasing and the background between glyphs transparent.
    pub(crate) fn resolve(&self, alpha: u8) -> Result<RgbaImage> {
        match self {
            Self::Image(img) => Ok(mark::apply_opacity(img, alpha)),
            Self::Text { text, font, color } => {
                crate::text::rasterize(text, font, Rgba([color[0], color[1], color[2], alpha]))
            }
        }
    }

    /// Resolve at full opacity, for thumbnails.
    pub(crate) fn resolve_raw(&self) -> Result<RgbaImage> {
        match self {
            Self::Image(img) => Ok(img.clone()),
            Self::Text { text, font, color } => {
                crate::text::rasterize(text, font, Rgba([color[0], color[1], color[2], 255]))
            }
        }
    }

    /// Whether the active watermark is text.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

/// User-adjustable compositing parameters.
///
/// All three are re-applied on every composite; no parameter is baked into
/// stored state except at export time.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeParameters {
    /// Watermark opacity, 0.0 (invisible) to 1.0 (fully opaque ink).
    pub opacity: f32,
    /// Target watermark width in pixels, at preview scale.
    pub mark_width: u32,
    /// Gap between adjacent tiles in pixels, at preview scale.
    pub spacing: u32,
}

impl Default for CompositeParameters {
    fn default() -> Self {
        Self {
            opacity: 0.2,
            mark_width: 100,
            spacing: 100,
        }
    }
}

impl CompositeParameters {
    /// Build parameters from the slider surface the UI collaborator
    /// exposes: opacity 0-100 mapped to 0.0-1.0, size 1-100 and spacing
    /// 0-100 both mapped x5 to pixels. Out-of-range values are clamped.
    #[must_use]
    pub fn from_levels(opacity: u8, size: u8, spacing: u8) -> Self {
        Self {
            opacity: f32::from(opacity.min(100)) / 100.0,
            mark_width: u32::from(size.clamp(1, 100)) * 5,
            spacing: u32::from(spacing.min(100)) * 5,
        }
    }

    /// The uniform alpha value for the current opacity.
    ///
    /// Truncates rather than rounds, so opacity 0.5 maps to alpha 127.
    #[must_use]
    pub fn alpha(&self) -> u8 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (self.opacity.clamp(0.0, 1.0) * 255.0) as u8
        }
    }

    /// Rescale the pixel-denominated parameters to a different base width.
    ///
    /// Parameters are captured against `reference_width` (the preview
    /// width); applying them at `target_width` multiplies mark width and
    /// spacing by `target_width / reference_width` in integer arithmetic.
    /// The mark width is floored at 1 px so extreme downscales can never
    /// hand the scaler a degenerate target. Opacity is
    /// resolution-independent and passes through.
    #[must_use]
    pub fn scaled_to(&self, target_width: u32, reference_width: u32) -> Self {
        debug_assert!(reference_width > 0, "reference width must be positive");
        let scale = |v: u32| -> u32 {
            #[allow(clippy::cast_possible_truncation)]
            {
                (u64::from(v) * u64::from(target_width) / u64::from(reference_width)) as u32
            }
        };
        Self {
            opacity: self.opacity,
            mark_width: scale(self.mark_width).max(1),
            spacing: scale(self.spacing),
        }
    }
}

/// Composite a tiled watermark over `base` and return the result.
///
/// Pipeline order: resolve the source to an RGBA mark carrying
/// `params.alpha()`, rescale it to `params.mark_width`, tile across the
/// base's dimensions with `params.spacing`, then alpha-composite the tiled
/// layer over the base. The output always has the base's exact size.
///
/// Text marks are rasterized fresh on every call; text, font, and color
/// can change independently between calls and nothing is cached.
///
/// # Errors
///
/// Fails only if a text watermark cannot be rasterized.
pub fn composite(
    base: &RgbaImage,
    source: &WatermarkSource,
    params: &CompositeParameters,
) -> Result<RgbaImage> {
    let resolved = source.resolve(params.alpha())?;
    let scaled = mark::rescale(&resolved, params.mark_width.max(1));
    let tiled = tile::tile(&scaled, base.dimensions(), params.spacing);
    Ok(blending::alpha_over(base, &tiled))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn level_mapping_matches_slider_surface() {
        let params = CompositeParameters::from_levels(50, 10, 2);
        assert!((params.opacity - 0.5).abs() < f32::EPSILON);
        assert_eq!(params.mark_width, 50);
        assert_eq!(params.spacing, 10);
    }

    #[test]
    fn level_mapping_clamps_out_of_range_input() {
        let params = CompositeParameters::from_levels(200, 0, 150);
        assert!((params.opacity - 1.0).abs() < f32::EPSILON);
        assert_eq!(params.mark_width, 5, "size level floors at 1");
        assert_eq!(params.spacing, 500);
    }

    #[test]
    fn alpha_truncates_like_the_preview_mapping() {
        let half = CompositeParameters {
            opacity: 0.5,
            ..CompositeParameters::default()
        };
        assert_eq!(half.alpha(), 127);

        let full = CompositeParameters {
            opacity: 1.0,
            ..CompositeParameters::default()
        };
        assert_eq!(full.alpha(), 255);

        let none = CompositeParameters {
            opacity: 0.0,
            ..CompositeParameters::default()
        };
        assert_eq!(none.alpha(), 0);
    }

    #[test]
    fn export_scaling_is_exactly_linear() {
        let preview = CompositeParameters {
            opacity: 0.5,
            mark_width: 50,
            spacing: 10,
        };
        let export = preview.scaled_to(2000, PREVIEW_WIDTH);
        assert_eq!(export.mark_width, 200);
        assert_eq!(export.spacing, 40);
        assert!((export.opacity - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn export_scaling_floors_mark_width_at_one() {
        let preview = CompositeParameters {
            opacity: 1.0,
            mark_width: 2,
            spacing: 3,
        };
        let export = preview.scaled_to(100, PREVIEW_WIDTH);
        assert_eq!(export.mark_width, 1);
        assert_eq!(export.spacing, 0);
    }

    #[test]
    fn composite_output_matches_base_dimensions() {
        let base = RgbaImage::from_pixel(123, 77, BLUE);
        let source = WatermarkSource::Image(RgbaImage::from_pixel(10, 10, RED));
        let params = CompositeParameters::from_levels(100, 4, 4);
        let out = composite(&base, &source, &params).unwrap();
        assert_eq!(out.dimensions(), (123, 77));
    }

    #[test]
    fn composite_places_tiles_at_pitch_and_leaves_gaps() {
        let base = RgbaImage::from_pixel(40, 30, BLUE);
        let source = WatermarkSource::Image(RgbaImage::from_pixel(10, 10, RED));
        // alpha 255, mark rescaled to 10x10, spacing 10 -> pitch 20
        let params = CompositeParameters {
            opacity: 1.0,
            mark_width: 10,
            spacing: 10,
        };
        let out = composite(&base, &source, &params).unwrap();

        assert_eq!(*out.get_pixel(0, 0), RED);
        assert_eq!(*out.get_pixel(9, 9), RED);
        assert_eq!(*out.get_pixel(20, 0), RED, "second column tile origin");
        assert_eq!(*out.get_pixel(15, 5), BLUE, "horizontal gap");
        assert_eq!(*out.get_pixel(5, 15), BLUE, "vertical gap");
    }

    #[test]
    fn composite_at_half_opacity_blends() {
        let base = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let source = WatermarkSource::Image(RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255])));
        let params = CompositeParameters {
            opacity: 0.5,
            mark_width: 10,
            spacing: 0,
        };
        let out = composite(&base, &source, &params).unwrap();
        let px = out.get_pixel(5, 5);
        for ch in 0..3 {
            assert!((125..=129).contains(&px[ch]), "channel {ch} was {}", px[ch]);
        }
    }

    #[test]
    fn image_mark_transparency_is_overwritten_by_opacity() {
        // A mark with fully transparent pixels has them forced to the
        // uniform alpha; the transparency does not survive.
        let mut mark = RgbaImage::from_pixel(4, 4, RED);
        mark.put_pixel(0, 0, Rgba([255, 0, 0, 0]));
        let source = WatermarkSource::Image(mark);
        let resolved = source.resolve(200).unwrap();
        for px in resolved.pixels() {
            assert_eq!(px[3], 200);
        }
    }
}
