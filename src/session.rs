//! Session state and the file-facing operations a UI collaborator drives.
//!
//! The session owns the base image, the active watermark source, the
//! active font and text color, and the composite parameters. Preview,
//! thumbnails, and export are all pure functions of that state and are
//! recomputed in full on demand; nothing else is cached or mutated behind
//! the caller's back. All operations are synchronous and fail-soft: an
//! operation that errors leaves every piece of prior state intact.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};

use crate::error::{Error, Result};
use crate::mark;
use crate::pipeline::{self, CompositeParameters, WatermarkSource, PREVIEW_WIDTH, THUMBNAIL_WIDTH};
use crate::text::TextFont;

/// Default suggested filename for exported composites.
pub const DEFAULT_EXPORT_FILENAME: &str = "watermarked_image.jpg";

/// Interactive watermarking session.
#[derive(Debug)]
pub struct WatermarkSession {
    base: RgbaImage,
    preview_base: RgbaImage,
    source: WatermarkSource,
    font: Option<TextFont>,
    text_color: Rgb<u8>,
    params: CompositeParameters,
}

impl WatermarkSession {
    /// Create a session from an already-decoded base image and watermark.
    ///
    /// The preview base is the base rescaled to the fixed preview width
    /// (always, even when that upscales a small import). Parameters start
    /// at their defaults and the text color starts black.
    #[must_use]
    pub fn new(base: RgbaImage, source: WatermarkSource) -> Self {
        let font = match &source {
            WatermarkSource::Text { font, .. } => Some(font.clone()),
            WatermarkSource::Image(_) => None,
        };
        let preview_base = mark::rescale(&base, PREVIEW_WIDTH);
        Self {
            base,
            preview_base,
            source,
            font,
            text_color: Rgb([0, 0, 0]),
            params: CompositeParameters::default(),
        }
    }

    /// The full-resolution base image.
    #[must_use]
    pub fn base(&self) -> &RgbaImage {
        &self.base
    }

    /// The active watermark source.
    #[must_use]
    pub fn source(&self) -> &WatermarkSource {
        &self.source
    }

    /// The current composite parameters (preview scale).
    #[must_use]
    pub fn params(&self) -> &CompositeParameters {
        &self.params
    }

    /// Replace the composite parameters wholesale.
    pub fn set_params(&mut self, params: CompositeParameters) {
        self.params = params;
    }

    /// Set opacity from the 0-100 slider surface.
    pub fn set_opacity_percent(&mut self, percent: u8) {
        self.params.opacity = f32::from(percent.min(100)) / 100.0;
    }

    /// Set watermark width from the 1-100 slider surface (x5 pixels).
    ///
    /// The level is floored at 1 so a degenerate zero-width mark can
    /// never reach the scaler.
    pub fn set_size_level(&mut self, level: u8) {
        self.params.mark_width = u32::from(level.clamp(1, 100)) * 5;
    }

    /// Set tile spacing from the 0-100 slider surface (x5 pixels).
    pub fn set_spacing_level(&mut self, level: u8) {
        self.params.spacing = u32::from(level.min(100)) * 5;
    }

    /// Replace the base image with an already-decoded buffer.
    pub fn set_base(&mut self, base: RgbaImage) {
        self.preview_base = mark::rescale(&base, PREVIEW_WIDTH);
        self.base = base;
    }

    /// Replace the base image from a file.
    ///
    /// # Errors
    ///
    /// Returns the decode error and leaves the prior base (and its
    /// preview) unchanged.
    pub fn import_base(&mut self, path: &Path) -> Result<()> {
        let img = load_image(path)?;
        self.set_base(img);
        Ok(())
    }

    /// Replace the watermark with an already-decoded image.
    pub fn set_watermark(&mut self, watermark: RgbaImage) {
        self.source = WatermarkSource::Image(watermark);
    }

    /// Replace the watermark from an image file.
    ///
    /// # Errors
    ///
    /// Returns the decode error and leaves the prior watermark unchanged.
    pub fn import_watermark(&mut self, path: &Path) -> Result<()> {
        let img = load_image(path)?;
        self.set_watermark(img);
        Ok(())
    }

    /// Replace the active font from a `.ttf` file.
    ///
    /// A live text watermark is re-pointed at the new font. On failure the
    /// previously active font stays in place and text keeps rendering with
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Font`] without mutating state.
    pub fn import_font(&mut self, path: &Path) -> Result<()> {
        let font = TextFont::from_file(path)?;
        if let WatermarkSource::Text { font: active, .. } = &mut self.source {
            *active = font.clone();
        }
        self.font = Some(font);
        Ok(())
    }

    /// Switch the watermark to text.
    ///
    /// An empty string is a no-op: the active watermark is neither
    /// replaced nor cleared. The text renders with the active font
    /// (resolved from the system font directories on first use if none
    /// was imported) and the active text color.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFont`] if no font was imported and none can be
    /// resolved from the system directories; the active watermark is left
    /// unchanged.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let font = match &self.font {
            Some(f) => f.clone(),
            None => {
                let f = TextFont::system_default()?;
                self.font = Some(f.clone());
                f
            }
        };
        self.source = WatermarkSource::Text {
            text: text.to_string(),
            font,
            color: self.text_color,
        };
        Ok(())
    }

    /// Set the text fill color from three independent 0-255 channels.
    ///
    /// A live text watermark picks up the new color immediately.
    pub fn set_text_color(&mut self, r: u8, g: u8, b: u8) {
        self.text_color = Rgb([r, g, b]);
        if let WatermarkSource::Text { color, .. } = &mut self.source {
            *color = self.text_color;
        }
    }

    /// Composite at preview resolution.
    ///
    /// # Errors
    ///
    /// Fails only if a text watermark cannot be rasterized.
    pub fn preview(&self) -> Result<RgbaImage> {
        pipeline::composite(&self.preview_base, &self.source, &self.params)
    }

    /// Thumbnail of the base image.
    #[must_use]
    pub fn base_thumbnail(&self) -> RgbaImage {
        mark::rescale(&self.base, THUMBNAIL_WIDTH)
    }

    /// Thumbnail of the active watermark, shown at full opacity.
    ///
    /// # Errors
    ///
    /// Fails only if a text watermark cannot be rasterized.
    pub fn watermark_thumbnail(&self) -> Result<RgbaImage> {
        Ok(mark::rescale(&self.source.resolve_raw()?, THUMBNAIL_WIDTH))
    }

    /// Composite at the base image's full resolution.
    ///
    /// Mark width and spacing were captured at preview scale; they are
    /// rescaled by `base_width / preview_width` before the pipeline runs
    /// so the export looks like the preview, only sharper.
    ///
    /// # Errors
    ///
    /// Fails only if a text watermark cannot be rasterized.
    pub fn export_composite(&self) -> Result<RgbaImage> {
        let params = self.params.scaled_to(self.base.width(), PREVIEW_WIDTH);
        pipeline::composite(&self.base, &self.source, &params)
    }

    /// Composite at full resolution, flatten to opaque RGB, and write to
    /// `path`, with the codec chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for extensions other than
    /// PNG/JPEG (nothing is written), or an I/O/encode error from the
    /// write itself.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        let composed = self.export_composite()?;
        let flattened = DynamicImage::ImageRgba8(composed).to_rgb8();
        save_image(&flattened, path)
    }
}

/// Check if a file has a supported import extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "png" | "jpg" | "jpeg"),
        None => false,
    }
}

/// Load and decode an image file to RGBA.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}

/// Save an RGB image with format-specific encoder settings.
///
/// JPEG is written at maximum quality; PNG through the default encoder.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] for any other extension, or an
/// error if writing fails.
pub fn save_image(img: &RgbImage, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    let dyn_img = DynamicImage::ImageRgb8(img.clone());

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path)?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, 100);
            encoder.encode_image(&dyn_img)?;
        }
        ImageFormat::Png => {
            dyn_img.save(path)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

/// Suggest an export path next to an input image.
///
/// Example: `"photos/beach.png"` becomes `"photos/watermarked_image.jpg"`.
#[must_use]
pub fn default_export_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(DEFAULT_EXPORT_FILENAME)
}
