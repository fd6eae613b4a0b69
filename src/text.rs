//! Text watermark rasterization.
//!
//! Text is measured and rendered once at a fixed reference scale into a
//! tightly-cropped transparent buffer, then rescaled downstream exactly
//! like an image watermark. Keeping rasterization at one scale means the
//! pipeline has a single scaling code path for both watermark kinds.

use std::fmt;
use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontArc, GlyphId, OutlinedGlyph, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

use crate::blending;
use crate::error::{Error, Result};

/// Reference rasterization scale in pixels.
///
/// Large enough that downscaling to any on-canvas watermark width keeps
/// glyph edges clean; independent of the watermark's display size.
pub const REFERENCE_SCALE: f32 = 500.0;

/// Directories searched for a default font when none has been imported.
pub const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// A loaded scalable font face.
///
/// Cheap to clone; the underlying outline data is shared.
#[derive(Clone)]
pub struct TextFont {
    font: FontArc,
}

impl fmt::Debug for TextFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl TextFont {
    /// Load a font from a `.ttf`/`.otf` file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or
    /// [`Error::Font`] if the data is not a parseable outline font.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    /// Load a font from in-memory data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Font`] if the data is not a parseable outline font.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self {
            font: FontArc::try_from_vec(bytes)?,
        })
    }

    /// Load the first parseable font found under a directory (recursive).
    ///
    /// Candidates are visited in path order so the choice is stable across
    /// runs; unreadable files and subdirectories are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFont`] if the directory holds no loadable font.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut candidates = Vec::new();
        collect_font_files(dir, &mut candidates);
        candidates.sort();

        for path in &candidates {
            if let Ok(font) = Self::from_file(path) {
                return Ok(font);
            }
        }
        Err(Error::NoFont {
            dir: dir.to_path_buf(),
        })
    }

    /// Resolve a default font from the system font directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFont`] if none of [`SYSTEM_FONT_DIRS`] yields a
    /// loadable font.
    pub fn system_default() -> Result<Self> {
        for dir in SYSTEM_FONT_DIRS {
            if let Ok(font) = Self::from_dir(Path::new(dir)) {
                return Ok(font);
            }
        }
        Err(Error::NoFont {
            dir: PathBuf::from(SYSTEM_FONT_DIRS[0]),
        })
    }
}

/// Check if a path looks like a scalable outline font file.
fn is_font_file(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "ttf" | "otf"),
        None => false,
    }
}

fn collect_font_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(_) => return,
    };
    for entry in entries.filter_map(std::result::Result::ok) {
        let path = entry.path();
        if path.is_dir() {
            collect_font_files(&path, out);
        } else if is_font_file(&path) {
            out.push(path);
        }
    }
}

/// Lay out a glyph run at the reference scale with the baseline placed at
/// the font's ascent, kerning applied between neighbors.
fn layout(font: &FontArc, text: &str) -> Vec<OutlinedGlyph> {
    let scale = PxScale::from(REFERENCE_SCALE);
    let scaled = font.as_scaled(scale);
    let ascent = scaled.ascent();

    let mut caret = 0.0_f32;
    let mut prev: Option<GlyphId> = None;
    let mut outlined = Vec::new();

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, ascent));
        if let Some(og) = font.outline_glyph(glyph) {
            outlined.push(og);
        }
        caret += scaled.h_advance(id);
        prev = Some(id);
    }
    outlined
}

/// Measure the tight ink bounding box of `text` at the reference scale.
///
/// Width is the rightmost ink extent; height is the bottommost ink extent
/// plus the font's descent, so single-line text with descenders ("g",
/// "y") is never clipped. Both dimensions are at least 1.
#[must_use]
pub fn measure(text: &str, font: &TextFont) -> (u32, u32) {
    let scale = PxScale::from(REFERENCE_SCALE);
    // descent() is negative (distance below the baseline)
    let descent = font.font.as_scaled(scale).descent();

    let mut right = 0.0_f32;
    let mut bottom = 0.0_f32;
    for og in layout(&font.font, text) {
        let bounds = og.px_bounds();
        right = right.max(bounds.max.x);
        bottom = bottom.max(bounds.max.y);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        let width = (right.ceil() as u32).max(1);
        let height = ((bottom - descent).ceil() as u32).max(1);
        (width, height)
    }
}

/// Render `text` into a tightly-cropped transparent buffer.
///
/// The fill color's alpha carries the requested opacity; per-pixel glyph
/// coverage modulates it, so anti-aliased edges keep graded alpha and the
/// background between glyphs stays fully transparent.
///
/// # Errors
///
/// Returns [`Error::EmptyText`] for an empty string. The session layer
/// guards against submitting empty text, so this is a contract backstop.
pub fn rasterize(text: &str, font: &TextFont, color: Rgba<u8>) -> Result<RgbaImage> {
    if text.is_empty() {
        return Err(Error::EmptyText);
    }

    let (width, height) = measure(text, font);
    let mut canvas = RgbaImage::new(width, height);

    for og in layout(&font.font, text) {
        let bounds = og.px_bounds();
        og.draw(|px, py, coverage| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let x = px as i32 + bounds.min.x as i32;
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let y = py as i32 + bounds.min.y as i32;

            if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let alpha = (coverage * f32::from(color[3])).min(255.0) as u8;
                let top = Rgba([color[0], color[1], color[2], alpha]);

                // Glyph boxes can overlap after kerning; blend instead of
                // overwriting so edges accumulate correctly.
                let (x, y) = (x as u32, y as u32);
                let existing = *canvas.get_pixel(x, y);
                canvas.put_pixel(x, y, blending::over_pixel(existing, top));
            }
        });
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Best-effort test font; tests that need one skip when the
    /// environment has no system fonts installed.
    fn test_font() -> Option<TextFont> {
        TextFont::system_default().ok()
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        let result = TextFont::from_bytes(vec![0_u8; 64]);
        assert!(matches!(result, Err(Error::Font(_))));
    }

    #[test]
    fn from_dir_errors_on_fontless_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = TextFont::from_dir(dir.path());
        assert!(matches!(result, Err(Error::NoFont { .. })));
    }

    #[test]
    fn is_font_file_checks_extension_case_insensitively() {
        assert!(is_font_file(Path::new("a.ttf")));
        assert!(is_font_file(Path::new("a.TTF")));
        assert!(is_font_file(Path::new("a.otf")));
        assert!(!is_font_file(Path::new("a.woff2")));
        assert!(!is_font_file(Path::new("a")));
    }

    #[test]
    fn empty_text_is_rejected() {
        let Some(font) = test_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let result = rasterize("", &font, Rgba([0, 0, 0, 255]));
        assert!(matches!(result, Err(Error::EmptyText)));
    }

    #[test]
    fn descenders_extend_the_bounding_box() {
        let Some(font) = test_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let (_, height_plain) = measure("A", &font);
        let (_, height_descender) = measure("Ag", &font);
        assert!(
            height_descender > height_plain,
            "Ag ({height_descender}) should be taller than A ({height_plain})"
        );
    }

    #[test]
    fn rasterized_text_has_ink_in_the_requested_color() {
        let Some(font) = test_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let img = rasterize("TEST", &font, Rgba([200, 40, 10, 255])).unwrap();
        assert!(img.width() > 1);
        assert!(img.height() > 1);

        let ink: Vec<_> = img.pixels().filter(|p| p[3] > 200).collect();
        assert!(!ink.is_empty(), "expected solid ink pixels");
        for px in ink {
            assert_eq!([px[0], px[1], px[2]], [200, 40, 10]);
        }
    }

    #[test]
    fn fill_alpha_caps_rendered_alpha() {
        let Some(font) = test_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let img = rasterize("TEST", &font, Rgba([0, 0, 0, 127])).unwrap();
        let max_alpha = img.pixels().map(|p| p[3]).max().unwrap();
        assert!(max_alpha <= 127);
        assert!(max_alpha > 0, "expected some ink");
    }
}
