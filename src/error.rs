//! Error types for the tilemark crate.

use std::path::PathBuf;

/// Errors that can occur while preparing or compositing watermarks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// The export format is not supported.
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// Font data could not be parsed as a scalable outline font.
    #[error("failed to parse font: {0}")]
    Font(#[from] ab_glyph::InvalidFont),

    /// No loadable font was found under the searched directory.
    #[error("no usable font found under {}", dir.display())]
    NoFont {
        /// The directory that was searched.
        dir: PathBuf,
    },

    /// An empty string was submitted for text rasterization.
    #[error("watermark text must not be empty")]
    EmptyText,
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
