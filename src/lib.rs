//! Tile an image or text watermark across photos with adjustable opacity,
//! size, and spacing.
//!
//! The crate is the compositing engine behind an interactive watermarking
//! tool: a UI collaborator feeds it a base image, a watermark source
//! (imported image or styled text), and three slider parameters, and gets
//! back a preview-resolution composite after every change plus a
//! full-resolution file on export. The pipeline applies a uniform opacity
//! to the mark, rescales it proportionally, tiles it seamlessly across the
//! base, and alpha-composites the tiled layer on top.
//!
//! # Quick Start
//!
//! ```no_run
//! use tilemark::{WatermarkSession, WatermarkSource};
//!
//! let base = image::open("photo.jpg").unwrap().to_rgba8();
//! let logo = image::open("logo.png").unwrap().to_rgba8();
//!
//! let mut session = WatermarkSession::new(base, WatermarkSource::Image(logo));
//! session.set_opacity_percent(50);
//! session.set_size_level(10);
//! session.set_spacing_level(2);
//!
//! let preview = session.preview().unwrap();
//! session.export_to("watermarked_image.jpg".as_ref()).unwrap();
//! ```
//!
//! # Text watermarks
//!
//! Text is rasterized at a fixed reference scale with a loaded `.ttf`
//! font, then flows through the same rescale/tile path as an image mark:
//!
//! ```no_run
//! use tilemark::{WatermarkSession, WatermarkSource};
//!
//! let base = image::open("photo.jpg").unwrap().to_rgba8();
//! let logo = image::open("logo.png").unwrap().to_rgba8();
//! let mut session = WatermarkSession::new(base, WatermarkSource::Image(logo));
//!
//! session.set_text_color(255, 255, 255);
//! session.set_text("do not copy").unwrap();
//! let preview = session.preview().unwrap();
//! ```

#![deny(missing_docs)]

pub mod blending;
pub mod error;
pub mod mark;
pub mod pipeline;
mod session;
pub mod text;
pub mod tile;

pub use error::{Error, Result};
pub use pipeline::{
    composite, CompositeParameters, WatermarkSource, PREVIEW_WIDTH, THUMBNAIL_WIDTH,
};
pub use session::{
    default_export_path, is_supported_image, load_image, save_image, WatermarkSession,
    DEFAULT_EXPORT_FILENAME,
};
pub use text::TextFont;
