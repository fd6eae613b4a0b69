//! Tile an image watermark across a photo and save the result.
//!
//! Usage:
//! ```sh
//! cargo run --example watermark_image -- photo.jpg logo.png out.jpg
//! ```

use std::env;
use std::path::Path;
use std::process;

use tilemark::{load_image, WatermarkSession, WatermarkSource};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <photo> <watermark> <output>", args[0]);
        process::exit(1);
    }

    let base = load_image(Path::new(&args[1])).expect("failed to load photo");
    let logo = load_image(Path::new(&args[2])).expect("failed to load watermark");

    let mut session = WatermarkSession::new(base, WatermarkSource::Image(logo));
    session.set_opacity_percent(40);
    session.set_size_level(20);
    session.set_spacing_level(10);

    match session.export_to(Path::new(&args[3])) {
        Ok(()) => println!("Done: {}", args[3]),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
