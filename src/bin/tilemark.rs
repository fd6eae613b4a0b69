use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use image::Rgb;

use tilemark::{
    default_export_path, load_image, CompositeParameters, TextFont, WatermarkSession,
    WatermarkSource,
};

#[derive(Parser)]
#[command(
    name = "tilemark",
    about = "Tile an image or text watermark across a photo",
    version,
    after_help = "Simple usage: tilemark photo.jpg --text \"do not copy\"\n\n\
                  Sliders use the interactive tool's units: opacity 0-100, size 1-100\n\
                  (x5 px), spacing 0-100 (x5 px). They are captured at a 500px preview\n\
                  width and rescaled to the photo's real resolution on export."
)]
struct Cli {
    /// Base image file (.png, .jpg, .jpeg)
    input: String,

    /// Output file (default: watermarked_image.jpg next to the input)
    #[arg(short, long)]
    output: Option<String>,

    /// Watermark image file
    #[arg(short, long)]
    mark: Option<String>,

    /// Watermark text (instead of --mark)
    #[arg(short, long)]
    text: Option<String>,

    /// Font file (.ttf) for text watermarks (default: first system font)
    #[arg(long)]
    font: Option<String>,

    /// Text color as R,G,B (each channel 0-255)
    #[arg(long, default_value = "0,0,0")]
    color: String,

    /// Watermark opacity (0-100)
    #[arg(long, default_value_t = 20)]
    opacity: u8,

    /// Watermark size level (1-100, x5 pixels)
    #[arg(long, default_value_t = 20)]
    size: u8,

    /// Tile spacing level (0-100, x5 pixels)
    #[arg(long, default_value_t = 20)]
    spacing: u8,
}

fn main() {
    let mut cli = Cli::parse();

    if cli.mark.is_some() && cli.text.is_some() {
        eprintln!("Error: Cannot specify both --mark and --text");
        process::exit(1);
    }
    if cli.mark.is_none() && cli.text.is_none() {
        eprintln!("Error: One of --mark or --text is required");
        process::exit(1);
    }
    if matches!(&cli.text, Some(t) if t.is_empty()) {
        eprintln!("Error: Watermark text must not be empty");
        process::exit(1);
    }
    if cli.opacity > 100 || cli.spacing > 100 {
        eprintln!("Error: Opacity and spacing must be between 0 and 100");
        process::exit(1);
    }
    if !(1..=100).contains(&cli.size) {
        eprintln!("Error: Size must be between 1 and 100");
        process::exit(1);
    }

    let Some(color) = parse_color(&cli.color) else {
        eprintln!("Error: Color must be R,G,B with each channel 0-255");
        process::exit(1);
    };

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    let base = match load_image(input_path) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("[FAIL] {}: {e}", cli.input);
            process::exit(1);
        }
    };

    let source = if let Some(mark_path) = &cli.mark {
        match load_image(Path::new(mark_path)) {
            Ok(img) => WatermarkSource::Image(img),
            Err(e) => {
                eprintln!("[FAIL] {mark_path}: {e}");
                process::exit(1);
            }
        }
    } else {
        let font = match &cli.font {
            Some(path) => TextFont::from_file(Path::new(path)),
            None => TextFont::system_default(),
        };
        let font = match font {
            Ok(f) => f,
            Err(e) => {
                eprintln!("[FAIL] font: {e}");
                process::exit(1);
            }
        };
        WatermarkSource::Text {
            text: cli.text.take().unwrap_or_default(),
            font,
            color: Rgb(color),
        }
    };

    let mut session = WatermarkSession::new(base, source);
    session.set_params(CompositeParameters::from_levels(
        cli.opacity,
        cli.size,
        cli.spacing,
    ));

    let output_path = match &cli.output {
        Some(o) => PathBuf::from(o),
        None => default_export_path(input_path),
    };

    match session.export_to(&output_path) {
        Ok(()) => {
            eprintln!("[OK] {}", output_path.display());
        }
        Err(e) => {
            eprintln!("[FAIL] {}: {e}", output_path.display());
            process::exit(1);
        }
    }
}

fn parse_color(s: &str) -> Option<[u8; 3]> {
    let parts: Vec<_> = s.split(',').map(|p| p.trim().parse::<u8>()).collect();
    match parts.as_slice() {
        [Ok(r), Ok(g), Ok(b)] => Some([*r, *g, *b]),
        _ => None,
    }
}
