use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use scan_editor_core::{
    geometry::{CropRect, Point},
    EditorConfig, ExportedImage, ImageEditor, ImageSource, Settings, Size,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rotate and crop a scanned page", long_about = None)]
struct Args {
    /// Image to edit
    input: PathBuf,

    /// Where to write the PNG (defaults to `<stem><suffix>.png` beside the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Quarter turn to apply, in order; may be repeated
    #[arg(long, value_enum)]
    rotate: Vec<Turn>,

    /// Crop rectangle in canvas pixels: x,y,width,height
    #[arg(long, value_parser = parse_crop)]
    crop: Option<CropRect>,

    /// Pointer drag on the crop overlay in canvas pixels: x0,y0:x1,y1; may be repeated
    #[arg(long, value_parser = parse_drag)]
    drag: Vec<(Point, Point)>,

    /// Viewport the canvas is fitted into: WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size)]
    viewport: Option<Size>,

    /// Also write the last rendered canvas as PNG
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Remember the viewport for future runs
    #[arg(long, default_value_t = false)]
    save_settings: bool,

    /// Log debug output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Turn {
    Left,
    Right,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = EditorConfig::load().context("Failed to load configuration")?;
    let mut settings = Settings::load();
    let viewport = args.viewport.unwrap_or_else(|| settings.viewport());

    // Load
    let mut editor = ImageEditor::new(config);
    editor.set_viewport(viewport.width, viewport.height);
    editor
        .load_image(ImageSource::Path(args.input.clone()))
        .await
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    if editor.frame().is_none() {
        bail!("Viewport {viewport} is too small to show the image");
    }

    // Replay edits
    for turn in &args.rotate {
        match turn {
            Turn::Left => editor.rotate_left(),
            Turn::Right => editor.rotate_right(),
        };
    }

    if args.crop.is_some() || !args.drag.is_empty() {
        if !editor.enter_crop() {
            bail!("Could not start cropping");
        }
        if let Some(crop) = args.crop {
            if !crop.has_area() {
                bail!("Crop rectangle {crop:?} has no area");
            }
            editor.set_crop_area(crop);
        }
        for (from, to) in &args.drag {
            if editor.pointer_down(*from).is_none() {
                tracing::warn!(x = from.x, y = from.y, "drag does not start on the crop, skipping");
                continue;
            }
            editor.pointer_move(*to);
            editor.pointer_up();
        }
        tracing::info!(crop = ?editor.state().crop, "crop selected");
        editor.apply_crop();
    }

    if let Some(path) = &args.preview {
        write_preview(&editor, path)?;
    }

    // Export
    let exported = editor.export().context("Failed to export image")?;
    let output = args.output.clone().unwrap_or_else(|| {
        let name = args
            .input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        args.input
            .with_file_name(ExportedImage::file_name_for(&name, &settings.output_suffix))
    });
    exported
        .write_to(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "{} ({}x{}, {})",
        output.display(),
        exported.width,
        exported.height,
        exported.mime()
    );

    if args.save_settings {
        settings.viewport_width = viewport.width;
        settings.viewport_height = viewport.height;
        settings.save().context("Failed to save settings")?;
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_preview(editor: &ImageEditor, path: &Path) -> Result<()> {
    let frame = editor.frame().context("No frame has been rendered")?;
    ExportedImage::from_surface(&frame.pixels)
        .and_then(|png| png.write_to(path))
        .with_context(|| format!("Failed to write preview {}", path.display()))?;
    println!("preview: {} ({})", path.display(), frame.canvas);
    Ok(())
}

fn parse_numbers<const N: usize>(value: &str, separator: char) -> Result<[f64; N], String> {
    let parts: Vec<&str> = value.split(separator).map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {N} numbers separated by '{separator}'"));
    }
    let mut numbers = [0.0; N];
    for (slot, part) in numbers.iter_mut().zip(parts) {
        *slot = part
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| format!("'{part}' is not a number"))?;
    }
    Ok(numbers)
}

fn parse_point(value: &str) -> Result<Point, String> {
    let [x, y] = parse_numbers::<2>(value, ',')?;
    Ok(Point::new(x, y))
}

fn parse_crop(value: &str) -> Result<CropRect, String> {
    let [x, y, width, height] = parse_numbers::<4>(value, ',')?;
    Ok(CropRect::new(x, y, width, height))
}

fn parse_drag(value: &str) -> Result<(Point, Point), String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| "expected x0,y0:x1,y1".to_string())?;
    Ok((parse_point(from)?, parse_point(to)?))
}

fn parse_size(value: &str) -> Result<Size, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = width.trim().parse::<u32>().map_err(|e| format!("width: {e}"))?;
    let height = height.trim().parse::<u32>().map_err(|e| format!("height: {e}"))?;
    let size = Size::new(width, height);
    if size.is_empty() {
        return Err("viewport must not be empty".to_string());
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_crop_rectangles() {
        assert_eq!(
            parse_crop("10, 20,300,400.5").expect("valid crop"),
            CropRect::new(10.0, 20.0, 300.0, 400.5)
        );
        assert!(parse_crop("1,2,3").is_err());
        assert!(parse_crop("1,2,3,nan").is_err());
    }

    #[test]
    fn parses_drags() {
        let (from, to) = parse_drag("450,200:0,200").expect("valid drag");
        assert_eq!(from, Point::new(450.0, 200.0));
        assert_eq!(to, Point::new(0.0, 200.0));
        assert!(parse_drag("450,200").is_err());
    }

    #[test]
    fn parses_viewports() {
        assert_eq!(parse_size("1280x800").expect("valid size"), Size::new(1280, 800));
        assert_eq!(parse_size("640X480").expect("valid size"), Size::new(640, 480));
        assert!(parse_size("0x480").is_err());
        assert!(parse_size("1280").is_err());
    }

    #[test]
    fn args_accept_repeated_edits() {
        let args = Args::try_parse_from([
            "scan-edit",
            "page.jpg",
            "--rotate",
            "right",
            "--rotate",
            "left",
            "--drag",
            "0,0:10,10",
            "--drag",
            "5,5:1,1",
            "--viewport",
            "800x600",
        ])
        .expect("arguments should parse");
        assert_eq!(args.rotate.len(), 2);
        assert_eq!(args.drag.len(), 2);
        assert_eq!(args.viewport, Some(Size::new(800, 600)));
        assert!(args.crop.is_none());
    }
}
