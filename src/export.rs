use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use eframe::egui::{vec2, ColorImage, Pos2, Rect};
use image::RgbaImage;

/// Name offered by the save dialog: `<stem><suffix>.png`, or `plot.png`.
pub fn default_export_name(source: Option<&Path>, suffix: &str) -> String {
    match source.and_then(Path::file_stem).map(|s| s.to_string_lossy()) {
        Some(stem) if !stem.is_empty() => format!("{stem}{suffix}.png"),
        _ => "plot.png".to_string(),
    }
}

/// Append `.png` when the chosen path has no extension.
pub fn with_png_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("png")
    }
}

/// Cut the chart area (in points) out of a full-viewport screenshot.
pub fn crop(screenshot: &ColorImage, area: Option<Rect>, pixels_per_point: f32) -> ColorImage {
    let [width, height] = screenshot.size;
    let bounds = Rect::from_min_size(
        Pos2::ZERO,
        vec2(width as f32, height as f32) / pixels_per_point,
    );
    match area.map(|rect| rect.intersect(bounds)) {
        Some(rect) if rect.is_positive() => screenshot.region(&rect, Some(pixels_per_point)),
        _ => screenshot.clone(),
    }
}

/// Encode `image` as PNG at `path`.
pub fn write_png(image: &ColorImage, path: &Path) -> Result<()> {
    let [width, height] = image.size;
    if width == 0 || height == 0 {
        bail!("the captured image is empty");
    }

    let bytes: Vec<u8> = image
        .pixels
        .iter()
        .flat_map(|p| p.to_srgba_unmultiplied())
        .collect();
    let buffer = RgbaImage::from_raw(width as u32, height as u32, bytes)
        .context("screenshot size does not match its pixel data")?;

    buffer
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
