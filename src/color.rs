use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Hue of the first series; the rest are spread evenly from here.
const BASE_HUE: f32 = 210.0;

/// Alpha used when filling bands, wedges and bars.
const FILL_ALPHA: u8 = 150;

/// `n` distinct colours with evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n).map(|i| series_color(i, n)).collect()
}

/// Colour of series `index` out of `total`.
pub fn series_color(index: usize, total: usize) -> Color32 {
    let step = 360.0 / total.max(1) as f32;
    let hue = (BASE_HUE + step * index as f32) % 360.0;
    let rgb: Srgb = Hsl::new(hue, 0.70, 0.50).into_color();
    let [r, g, b] = [rgb.red, rgb.green, rgb.blue].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color32::from_rgb(r, g, b)
}

/// Translucent variant of `color` for filled shapes.
pub fn fill(color: Color32) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), FILL_ALPHA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colours = generate_palette(6);
        assert_eq!(colours.len(), 6);
        for (i, a) in colours.iter().enumerate() {
            assert!(colours[i + 1..].iter().all(|b| a != b));
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn single_series_uses_base_hue() {
        let c = series_color(0, 1);
        assert!(c.b() > c.r(), "expected a blue, got {c:?}");
        assert_eq!(series_color(3, 1), c);
    }

    #[test]
    fn fill_keeps_hue() {
        let c = fill(Color32::from_rgb(10, 20, 30));
        assert_eq!(c.a(), FILL_ALPHA);
    }
}
