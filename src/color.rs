use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, 0.7, 0.55).into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Stable colour per category label, assigned in sorted label order so a
/// category keeps its colour across charts.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CategoryColors {
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a String>) -> Self {
        let labels: Vec<&String> = labels.into_iter().collect();
        let mapping = labels
            .iter()
            .zip(generate_palette(labels.len()))
            .map(|(label, color)| ((*label).clone(), color))
            .collect();
        CategoryColors { mapping }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Sequential scale for value-coloured marks
// ---------------------------------------------------------------------------

/// Stops of a sunset-style scale, dark violet to pale yellow.
const SUNSET: [(u8, u8, u8); 5] = [
    (75, 41, 145),
    (192, 54, 157),
    (234, 79, 136),
    (250, 120, 118),
    (237, 217, 163),
];

/// Colour for `t` in `[0, 1]` on the sunset scale; values outside are clamped.
pub fn sequential(t: f64) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) as f32 } else { 0.0 };
    let span = (SUNSET.len() - 1) as f32;
    let pos = t * span;
    let i = (pos.floor() as usize).min(SUNSET.len() - 2);
    let frac = pos - i as f32;

    let stop = |(r, g, b): (u8, u8, u8)| -> LinSrgb { Srgb::new(r, g, b).into_format::<f32>().into_linear() };
    let mixed = stop(SUNSET[i]).mix(stop(SUNSET[i + 1]), frac);
    to_color32(Srgb::from_linear(mixed))
}

/// Sequential colour of `value` relative to `min..=max`.
pub fn scaled(value: f64, min: f64, max: f64) -> Color32 {
    let range = max - min;
    if range.abs() < f64::EPSILON {
        return sequential(1.0);
    }
    sequential((value - min) / range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let colours = generate_palette(4);
        assert_eq!(colours.len(), 4);
        assert_ne!(colours[0], colours[2]);
    }

    #[test]
    fn categories_map_consistently() {
        let labels = vec!["Hotel room".to_string(), "Shared room".to_string()];
        let colors = CategoryColors::new(&labels);
        assert_eq!(colors.color_for("Hotel room"), colors.color_for("Hotel room"));
        assert_ne!(colors.color_for("Hotel room"), colors.color_for("Shared room"));
        assert_eq!(colors.color_for("Tent"), Color32::GRAY);
    }

    #[test]
    fn sequential_scale_hits_endpoints() {
        assert_eq!(sequential(0.0), Color32::from_rgb(75, 41, 145));
        assert_eq!(sequential(1.0), Color32::from_rgb(237, 217, 163));
        assert_eq!(sequential(7.0), sequential(1.0));
        assert_eq!(scaled(5.0, 5.0, 5.0), sequential(1.0));
    }
}
