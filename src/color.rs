use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

/// One colour per kind of series drawn by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesColors {
    pub region: Color32,
    pub state_average: Color32,
    pub growth: Color32,
    pub marker: Color32,
}

impl Default for SeriesColors {
    fn default() -> Self {
        let p = generate_palette(4);
        SeriesColors {
            region: p[2],
            state_average: p[0],
            growth: p[1],
            marker: p[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        for i in 0..p.len() {
            for j in i + 1..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
    }

    #[test]
    fn series_colours_differ() {
        let c = SeriesColors::default();
        assert_ne!(c.region, c.state_average);
        assert_ne!(c.region, c.growth);
    }
}
