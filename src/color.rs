use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

use crate::data::category::Category;

// ---------------------------------------------------------------------------
// Fixed chart colours
// ---------------------------------------------------------------------------

pub const SERIES_COLOR: Color32 = Color32::from_rgb(0x1E, 0x4F, 0xD8);
/// Top-ranked station in the bar chart.
pub const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(0x90, 0xCA, 0xF9);
pub const MUTED_COLOR: Color32 = Color32::from_rgb(0xD3, 0xD3, 0xD3);
pub const UNDEFINED_COLOR: Color32 = Color32::from_gray(90);

/// Bar fills: the first (highest) bar is highlighted, the rest muted.
pub fn bar_colors(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| if i == 0 { HIGHLIGHT_COLOR } else { MUTED_COLOR })
        .collect()
}

/// Conventional AQI swatch for a category.
pub fn category_color(category: Category) -> Color32 {
    match category {
        Category::Low => Color32::from_rgb(0x00, 0xE4, 0x00),
        Category::Moderate => Color32::from_rgb(0xFF, 0xFF, 0x00),
        Category::UnhealthyForSensitiveGroups => Color32::from_rgb(0xFF, 0x7E, 0x00),
        Category::Unhealthy => Color32::from_rgb(0xFF, 0x00, 0x00),
        Category::VeryUnhealthy => Color32::from_rgb(0x8F, 0x3F, 0x97),
        Category::Hazardous => Color32::from_rgb(0x7E, 0x00, 0x23),
    }
}

// ---------------------------------------------------------------------------
// Diverging map for the correlation heatmap
// ---------------------------------------------------------------------------

const COOL: (u8, u8, u8) = (59, 76, 192);
const NEUTRAL: (u8, u8, u8) = (221, 221, 221);
const WARM: (u8, u8, u8) = (180, 4, 38);

fn linear(rgb: (u8, u8, u8)) -> LinSrgb {
    Srgb::new(rgb.0, rgb.1, rgb.2).into_format::<f32>().into_linear()
}

/// Blue → grey → red for a coefficient in [-1, 1]; NaN is dark grey.
pub fn coolwarm(value: f64) -> Color32 {
    if value.is_nan() {
        return UNDEFINED_COLOR;
    }
    let t = value.clamp(-1.0, 1.0) as f32;
    let mixed = if t < 0.0 {
        linear(NEUTRAL).mix(linear(COOL), -t)
    } else {
        linear(NEUTRAL).mix(linear(WARM), t)
    };
    let rgb: Srgb<u8> = Srgb::from_linear(mixed);
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Readable annotation colour on top of a [`coolwarm`] cell.
pub fn annotation_color(value: f64) -> Color32 {
    if value.is_nan() || value.abs() > 0.6 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(c: Color32, rgb: (u8, u8, u8)) -> bool {
        let d = |a: u8, b: u8| (a as i16 - b as i16).abs() <= 1;
        d(c.r(), rgb.0) && d(c.g(), rgb.1) && d(c.b(), rgb.2)
    }

    #[test]
    fn coolwarm_endpoints() {
        assert!(close(coolwarm(-1.0), COOL));
        assert!(close(coolwarm(1.0), WARM));
        assert!(close(coolwarm(0.0), NEUTRAL));
        assert!(close(coolwarm(7.5), WARM));
        assert_eq!(coolwarm(f64::NAN), UNDEFINED_COLOR);
    }

    #[test]
    fn only_first_bar_highlighted() {
        assert_eq!(bar_colors(3), vec![HIGHLIGHT_COLOR, MUTED_COLOR, MUTED_COLOR]);
        assert!(bar_colors(0).is_empty());
    }
}
