use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use superstore_dashboard::config::PaletteSettings;
use superstore_dashboard::data::model::Category;

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

/// Parse `#rrggbb` (the leading `#` is optional).
pub fn parse_hex(hex: &str) -> Option<Color32> {
    let rgb = Srgb::<u8>::from_str(hex.trim()).ok()?;
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

fn hex_or(name: &str, hex: &str, fallback: Color32) -> Color32 {
    parse_hex(hex).unwrap_or_else(|| {
        log::warn!("palette.{name}: '{hex}' is not a #rrggbb colour, using default");
        fallback
    })
}

// ---------------------------------------------------------------------------
// Chart styles resolved from configuration
// ---------------------------------------------------------------------------

/// Concrete colours for every dashboard element.
#[derive(Debug, Clone)]
pub struct ChartStyles {
    pub sales: Color32,
    pub profit: Color32,
    pub orders: Color32,
    pub loss: Color32,
    pub shipping: Color32,
    pub card_background: Color32,
    pub card_title: Color32,
    heatmap_low: Color32,
    heatmap_high: Color32,
    /// Categories in stacking order with their colours.
    categories: Vec<(Category, Color32)>,
}

impl ChartStyles {
    pub fn from_settings(palette: &PaletteSettings) -> Self {
        let generated = generate_palette(Category::ALL.len());
        let mut categories: Vec<(Category, Color32)> = Vec::new();
        for style in &palette.categories {
            if categories.iter().any(|(c, _)| *c == style.category) {
                continue;
            }
            let fallback = generated[categories.len() % generated.len()];
            categories.push((
                style.category,
                hex_or(style.category.as_str(), &style.color, fallback),
            ));
        }
        for (i, category) in Category::ALL.into_iter().enumerate() {
            if !categories.iter().any(|(c, _)| *c == category) {
                categories.push((category, generated[i]));
            }
        }

        ChartStyles {
            sales: hex_or("sales", &palette.sales, Color32::GOLD),
            profit: hex_or("profit", &palette.profit, Color32::LIGHT_BLUE),
            orders: hex_or("orders", &palette.orders, Color32::GOLD),
            loss: hex_or("loss", &palette.loss, Color32::LIGHT_RED),
            shipping: hex_or("shipping", &palette.shipping, Color32::LIGHT_BLUE),
            card_background: hex_or(
                "card_background",
                &palette.card_background,
                Color32::DARK_BLUE,
            ),
            card_title: hex_or("card_title", &palette.card_title, Color32::GOLD),
            heatmap_low: hex_or("heatmap_low", &palette.heatmap_low, Color32::WHITE),
            heatmap_high: hex_or("heatmap_high", &palette.heatmap_high, Color32::DARK_BLUE),
            categories,
        }
    }

    pub fn category_color(&self, category: Category) -> Color32 {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, color)| *color)
            .unwrap_or(Color32::GRAY)
    }

    /// Colour for a correlation coefficient in `[-1, 1]`; grey for `NaN`.
    pub fn heat_color(&self, value: f64) -> Color32 {
        if value.is_nan() {
            return Color32::GRAY;
        }
        let t = ((value.clamp(-1.0, 1.0) + 1.0) / 2.0) as f32;
        let mixed = linear(self.heatmap_low).mix(linear(self.heatmap_high), t);
        let rgb = Srgb::<u8>::from_linear(mixed);
        Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
    }

    /// Readable label colour on top of `background`.
    pub fn text_on(background: Color32) -> Color32 {
        let luma = 0.299 * background.r() as f32
            + 0.587 * background.g() as f32
            + 0.114 * background.b() as f32;
        if luma > 140.0 {
            Color32::BLACK
        } else {
            Color32::WHITE
        }
    }
}

fn linear(c: Color32) -> LinSrgb {
    Srgb::<u8>::new(c.r(), c.g(), c.b()).into_linear()
}

#[cfg(test)]
mod tests {
    use super::*;
    use superstore_dashboard::config::CategoryStyle;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!(parse_hex("#0058a3"), Some(Color32::from_rgb(0x00, 0x58, 0xa3)));
        assert_eq!(parse_hex("ffcc00"), Some(Color32::from_rgb(0xff, 0xcc, 0x00)));
        assert_eq!(parse_hex("blue"), None);
    }

    #[test]
    fn configured_categories_keep_their_colours_and_missing_ones_are_generated() {
        let palette = PaletteSettings {
            categories: vec![CategoryStyle {
                category: Category::Technology,
                color: "#112233".into(),
            }],
            ..PaletteSettings::default()
        };
        let styles = ChartStyles::from_settings(&palette);
        assert_eq!(
            styles.category_color(Category::Technology),
            Color32::from_rgb(0x11, 0x22, 0x33)
        );
        assert_ne!(styles.category_color(Category::Furniture), Color32::GRAY);
    }

    fn close(a: Color32, b: Color32) -> bool {
        a.r().abs_diff(b.r()) <= 1 && a.g().abs_diff(b.g()) <= 1 && a.b().abs_diff(b.b()) <= 1
    }

    #[test]
    fn heat_scale_hits_both_ends() {
        let styles = ChartStyles::from_settings(&PaletteSettings::default());
        assert!(close(styles.heat_color(-1.0), Color32::from_rgb(0xff, 0xff, 0xd9)));
        assert!(close(styles.heat_color(1.0), Color32::from_rgb(0x08, 0x1d, 0x58)));
        assert_eq!(styles.heat_color(f64::NAN), Color32::GRAY);
        assert_eq!(ChartStyles::text_on(Color32::WHITE), Color32::BLACK);
    }
}
