use eframe::egui::Color32;
use palette::rgb::FromHexError;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Chart colours
// ---------------------------------------------------------------------------

/// Bar fill plus a lighter shade used for the hovered bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarColors {
    pub fill: Color32,
    pub highlight: Color32,
}

impl Default for BarColors {
    fn default() -> Self {
        let fill = Srgb::<u8>::new(0x00, 0x83, 0xB8);
        BarColors {
            fill: to_color32(fill),
            highlight: to_color32(lighten(fill, 0.15)),
        }
    }
}

impl BarColors {
    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, FromHexError> {
        let fill: Srgb<u8> = hex.trim().parse()?;
        Ok(BarColors {
            fill: to_color32(fill),
            highlight: to_color32(lighten(fill, 0.15)),
        })
    }
}

/// Raise HSL lightness by `amount`, capped at 0.95 so the shade stays visible.
fn lighten(color: Srgb<u8>, amount: f32) -> Srgb<u8> {
    let mut hsl: Hsl = color.into_format::<f32>().into_color();
    hsl.lightness = (hsl.lightness + amount).min(0.95);
    let rgb: Srgb = hsl.into_color();
    rgb.into_format()
}

fn to_color32(c: Srgb<u8>) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}
