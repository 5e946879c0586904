//! Colors shared by the panels.

use client_core::presentation::{parse_hex_color, HEALTHY_COLOR};
use eframe::egui::Color32;

pub const ACCENT: Color32 = Color32::from_rgb(0x4C, 0xAF, 0x50);
pub const WARNING: Color32 = Color32::from_rgb(0xFF, 0x98, 0x00);
pub const ERROR: Color32 = Color32::from_rgb(0xE5, 0x39, 0x35);
pub const DROP_HIGHLIGHT: Color32 = Color32::from_rgb(0x81, 0xC7, 0x84);

/// Parses a `#RRGGBB` token, falling back to the healthy green.
pub fn color_from_hex(token: &str) -> Color32 {
    parse_hex_color(token)
        .or_else(|| parse_hex_color(HEALTHY_COLOR))
        .map(|(r, g, b)| Color32::from_rgb(r, g, b))
        .unwrap_or(ACCENT)
}

/// Black or white, whichever reads better on `background`.
pub fn text_on(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 160.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
