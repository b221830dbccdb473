//! Theme colors and sizes for the dark dashboard popup

use egui::Color32;

/// Dark translucent-panel theme
pub struct Theme;

impl Theme {
    // ─────────────────────────────────────────────────────────────
    // Background
    // ─────────────────────────────────────────────────────────────

    /// Window background
    pub const BG_PRIMARY: Color32 = Color32::from_rgb(24, 26, 36);

    /// Provider card fill
    pub const CARD_BG: Color32 = Color32::from_rgb(33, 35, 45);

    /// Search field fill
    pub const INPUT_BG: Color32 = Color32::from_rgb(43, 45, 55);

    // ─────────────────────────────────────────────────────────────
    // Text colors
    // ─────────────────────────────────────────────────────────────

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(248, 251, 255);

    /// Subtitles and reset hints
    pub const TEXT_SUBTLE: Color32 = Color32::from_rgb(220, 225, 240);

    pub const TEXT_ERROR: Color32 = Color32::from_rgb(255, 120, 110);

    // ─────────────────────────────────────────────────────────────
    // Lines
    // ─────────────────────────────────────────────────────────────

    /// Header rule and card borders
    pub const BORDER: Color32 = Color32::from_rgb(50, 52, 62);

    pub const INPUT_BORDER: Color32 = Color32::from_rgb(59, 61, 70);

    // ─────────────────────────────────────────────────────────────
    // Progress bars
    // ─────────────────────────────────────────────────────────────

    pub const PROGRESS_TRACK: Color32 = Color32::from_rgb(52, 54, 64);

    /// Gradient start (left)
    pub const PROGRESS_START: Color32 = Color32::from_rgb(98, 208, 255);

    /// Gradient end (right)
    pub const PROGRESS_END: Color32 = Color32::from_rgb(123, 226, 155);

    /// Primary button fill
    pub const ACCENT: Color32 = Color32::from_rgb(53, 132, 228);

    /// Interpolate the progress gradient at `t` in 0..=1
    pub fn progress_color(t: f32) -> Color32 {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color32::from_rgb(
            lerp(Self::PROGRESS_START.r(), Self::PROGRESS_END.r()),
            lerp(Self::PROGRESS_START.g(), Self::PROGRESS_END.g()),
            lerp(Self::PROGRESS_START.b(), Self::PROGRESS_END.b()),
        )
    }
}

/// Spacing in points
pub struct Spacing;

impl Spacing {
    pub const XS: f32 = 4.0;
    pub const SM: f32 = 8.0;
    pub const MD: f32 = 10.0;
    pub const LG: f32 = 14.0;
    pub const XL: f32 = 16.0;
}

pub struct Radius;

impl Radius {
    pub const MD: f32 = 10.0;
    pub const LG: f32 = 12.0;
    pub const PILL: f32 = 999.0;
}

pub struct FontSize;

impl FontSize {
    pub const SM: f32 = 12.0;
    pub const MD: f32 = 13.0;
    pub const TITLE: f32 = 16.0;
}
