//! Tray icon rendering
//!
//! Draws a 32x32 image with two horizontal bars: session quota on top and
//! weekly quota below, each filled by the remaining share.

use std::path::Path;

use image::{imageops::FilterType, ImageBuffer, Rgba, RgbaImage};
use tray_icon::Icon;

use crate::core::ProviderPayload;
use crate::runner::RefreshSnapshot;

pub const ICON_SIZE: u32 = 32;

const BAR_LEFT: u32 = 4;
const BAR_RIGHT: u32 = ICON_SIZE - 4;
const SESSION_ROWS: std::ops::Range<u32> = 8..15;
const WEEKLY_ROWS: std::ops::Range<u32> = 18..23;
const TRACK: Rgba<u8> = Rgba([80, 80, 90, 255]);
const BADGE: Rgba<u8> = Rgba([255, 60, 60, 255]);

/// Usage status level for bar color
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UsageLevel {
    /// 0-50% used - green
    Low,
    /// 50-80% used - yellow
    Medium,
    /// 80-95% used - orange
    High,
    /// 95-100% used - red
    Critical,
}

impl UsageLevel {
    pub fn from_used_percent(percent: f64) -> Self {
        match percent {
            p if p < 50.0 => UsageLevel::Low,
            p if p < 80.0 => UsageLevel::Medium,
            p if p < 95.0 => UsageLevel::High,
            _ => UsageLevel::Critical,
        }
    }

    /// RGB color for this level
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            UsageLevel::Low => (76, 175, 80),
            UsageLevel::Medium => (255, 193, 7),
            UsageLevel::High => (255, 152, 0),
            UsageLevel::Critical => (244, 67, 54),
        }
    }
}

/// Icon overlay for status indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconOverlay {
    #[default]
    None,
    /// Grayed out bars with a red X
    Error,
}

/// What the generated icon shows
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IconState {
    /// Remaining session quota, 0..=100
    pub session_remaining: Option<f64>,
    /// Remaining weekly quota, 0..=100
    pub weekly_remaining: Option<f64>,
    pub overlay: IconOverlay,
}

impl IconState {
    /// Icon for a refresh snapshot
    ///
    /// Uses the first provider without an error. The error overlay is shown
    /// when the panel command failed or every reported provider failed.
    pub fn from_snapshot(snapshot: &RefreshSnapshot) -> Self {
        let healthy = snapshot.payloads.iter().find(|p| p.error.is_none());
        let all_failed = !snapshot.payloads.is_empty() && healthy.is_none();
        let overlay = if !snapshot.panel_ok || all_failed {
            IconOverlay::Error
        } else {
            IconOverlay::None
        };

        match healthy {
            Some(payload) => Self::for_payload(payload, overlay),
            None => Self {
                overlay,
                ..Self::default()
            },
        }
    }

    fn for_payload(payload: &ProviderPayload, overlay: IconOverlay) -> Self {
        Self {
            session_remaining: payload.session().remaining_percent(),
            weekly_remaining: payload.weekly().remaining_percent(),
            overlay,
        }
    }
}

/// Render the two-bar icon image
pub fn render_bar_image(state: &IconState) -> RgbaImage {
    let mut img: RgbaImage = ImageBuffer::from_pixel(ICON_SIZE, ICON_SIZE, Rgba([0, 0, 0, 0]));

    let bg_alpha = match state.overlay {
        IconOverlay::Error => 180,
        IconOverlay::None => 255,
    };
    for y in 2..ICON_SIZE - 2 {
        for x in 2..ICON_SIZE - 2 {
            img.put_pixel(x, y, Rgba([60, 60, 70, bg_alpha]));
        }
    }

    draw_bar(&mut img, SESSION_ROWS, state.session_remaining, state.overlay);
    draw_bar(&mut img, WEEKLY_ROWS, state.weekly_remaining, state.overlay);

    if state.overlay == IconOverlay::Error {
        draw_error_badge(&mut img);
    }
    img
}

fn draw_bar(img: &mut RgbaImage, rows: std::ops::Range<u32>, remaining: Option<f64>, overlay: IconOverlay) {
    let width = BAR_RIGHT - BAR_LEFT;
    let remaining = remaining.unwrap_or(0.0).clamp(0.0, 100.0);
    let fill = ((remaining / 100.0) * width as f64).round() as u32;

    let (r, g, b) = UsageLevel::from_used_percent(100.0 - remaining).color();
    let color = match overlay {
        IconOverlay::Error => {
            let gray = ((r as u16 + g as u16 + b as u16) / 3) as u8;
            Rgba([gray, gray, gray, 255])
        }
        IconOverlay::None => Rgba([r, g, b, 255]),
    };

    for y in rows {
        for x in BAR_LEFT..BAR_RIGHT {
            let pixel = if x < BAR_LEFT + fill { color } else { TRACK };
            img.put_pixel(x, y, pixel);
        }
    }
}

/// Red X in the bottom-right corner
fn draw_error_badge(img: &mut RgbaImage) {
    for i in 0..6 {
        img.put_pixel(ICON_SIZE - 8 + i, ICON_SIZE - 8 + i, BADGE);
        img.put_pixel(ICON_SIZE - 3 - i, ICON_SIZE - 8 + i, BADGE);
    }
}

/// Build a tray icon for `state`
pub fn bar_icon(state: &IconState) -> anyhow::Result<Icon> {
    to_icon(render_bar_image(state))
}

/// Load an icon image from disk, scaled to the tray size
pub fn load_icon_file(path: &Path) -> anyhow::Result<Icon> {
    let img = image::open(path)?
        .resize_exact(ICON_SIZE, ICON_SIZE, FilterType::Lanczos3)
        .into_rgba8();
    to_icon(img)
}

fn to_icon(img: RgbaImage) -> anyhow::Result<Icon> {
    let (width, height) = img.dimensions();
    Ok(Icon::from_rgba(img.into_raw(), width, height)?)
}
