//! Popup placement relative to the pointer or the tray icon
//!
//! All coordinates are physical pixels in the desktop coordinate space.

/// Horizontal bias so a pointer-anchored popup opens mostly to the left of
/// the cursor.
pub const POINTER_X_BIAS: i32 = 24;

/// Default gap between the popup, its anchor, and the monitor edges
pub const DEFAULT_MARGIN: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Whether `other` lies entirely inside this rectangle
    #[cfg(test)]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupSize {
    pub width: i32,
    pub height: i32,
}

impl PopupSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Use `fallback` on any axis the window has not sized yet (<= 1 px)
    pub fn or_fallback(self, fallback: PopupSize) -> Self {
        Self {
            width: if self.width <= 1 { fallback.width } else { self.width },
            height: if self.height <= 1 { fallback.height } else { self.height },
        }
    }

    /// Popup rectangle with its top-left corner at `origin`
    #[cfg(test)]
    pub fn at(&self, origin: Point) -> Rect {
        Rect::new(origin.x, origin.y, self.width, self.height)
    }
}

/// What the popup is positioned relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Pointer location
    Pointer(Point),
    /// Tray icon bounds
    Icon(Rect),
}

/// Where to open the popup: an anchor plus, when the platform can tell, the
/// geometry of the monitor containing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupTarget {
    pub anchor: Anchor,
    pub monitor: Option<Rect>,
}

impl PopupTarget {
    pub fn new(anchor: Anchor) -> Self {
        Self { anchor, monitor: None }
    }

    pub fn on_monitor(anchor: Anchor, monitor: Rect) -> Self {
        Self {
            anchor,
            monitor: Some(monitor),
        }
    }
}

/// Compute the top-left corner for a popup of `popup` size
///
/// Pointer anchors open left of the cursor, above it on the lower half of the
/// monitor and below it on the upper half. Icon anchors are centered
/// horizontally and open above the icon, flipping below when that would cross
/// the top of the monitor. The result is always clamped into the monitor
/// inset by `margin`; see [`clamp_axis`] for monitors too small to fit.
pub fn place(anchor: Anchor, popup: PopupSize, monitor: Rect, margin: i32) -> Point {
    let raw = preferred_position(anchor, popup, monitor, margin);
    Point::new(
        clamp_axis(raw.x, monitor.x, monitor.width, popup.width, margin),
        clamp_axis(raw.y, monitor.y, monitor.height, popup.height, margin),
    )
}

/// Preferred top-left corner before clamping into the monitor
pub fn preferred_position(anchor: Anchor, popup: PopupSize, monitor: Rect, margin: i32) -> Point {
    match anchor {
        Anchor::Pointer(p) => {
            let x = p.x - popup.width + POINTER_X_BIAS;
            let y = if p.y > monitor.y + monitor.height / 2 {
                p.y - popup.height - margin
            } else {
                p.y + margin
            };
            Point::new(x, y)
        }
        Anchor::Icon(icon) => {
            let x = icon.x + icon.width / 2 - popup.width / 2;
            let mut y = icon.y - popup.height - margin;
            if y < monitor.y + margin {
                y = icon.bottom() + margin;
            }
            Point::new(x, y)
        }
    }
}

/// Clamp one coordinate into `[start + margin, start + extent - size - margin]`
///
/// When the monitor is too small for the popup plus both margins the bounds
/// invert; the coordinate is then pinned to the monitor origin (`start`).
pub fn clamp_axis(value: i32, start: i32, extent: i32, size: i32, margin: i32) -> i32 {
    let min = start.saturating_add(margin);
    let max = start
        .saturating_add(extent)
        .saturating_sub(size)
        .saturating_sub(margin);
    if min > max {
        return start;
    }
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_flips_below_top_panel() {
        let monitor = Rect::new(0, 0, 1000, 40);
        let icon = Rect::new(100, 0, 20, 40);
        let popup = PopupSize::new(200, 300);

        // Above would be 0 - 300 - 8 = -308, past the top edge: flip below
        let raw = preferred_position(Anchor::Icon(icon), popup, monitor, 8);
        assert_eq!(raw, Point::new(10, 48));

        // The 40px tall monitor cannot hold the popup, so y pins to the origin
        let p = place(Anchor::Icon(icon), popup, monitor, 8);
        assert_eq!(p, Point::new(10, 0));
    }

    #[test]
    fn test_icon_flip_on_tall_monitor() {
        // Top panel icon on a full-size monitor: flipped below the icon
        let monitor = Rect::new(0, 0, 1000, 800);
        let icon = Rect::new(100, 0, 20, 40);
        let p = place(Anchor::Icon(icon), PopupSize::new(200, 300), monitor, 8);
        assert_eq!(p, Point::new(10, 48));
    }

    #[test]
    fn test_icon_prefers_above_bottom_panel() {
        let monitor = Rect::new(0, 0, 1920, 1080);
        let icon = Rect::new(1800, 1050, 24, 24);
        let popup = PopupSize::new(430, 560);
        let p = place(Anchor::Icon(icon), popup, monitor, 8);

        assert_eq!(p.y, 1050 - 560 - 8);
        // Centered x would overflow the right edge, clamped to the max bound
        assert_eq!(p.x, 1920 - 430 - 8);
    }

    #[test]
    fn test_pointer_lower_half() {
        let monitor = Rect::new(0, 0, 1000, 800);
        let popup = PopupSize::new(300, 400);
        let anchor = Anchor::Pointer(Point::new(900, 700));

        // 700 is past the midpoint (400): open above the pointer
        let raw = preferred_position(anchor, popup, monitor, 8);
        assert_eq!(raw, Point::new(624, 292));
        assert_eq!(place(anchor, popup, monitor, 8), Point::new(624, 292));
    }

    #[test]
    fn test_pointer_upper_half_clamps_bottom() {
        // Pointer above the midpoint opens below and clamps to the bottom bound
        let monitor = Rect::new(0, 0, 1000, 800);
        let p = place(
            Anchor::Pointer(Point::new(900, 390)),
            PopupSize::new(300, 400),
            monitor,
            8,
        );
        // Raw x = 624 within [8, 692]; raw y = 398 clamped to 800 - 400 - 8
        assert_eq!(p, Point::new(624, 392));
    }

    #[test]
    fn test_pointer_midpoint_opens_below() {
        let monitor = Rect::new(0, 0, 1000, 800);
        let p = place(
            Anchor::Pointer(Point::new(500, 400)),
            PopupSize::new(100, 100),
            monitor,
            8,
        );
        assert_eq!(p, Point::new(424, 408));
    }

    #[test]
    fn test_clamp_axis_bounds() {
        // Raw y = 700 + 8 on a 800px monitor with a 400px popup
        assert_eq!(clamp_axis(708, 0, 800, 400, 8), 392);
        assert_eq!(clamp_axis(624, 0, 1000, 300, 8), 624);
        assert_eq!(clamp_axis(-50, 0, 1000, 300, 8), 8);
        // Extreme extents saturate instead of overflowing
        assert_eq!(clamp_axis(0, i32::MAX - 10, i32::MAX, 100, 8), i32::MAX - 10);
        assert_eq!(clamp_axis(5, 0, 1000, i32::MAX, 8), 0);
    }

    #[test]
    fn test_offset_monitor() {
        // Second monitor to the right with a negative y origin
        let monitor = Rect::new(1920, -200, 1280, 1024);
        let p = place(
            Anchor::Pointer(Point::new(1925, -190)),
            PopupSize::new(300, 400),
            monitor,
            8,
        );
        assert_eq!(p, Point::new(1928, -182));
        assert!(monitor.contains_rect(&PopupSize::new(300, 400).at(p)));
    }

    #[test]
    fn test_degenerate_monitor_pins_to_origin() {
        let monitor = Rect::new(50, 60, 200, 100);
        let popup = PopupSize::new(430, 560);

        let p = place(Anchor::Pointer(Point::new(120, 90)), popup, monitor, 8);
        assert_eq!(p, Point::new(50, 60));

        let p = place(Anchor::Icon(Rect::new(100, 70, 16, 16)), popup, monitor, 8);
        assert_eq!(p, Point::new(50, 60));
    }

    #[test]
    fn test_degenerate_only_on_one_axis() {
        // Wide but short monitor: x clamps normally, y pins
        let monitor = Rect::new(0, 0, 1000, 300);
        let p = place(
            Anchor::Pointer(Point::new(900, 200)),
            PopupSize::new(300, 400),
            monitor,
            8,
        );
        assert_eq!(p, Point::new(624, 0));
    }

    #[test]
    fn test_margin_equal_fit_is_not_degenerate() {
        // popup + 2 * margin == monitor: exactly one valid position
        let monitor = Rect::new(0, 0, 316, 416);
        let p = place(
            Anchor::Pointer(Point::new(0, 0)),
            PopupSize::new(300, 400),
            monitor,
            8,
        );
        assert_eq!(p, Point::new(8, 8));
    }

    #[test]
    fn test_always_contained_when_monitor_fits() {
        let monitors = [
            Rect::new(0, 0, 1920, 1080),
            Rect::new(-1280, 0, 1280, 1024),
            Rect::new(1920, -300, 800, 600),
        ];
        let popup = PopupSize::new(430, 560);
        let margin = 8;

        for monitor in monitors {
            let inner = Rect::new(
                monitor.x + margin,
                monitor.y + margin,
                monitor.width - 2 * margin,
                monitor.height - 2 * margin,
            );
            let mut anchors = Vec::new();
            for fx in [-1, 0, 1, 2, 3, 4, 5] {
                for fy in [-1, 0, 1, 2, 3, 4, 5] {
                    let x = monitor.x + fx * monitor.width / 4;
                    let y = monitor.y + fy * monitor.height / 4;
                    anchors.push(Anchor::Pointer(Point::new(x, y)));
                    anchors.push(Anchor::Icon(Rect::new(x, y, 24, 24)));
                }
            }

            for anchor in anchors {
                let p = place(anchor, popup, monitor, margin);
                let rect = popup.at(p);
                assert!(
                    inner.contains_rect(&rect),
                    "anchor {:?} on {:?} gave {:?}",
                    anchor,
                    monitor,
                    rect
                );
            }
        }
    }

    #[test]
    fn test_popup_size_fallback() {
        let fallback = PopupSize::new(430, 560);
        assert_eq!(PopupSize::new(1, 1).or_fallback(fallback), fallback);
        assert_eq!(PopupSize::new(0, 300).or_fallback(fallback), PopupSize::new(430, 300));
        assert_eq!(PopupSize::new(500, 600).or_fallback(fallback), PopupSize::new(500, 600));
    }
}
