//! Usage window rendering
//!
//! Turns a `{usedPercent, resetDescription}` record into the text bar shown in
//! the tray menu and the "percent left" values shown in the dashboard.

use serde::Deserialize;

use super::payload::lenient;

/// Glyph for a filled bar cell
pub const FILLED_GLYPH: char = '█';

/// Glyph for an empty bar cell
pub const EMPTY_GLYPH: char = '·';

/// Default bar length used by the tray menu
pub const DEFAULT_BAR_LENGTH: usize = 10;

/// A usage-quota snapshot for one rate window (session, weekly, ...)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageWindow {
    /// Percent of the quota already used. Absent when the tool did not report
    /// a number.
    #[serde(default, deserialize_with = "lenient")]
    pub used_percent: Option<f64>,

    /// Human-readable reset hint, e.g. "in 2h"
    #[serde(default, deserialize_with = "lenient")]
    pub reset_description: Option<String>,
}

impl UsageWindow {
    #[cfg(test)]
    pub fn new(used_percent: Option<f64>, reset_description: Option<&str>) -> Self {
        Self {
            used_percent,
            reset_description: reset_description.map(str::to_string),
        }
    }

    /// Used percent, ignoring non-finite values
    fn used(&self) -> Option<f64> {
        self.used_percent.filter(|p| p.is_finite())
    }

    /// Remaining percent clamped to 0..=100, `None` when unknown
    pub fn remaining_percent(&self) -> Option<f64> {
        self.used().map(|used| (100.0 - used).clamp(0.0, 100.0))
    }

    /// Remaining quota as a 0..=1 fraction for graphical bars
    pub fn remaining_fraction(&self) -> Option<f32> {
        self.remaining_percent().map(|r| (r / 100.0) as f32)
    }

    /// "63% left" style label
    pub fn percent_left_label(&self) -> Option<String> {
        self.remaining_percent()
            .map(|r| format!("{}% left", r.round_ties_even() as i64))
    }

    /// Reset description when present and non-empty
    pub fn reset_hint(&self) -> Option<&str> {
        self.reset_description.as_deref().filter(|s| !s.is_empty())
    }
}

/// Number of filled cells for a bar of `bar_length` cells
///
/// Both the remaining percent and the cell count round half to even.
/// Returns `None` when the window has no usable percentage.
pub fn filled_cells(window: &UsageWindow, bar_length: usize) -> Option<usize> {
    let remaining = window.remaining_percent()?.round_ties_even();
    let len = bar_length as f64;
    Some((remaining / 100.0 * len).clamp(0.0, len).round_ties_even() as usize)
}

/// Render a text bar of `filled` filled cells out of `bar_length`
pub fn render_bar(filled: usize, bar_length: usize) -> String {
    let filled = filled.min(bar_length);
    let mut bar = String::with_capacity(bar_length * 3);
    bar.extend(std::iter::repeat(FILLED_GLYPH).take(filled));
    bar.extend(std::iter::repeat(EMPTY_GLYPH).take(bar_length - filled));
    bar
}

/// Render a usage window as a single menu line
///
/// `"{title}: --"` when the percentage is unknown, otherwise
/// `"{title} {remaining}%  {bar}"` with an optional `" resets {desc}"` suffix.
pub fn render(window: &UsageWindow, title: &str, bar_length: usize) -> String {
    let (Some(remaining), Some(filled)) =
        (window.remaining_percent(), filled_cells(window, bar_length))
    else {
        return format!("{}: --", title);
    };

    let mut line = format!(
        "{:<8} {:>3}%  {}",
        title,
        remaining.round_ties_even() as i64,
        render_bar(filled, bar_length)
    );
    if let Some(reset) = window.reset_hint() {
        line.push_str(" resets ");
        line.push_str(reset);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(s: &str, glyph: char) -> usize {
        s.chars().filter(|c| *c == glyph).count()
    }

    #[test]
    fn test_render_absent_percent() {
        let window = UsageWindow::default();
        assert_eq!(render(&window, "Session", 10), "Session: --");

        // The reset hint alone is not enough to render a bar
        let window = UsageWindow::new(None, Some("in 2h"));
        assert_eq!(render(&window, "Weekly", 10), "Weekly: --");
    }

    #[test]
    fn test_render_non_finite_percent() {
        let window = UsageWindow::new(Some(f64::NAN), None);
        assert_eq!(render(&window, "Session", 10), "Session: --");
        assert_eq!(window.remaining_percent(), None);
    }

    #[test]
    fn test_render_with_reset() {
        let window = UsageWindow::new(Some(37.0), Some("in 2h"));
        let line = render(&window, "Session", 10);

        assert_eq!(count(&line, FILLED_GLYPH), 6);
        assert_eq!(count(&line, EMPTY_GLYPH), 4);
        assert!(line.ends_with(" resets in 2h"));
        assert!(line.contains(" 63%"));
        assert_eq!(line, "Session   63%  ██████···· resets in 2h");
    }

    #[test]
    fn test_render_empty_reset_is_ignored() {
        let window = UsageWindow::new(Some(50.0), Some(""));
        let line = render(&window, "Weekly", 10);
        assert!(!line.contains("resets"));
        assert_eq!(line, "Weekly    50%  █████·····");
    }

    #[test]
    fn test_remaining_is_clamped() {
        assert_eq!(UsageWindow::new(Some(150.0), None).remaining_percent(), Some(0.0));
        assert_eq!(UsageWindow::new(Some(-20.0), None).remaining_percent(), Some(100.0));

        let over = render(&UsageWindow::new(Some(150.0), None), "Session", 10);
        assert_eq!(count(&over, FILLED_GLYPH), 0);
        assert_eq!(count(&over, EMPTY_GLYPH), 10);

        let under = render(&UsageWindow::new(Some(-20.0), None), "Session", 10);
        assert_eq!(count(&under, FILLED_GLYPH), 10);
    }

    #[test]
    fn test_filled_matches_direct_rounding() {
        for bar_length in [5usize, 10, 20] {
            for used in 0..=100 {
                let window = UsageWindow::new(Some(used as f64), None);
                let expected = ((100.0 - used as f64) / 100.0 * bar_length as f64)
                    .round_ties_even() as usize;
                assert_eq!(
                    filled_cells(&window, bar_length),
                    Some(expected),
                    "used={} len={}",
                    used,
                    bar_length
                );
            }
        }
    }

    #[test]
    fn test_half_cells_round_to_even() {
        // 65% of 10 cells is 6.5
        let line = render(&UsageWindow::new(Some(35.0), None), "Session", 10);
        assert_eq!(line, "Session   65%  ██████····");

        let line = render(&UsageWindow::new(Some(35.4), None), "Session", 10);
        assert_eq!(line, "Session   65%  ██████····");

        // 75% of 10 cells is 7.5
        assert_eq!(filled_cells(&UsageWindow::new(Some(25.0), None), 10), Some(8));
        assert_eq!(filled_cells(&UsageWindow::new(Some(45.0), None), 10), Some(6));
    }

    #[test]
    fn test_half_percent_rounds_to_even() {
        let window = UsageWindow::new(Some(37.5), None);
        assert_eq!(window.percent_left_label().as_deref(), Some("62% left"));
        assert!(render(&window, "Weekly", 10).starts_with("Weekly    62%"));

        let window = UsageWindow::new(Some(36.5), None);
        assert_eq!(window.percent_left_label().as_deref(), Some("64% left"));
    }

    #[test]
    fn test_filled_is_monotonic() {
        let mut previous = usize::MAX;
        for tenth in 0..=1000 {
            let used = tenth as f64 / 10.0;
            let filled = filled_cells(&UsageWindow::new(Some(used), None), 10).unwrap();
            assert!(filled <= previous, "used={} filled={}", used, filled);
            previous = filled;
        }
    }

    #[test]
    fn test_zero_length_bar() {
        let line = render(&UsageWindow::new(Some(10.0), None), "Session", 0);
        assert_eq!(count(&line, FILLED_GLYPH), 0);
        assert_eq!(count(&line, EMPTY_GLYPH), 0);
    }

    #[test]
    fn test_percent_left_label_and_fraction() {
        let window = UsageWindow::new(Some(37.4), None);
        assert_eq!(window.percent_left_label().as_deref(), Some("63% left"));
        let fraction = window.remaining_fraction().unwrap();
        assert!((fraction - 0.626).abs() < 1e-4);
        assert_eq!(UsageWindow::default().percent_left_label(), None);
    }
}
