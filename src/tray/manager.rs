//! System tray manager
//!
//! Owns the tray icon, rebuilds its menu from each published snapshot, and
//! turns tray and menu events into app requests.

use std::path::Path;

use muda::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};

use super::host;
use super::icon::{bar_icon, load_icon_file, IconOverlay, IconState};
use super::menu::{build_menu, MenuAction, MenuEntry};
use crate::context::{AppContext, UiRequest};
use crate::core::{Anchor, Point, PopupTarget, Rect};
use crate::runner::RefreshSnapshot;

/// Whether the tray loop should keep running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayControl {
    Continue,
    Quit,
}

/// System tray manager
pub struct TrayManager {
    tray_icon: TrayIcon,
    custom_icon: Option<Icon>,
    bar_length: usize,
    shown_state: Option<IconState>,
    last_pointer: Option<Point>,
    seen_generation: u64,
}

impl TrayManager {
    /// Create the tray icon showing `snapshot`
    pub fn new(snapshot: &RefreshSnapshot, icon_path: Option<&Path>, bar_length: usize) -> anyhow::Result<Self> {
        let custom_icon = icon_path.and_then(|path| match load_icon_file(path) {
            Ok(icon) => Some(icon),
            Err(e) => {
                tracing::warn!("Failed to load icon {}: {}; using generated icon", path.display(), e);
                None
            }
        });

        let state = IconState::from_snapshot(snapshot);
        let icon = match &custom_icon {
            Some(icon) if state.overlay == IconOverlay::None => icon.clone(),
            _ => bar_icon(&state)?,
        };

        let tray_icon = TrayIconBuilder::new()
            .with_id("codexbar-tray")
            .with_menu(Box::new(native_menu(&build_menu(snapshot, bar_length))?))
            .with_menu_on_left_click(false)
            .with_tooltip(&snapshot.panel_text)
            .with_title(&snapshot.panel_text)
            .with_icon(icon)
            .build()?;

        Ok(Self {
            tray_icon,
            custom_icon,
            bar_length,
            shown_state: Some(state),
            last_pointer: None,
            seen_generation: 0,
        })
    }

    /// Show a new snapshot
    pub fn apply(&mut self, snapshot: &RefreshSnapshot) -> anyhow::Result<()> {
        let menu = native_menu(&build_menu(snapshot, self.bar_length))?;
        self.tray_icon.set_menu(Some(Box::new(menu)));

        let state = IconState::from_snapshot(snapshot);
        if self.shown_state != Some(state) {
            let icon = match &self.custom_icon {
                Some(icon) if state.overlay == IconOverlay::None => icon.clone(),
                _ => bar_icon(&state)?,
            };
            self.tray_icon.set_icon(Some(icon))?;
            self.shown_state = Some(state);
        }

        self.tray_icon.set_tooltip(Some(&snapshot.panel_text))?;
        self.tray_icon.set_title(Some(&snapshot.panel_text));
        Ok(())
    }

    /// Apply the context snapshot when a newer one was published
    pub fn sync(&mut self, ctx: &AppContext) {
        let generation = ctx.generation();
        if generation == self.seen_generation {
            return;
        }
        self.seen_generation = generation;
        if let Err(e) = self.apply(&ctx.snapshot()) {
            tracing::warn!("Failed to update tray: {}", e);
        }
    }

    /// Drain pending tray and menu events
    pub fn handle_events(&mut self, ctx: &AppContext) -> TrayControl {
        while let Ok(event) = TrayIconEvent::receiver().try_recv() {
            self.on_tray_event(event, ctx);
        }

        while let Ok(event) = MenuEvent::receiver().try_recv() {
            let Some(action) = MenuAction::from_id(event.id.0.as_str()) else {
                continue;
            };
            tracing::debug!("Menu action {:?}", action);
            if self.on_action(action, ctx) == TrayControl::Quit {
                return TrayControl::Quit;
            }
        }
        TrayControl::Continue
    }

    /// Icon clicks and pointer moves. The Linux backend reports none, so there
    /// the dashboard is only opened from the menu.
    fn on_tray_event(&mut self, event: TrayIconEvent, ctx: &AppContext) {
        match event {
            TrayIconEvent::Click {
                position,
                rect,
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } => {
                self.last_pointer = Some(physical_point(position.x, position.y));
                let icon = icon_rect(rect.position.x, rect.position.y, rect.size.width, rect.size.height);
                ctx.send_ui(UiRequest::ToggleDashboard(Some(PopupTarget::new(Anchor::Icon(icon)))));
            }
            TrayIconEvent::Click { position, .. }
            | TrayIconEvent::Enter { position, .. }
            | TrayIconEvent::Move { position, .. } => {
                self.last_pointer = Some(physical_point(position.x, position.y));
            }
            _ => {}
        }
    }

    fn on_action(&mut self, action: MenuAction, ctx: &AppContext) -> TrayControl {
        match action {
            MenuAction::OpenDashboard => {
                let target = open_target(host::pointer_target(), self.last_pointer);
                ctx.send_ui(UiRequest::OpenDashboard(target));
            }
            MenuAction::Refresh => ctx.request_refresh(),
            MenuAction::Quit => {
                ctx.send_ui(UiRequest::Quit);
                ctx.quit();
                return TrayControl::Quit;
            }
        }
        TrayControl::Continue
    }
}

/// Build the native menu for a list of entries
fn native_menu(entries: &[MenuEntry]) -> anyhow::Result<Menu> {
    let menu = Menu::new();
    for entry in entries {
        match entry {
            MenuEntry::Info(text) => menu.append(&MenuItem::new(text, false, None))?,
            MenuEntry::Separator => menu.append(&PredefinedMenuItem::separator())?,
            MenuEntry::Action(action) => {
                menu.append(&MenuItem::with_id(action.id(), action.label(), true, None))?
            }
        }
    }
    Ok(menu)
}

/// Where Open Dashboard anchors: the live pointer when the platform can query
/// it, else the last pointer seen in tray events
fn open_target(live: Option<PopupTarget>, last_pointer: Option<Point>) -> Option<PopupTarget> {
    live.or_else(|| last_pointer.map(|p| PopupTarget::new(Anchor::Pointer(p))))
}

fn physical_point(x: f64, y: f64) -> Point {
    Point::new(x.round() as i32, y.round() as i32)
}

/// Icon bounds reported by the tray, in physical pixels
fn icon_rect(x: f64, y: f64, width: u32, height: u32) -> Rect {
    let origin = physical_point(x, y);
    Rect::new(origin.x, origin.y, width as i32, height as i32)
}
