//! Where the tray lives
//!
//! On Linux `tray-icon` needs a GTK main loop, so the tray runs on its own
//! thread and polls the app context from a GTK timeout. Elsewhere the
//! dashboard's event loop drives [`LocalTray::tick`] every frame.

use std::path::PathBuf;

use super::manager::{TrayControl, TrayManager};
use crate::context::AppContext;
use crate::core::PopupTarget;

/// Tray options taken from settings
#[derive(Debug, Clone)]
pub struct TrayOptions {
    pub icon: Option<PathBuf>,
    pub bar_length: usize,
}

/// A tray manager bound to the app context
pub struct LocalTray {
    manager: TrayManager,
    ctx: AppContext,
}

impl LocalTray {
    pub fn new(ctx: AppContext, options: &TrayOptions) -> anyhow::Result<Self> {
        let manager = TrayManager::new(&ctx.snapshot(), options.icon.as_deref(), options.bar_length)?;
        Ok(Self { manager, ctx })
    }

    /// Pick up new snapshots and handle pending events
    pub fn tick(&mut self) -> TrayControl {
        if self.ctx.is_quitting() {
            return TrayControl::Quit;
        }
        self.manager.sync(&self.ctx);
        self.manager.handle_events(&self.ctx)
    }
}

#[cfg(target_os = "linux")]
const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

/// Start the GTK tray thread, returning once the icon exists
#[cfg(target_os = "linux")]
pub fn spawn(ctx: AppContext, options: TrayOptions) -> anyhow::Result<std::thread::JoinHandle<()>> {
    use gtk::glib;

    let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), String>>(1);

    let handle = std::thread::Builder::new()
        .name("tray".to_string())
        .spawn(move || {
            if let Err(e) = gtk::init() {
                let _ = ready_tx.send(Err(format!("Failed to initialize GTK: {}", e)));
                return;
            }
            let mut tray = match LocalTray::new(ctx, &options) {
                Ok(tray) => tray,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("Failed to create tray icon: {}", e)));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(()));

            glib::timeout_add_local(POLL_INTERVAL, move || {
                if tray.tick() == TrayControl::Quit {
                    gtk::main_quit();
                    return glib::ControlFlow::Break;
                }
                glib::ControlFlow::Continue
            });
            tracing::debug!("GTK tray loop started");
            gtk::main();
        })?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(msg)) => anyhow::bail!(msg),
        Err(_) => anyhow::bail!("Tray thread exited during startup"),
    }
}

/// Pointer position and its monitor, in physical pixels
///
/// Must be called on the GTK thread.
#[cfg(target_os = "linux")]
pub fn pointer_target() -> Option<PopupTarget> {
    use crate::core::{Anchor, Point, Rect};
    use gtk::gdk;
    use gtk::prelude::*;

    let display = gdk::Display::default()?;
    let pointer = display.default_seat()?.pointer()?;
    let (_screen, x, y) = pointer.position();
    let monitor = display.monitor_at_point(x, y)?;
    let geometry = monitor.geometry();
    let scale = monitor.scale_factor().max(1);

    Some(PopupTarget::on_monitor(
        Anchor::Pointer(Point::new(x * scale, y * scale)),
        Rect::new(
            geometry.x() * scale,
            geometry.y() * scale,
            geometry.width() * scale,
            geometry.height() * scale,
        ),
    ))
}

/// The pointer is tracked from tray events on this platform
#[cfg(not(target_os = "linux"))]
pub fn pointer_target() -> Option<PopupTarget> {
    None
}
