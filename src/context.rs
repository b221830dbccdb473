//! Application context shared by the tray, the dashboard, and the refresh worker
//!
//! Replaces process-wide UI globals with one explicit object that is cloned
//! into each thread.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crossbeam_channel::{Receiver, Sender};

use crate::core::PopupTarget;
use crate::runner::RefreshSnapshot;

/// Requests sent to the dashboard (UI thread)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiRequest {
    /// Show the dashboard, hiding it instead when already visible
    ToggleDashboard(Option<PopupTarget>),
    /// Show the dashboard
    OpenDashboard(Option<PopupTarget>),
    Quit,
}

/// Signals for the refresh worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshSignal {
    RefreshNow,
    Shutdown,
}

type RepaintHook = Box<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct AppContext {
    snapshot: Arc<RwLock<RefreshSnapshot>>,
    /// Bumped on every publish; consumers rebuild when it changes
    generation: Arc<AtomicU64>,
    refreshing: Arc<AtomicBool>,
    quitting: Arc<AtomicBool>,
    refresh_tx: Sender<RefreshSignal>,
    ui_tx: Sender<UiRequest>,
    repaint: Arc<Mutex<Option<RepaintHook>>>,
}

/// Receiving ends handed to the worker and the dashboard
pub struct ContextReceivers {
    pub refresh: Receiver<RefreshSignal>,
    pub ui: Receiver<UiRequest>,
}

impl AppContext {
    pub fn new() -> (Self, ContextReceivers) {
        let (refresh_tx, refresh_rx) = crossbeam_channel::unbounded();
        let (ui_tx, ui_rx) = crossbeam_channel::unbounded();
        let ctx = Self {
            snapshot: Arc::new(RwLock::new(RefreshSnapshot::placeholder())),
            generation: Arc::new(AtomicU64::new(0)),
            refreshing: Arc::new(AtomicBool::new(false)),
            quitting: Arc::new(AtomicBool::new(false)),
            refresh_tx,
            ui_tx,
            repaint: Arc::new(Mutex::new(None)),
        };
        let receivers = ContextReceivers {
            refresh: refresh_rx,
            ui: ui_rx,
        };
        (ctx, receivers)
    }

    /// Current snapshot
    pub fn snapshot(&self) -> RefreshSnapshot {
        match self.snapshot.read() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Replace the snapshot and wake the UI
    pub fn publish(&self, snapshot: RefreshSnapshot) {
        match self.snapshot.write() {
            Ok(mut s) => *s = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Published snapshot generation {}", generation);
        self.request_repaint();
    }

    pub fn set_refreshing(&self, refreshing: bool) {
        self.refreshing.store(refreshing, Ordering::SeqCst);
        self.request_repaint();
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    /// Ask the worker to refresh immediately
    pub fn request_refresh(&self) {
        if self.refresh_tx.send(RefreshSignal::RefreshNow).is_err() {
            tracing::warn!("Refresh worker is not running");
        }
    }

    /// Ask the worker to stop after its current cycle
    pub fn shutdown(&self) {
        let _ = self.refresh_tx.send(RefreshSignal::Shutdown);
    }

    /// Mark the app as exiting and stop the worker
    pub fn quit(&self) {
        if !self.quitting.swap(true, Ordering::SeqCst) {
            tracing::info!("Quitting");
        }
        self.shutdown();
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting.load(Ordering::SeqCst)
    }

    /// Forward a request to the dashboard
    pub fn send_ui(&self, request: UiRequest) {
        if self.ui_tx.send(request).is_err() {
            tracing::warn!("Dashboard is gone, dropping {:?}", request);
            return;
        }
        self.request_repaint();
    }

    /// Register the callback that wakes the UI event loop
    pub fn set_repaint_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut slot) = self.repaint.lock() {
            *slot = Some(Box::new(hook));
        }
    }

    fn request_repaint(&self) {
        if let Ok(slot) = self.repaint.lock() {
            if let Some(hook) = slot.as_ref() {
                hook();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CommandResult;
    use chrono::Local;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_publish_bumps_generation() {
        let (ctx, _rx) = AppContext::new();
        assert_eq!(ctx.generation(), 0);
        assert_eq!(ctx.snapshot().panel_text, "CodexBar");

        let panel = CommandResult {
            ok: true,
            stdout: "Codex 12%".to_string(),
            stderr: String::new(),
        };
        let snapshot = RefreshSnapshot::from_results(&panel, &CommandResult::default(), Local::now());
        ctx.publish(snapshot);

        assert_eq!(ctx.generation(), 1);
        assert_eq!(ctx.snapshot().panel_text, "Codex 12%");
    }

    #[test]
    fn test_repaint_hook_runs_on_publish_and_ui_request() {
        let (ctx, rx) = AppContext::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        ctx.set_repaint_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        ctx.publish(RefreshSnapshot::placeholder());
        ctx.send_ui(UiRequest::Quit);

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(rx.ui.try_recv(), Ok(UiRequest::Quit));
    }

    #[test]
    fn test_quit_stops_worker() {
        let (ctx, rx) = AppContext::new();
        assert!(!ctx.is_quitting());
        ctx.quit();
        ctx.quit();
        assert!(ctx.clone().is_quitting());
        assert_eq!(rx.refresh.try_recv(), Ok(RefreshSignal::Shutdown));
    }

    #[test]
    fn test_refresh_signals() {
        let (ctx, rx) = AppContext::new();
        ctx.request_refresh();
        ctx.shutdown();
        assert_eq!(rx.refresh.try_recv(), Ok(RefreshSignal::RefreshNow));
        assert_eq!(rx.refresh.try_recv(), Ok(RefreshSignal::Shutdown));
    }
}
