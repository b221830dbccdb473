//! Dashboard popup
//!
//! A borderless always-on-top window that stays hidden until the tray asks
//! for it, then opens next to the pointer or the tray icon.

use std::time::Duration;

use crossbeam_channel::Receiver;
use egui::{Color32, RichText, Rounding, Stroke, Vec2};

use super::theme::{FontSize, Radius, Spacing, Theme};
use crate::context::{AppContext, UiRequest};
use crate::core::{filter_payloads, place, Anchor, Point, PopupSize, PopupTarget, ProviderPayload, Rect, UsageWindow};
use crate::runner::RefreshSnapshot;
use crate::tray::{LocalTray, TrayControl};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// What the window should do in response to a request
#[derive(Debug, Clone, Copy, PartialEq)]
enum PopupAction {
    Show(Option<PopupTarget>),
    Hide,
    Quit,
}

/// Visibility bookkeeping, kept apart from egui so it can be tested
#[derive(Debug, Default)]
struct PopupState {
    visible: bool,
    /// The window received focus since it was last shown
    had_focus: bool,
}

impl PopupState {
    fn on_request(&self, request: UiRequest) -> PopupAction {
        match request {
            UiRequest::ToggleDashboard(_) if self.visible => PopupAction::Hide,
            UiRequest::ToggleDashboard(target) | UiRequest::OpenDashboard(target) => PopupAction::Show(target),
            UiRequest::Quit => PopupAction::Quit,
        }
    }

    fn shown(&mut self) {
        self.visible = true;
        self.had_focus = false;
    }

    fn hidden(&mut self) {
        self.visible = false;
        self.had_focus = false;
    }

    /// Whether a focus report means the popup lost focus and should hide
    fn lost_focus(&mut self, focused: Option<bool>) -> bool {
        match focused {
            Some(true) => {
                self.had_focus = true;
                false
            }
            Some(false) => self.visible && self.had_focus,
            None => false,
        }
    }
}

/// Anchor used when the platform reported no pointer or icon position
fn fallback_anchor(monitor: Rect) -> Anchor {
    Anchor::Pointer(Point::new(monitor.right(), monitor.bottom()))
}

/// Top-left corner for the popup, `None` when no monitor geometry is known
fn resolve_position(
    target: Option<PopupTarget>,
    fallback_monitor: Option<Rect>,
    popup: PopupSize,
    margin: i32,
) -> Option<Point> {
    let monitor = target.and_then(|t| t.monitor).or(fallback_monitor)?;
    let anchor = target.map(|t| t.anchor).unwrap_or_else(|| fallback_anchor(monitor));
    Some(place(anchor, popup, monitor, margin))
}

/// "Updated HH:MM:SS  •  panel text"
fn subtitle(snapshot: &RefreshSnapshot) -> String {
    format!("Updated {}  •  {}", snapshot.updated_label(), snapshot.panel_text)
}

/// Popup size and margin in logical points
#[derive(Debug, Clone, Copy)]
pub struct DashboardOptions {
    pub size: PopupSize,
    pub margin: i32,
    pub show_on_start: bool,
}

pub struct DashboardApp {
    ctx: AppContext,
    requests: Receiver<UiRequest>,
    snapshot: RefreshSnapshot,
    seen_generation: u64,
    query: String,
    popup: PopupState,
    options: DashboardOptions,
    /// Tray driven from this event loop where it has no thread of its own
    tray: Option<LocalTray>,
    show_pending: bool,
}

impl DashboardApp {
    pub fn new(ctx: AppContext, requests: Receiver<UiRequest>, options: DashboardOptions, tray: Option<LocalTray>) -> Self {
        Self {
            snapshot: ctx.snapshot(),
            seen_generation: ctx.generation(),
            ctx,
            requests,
            query: String::new(),
            popup: PopupState::default(),
            show_pending: options.show_on_start,
            options,
            tray,
        }
    }

    fn show(&mut self, ctx: &egui::Context, target: Option<PopupTarget>) {
        let ppp = ctx.pixels_per_point();
        let (outer, monitor_size) = ctx.input(|i| (i.viewport().outer_rect, i.viewport().monitor_size));

        let fallback_size = PopupSize::new(
            (self.options.size.width as f32 * ppp).round() as i32,
            (self.options.size.height as f32 * ppp).round() as i32,
        );
        let current = outer
            .map(|r| PopupSize::new((r.width() * ppp).round() as i32, (r.height() * ppp).round() as i32))
            .unwrap_or(PopupSize::new(0, 0));
        let popup = current.or_fallback(fallback_size);

        // Without platform geometry, assume the primary monitor at the origin
        let fallback_monitor =
            monitor_size.map(|s| Rect::new(0, 0, (s.x * ppp).round() as i32, (s.y * ppp).round() as i32));
        let margin = (self.options.margin as f32 * ppp).round() as i32;

        match resolve_position(target, fallback_monitor, popup, margin) {
            Some(pos) => {
                tracing::debug!("Showing dashboard at {:?} for {:?}", pos, target);
                ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(egui::pos2(
                    pos.x as f32 / ppp,
                    pos.y as f32 / ppp,
                )));
            }
            None => tracing::debug!("No monitor geometry, showing dashboard in place"),
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
        ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
        self.popup.shown();
    }

    fn hide(&mut self, ctx: &egui::Context) {
        ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false));
        self.popup.hidden();
    }

    fn quit(&mut self, ctx: &egui::Context) {
        self.ctx.quit();
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn handle_requests(&mut self, ctx: &egui::Context) {
        while let Ok(request) = self.requests.try_recv() {
            match self.popup.on_request(request) {
                PopupAction::Show(target) => self.show(ctx, target),
                PopupAction::Hide => self.hide(ctx),
                PopupAction::Quit => self.quit(ctx),
            }
        }
    }

    fn draw(&mut self, ctx: &egui::Context) {
        let mut refresh_clicked = false;
        let mut quit_clicked = false;

        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(Theme::BG_PRIMARY)
                    .inner_margin(egui::Margin::symmetric(Spacing::XL, Spacing::LG)),
            )
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("CodexBar")
                            .size(FontSize::TITLE)
                            .strong()
                            .color(Theme::TEXT_PRIMARY),
                    );
                    if self.ctx.is_refreshing() {
                        ui.add(egui::Spinner::new().size(FontSize::MD));
                    }
                });
                ui.label(
                    RichText::new(subtitle(&self.snapshot))
                        .size(FontSize::SM)
                        .color(Theme::TEXT_SUBTLE),
                );
                ui.add_space(Spacing::SM);
                egui::Frame::none()
                    .fill(Theme::INPUT_BG)
                    .stroke(Stroke::new(1.0, Theme::INPUT_BORDER))
                    .rounding(Rounding::same(Radius::MD))
                    .inner_margin(egui::Margin::symmetric(Spacing::SM, 6.0))
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut self.query)
                                .hint_text("Filter providers / account")
                                .frame(false)
                                .text_color(Theme::TEXT_PRIMARY)
                                .desired_width(f32::INFINITY),
                        );
                    });
                ui.add_space(Spacing::MD);
                let rule = ui.available_rect_before_wrap();
                ui.painter().hline(rule.x_range(), rule.top(), Stroke::new(1.0, Theme::BORDER));
            });

        egui::TopBottomPanel::bottom("footer")
            .frame(
                egui::Frame::none()
                    .fill(Theme::BG_PRIMARY)
                    .inner_margin(egui::Margin {
                        left: Spacing::LG,
                        right: Spacing::LG,
                        top: 6.0,
                        bottom: Spacing::LG,
                    }),
            )
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.columns(2, |cols| {
                    let size = Vec2::new(cols[0].available_width(), 28.0);
                    let refresh = egui::Button::new(RichText::new("Refresh").color(Color32::WHITE)).fill(Theme::ACCENT);
                    refresh_clicked = cols[0].add_sized(size, refresh).clicked();
                    quit_clicked = cols[1].add_sized(size, egui::Button::new("Quit")).clicked();
                });
            });

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(Theme::BG_PRIMARY)
                    .inner_margin(egui::Margin::symmetric(Spacing::LG, Spacing::SM)),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                    let payloads = filter_payloads(&self.snapshot.payloads, &self.query);
                    if payloads.is_empty() {
                        ui.label(RichText::new("No matching providers.").color(Theme::TEXT_PRIMARY));
                        if self.snapshot.payloads.is_empty() {
                            if let Some(message) = &self.snapshot.usage_message {
                                ui.label(RichText::new(message).size(FontSize::SM).color(Theme::TEXT_SUBTLE));
                            }
                        }
                        return;
                    }
                    for payload in payloads {
                        draw_provider_card(ui, payload);
                        ui.add_space(Spacing::MD);
                    }
                });
            });

        if refresh_clicked {
            self.ctx.request_refresh();
        }
        if quit_clicked {
            self.quit(ctx);
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(tray) = self.tray.as_mut() {
            if tray.tick() == TrayControl::Quit {
                self.quit(ctx);
            }
        }

        if std::mem::take(&mut self.show_pending) {
            self.show(ctx, None);
        }
        self.handle_requests(ctx);

        let generation = self.ctx.generation();
        if generation != self.seen_generation {
            self.seen_generation = generation;
            self.snapshot = self.ctx.snapshot();
        }

        if self.popup.visible {
            let (escape, focused) = ctx.input(|i| (i.key_pressed(egui::Key::Escape), i.viewport().focused));
            if escape || self.popup.lost_focus(focused) {
                self.hide(ctx);
            }
        }

        self.draw(ctx);
        ctx.request_repaint_after(POLL_INTERVAL);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        Theme::BG_PRIMARY.to_normalized_gamma_f32()
    }
}

fn draw_provider_card(ui: &mut egui::Ui, payload: &ProviderPayload) {
    egui::Frame::none()
        .fill(Theme::CARD_BG)
        .stroke(Stroke::new(1.0, Theme::BORDER))
        .rounding(Rounding::same(Radius::LG))
        .inner_margin(egui::Margin::symmetric(Spacing::MD, Spacing::SM))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.spacing_mut().item_spacing.y = Spacing::SM;

            ui.label(RichText::new(payload.title()).strong().color(Theme::TEXT_PRIMARY));

            if let Some(message) = payload.error_message() {
                ui.label(RichText::new(format!("Error: {}", message)).color(Theme::TEXT_ERROR));
                return;
            }

            draw_window_row(ui, "Session", &payload.session());
            draw_window_row(ui, "Weekly", &payload.weekly());

            if let Some(credits) = payload.credits_remaining() {
                ui.label(RichText::new(format!("Credits: {:.1}", credits)).color(Theme::TEXT_PRIMARY));
            }
            if let Some(email) = payload.account_email() {
                ui.label(RichText::new(format!("Account: {}", email)).color(Theme::TEXT_PRIMARY));
            }
        });
}

fn draw_window_row(ui: &mut egui::Ui, title: &str, window: &UsageWindow) {
    let (Some(label), Some(fraction)) = (window.percent_left_label(), window.remaining_fraction()) else {
        ui.label(RichText::new(format!("{}: --", title)).color(Theme::TEXT_PRIMARY));
        return;
    };

    ui.vertical(|ui| {
        ui.spacing_mut().item_spacing.y = Spacing::XS;
        ui.horizontal(|ui| {
            ui.label(RichText::new(title).color(Theme::TEXT_PRIMARY));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(label).color(Theme::TEXT_PRIMARY));
            });
        });
        draw_progress(ui, fraction);
        if let Some(reset) = window.reset_hint() {
            ui.label(
                RichText::new(format!("Resets {}", reset))
                    .size(FontSize::SM)
                    .color(Theme::TEXT_SUBTLE),
            );
        }
    });
}

fn draw_progress(ui: &mut egui::Ui, fraction: f32) {
    let height = 8.0;
    let (rect, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), height), egui::Sense::hover());
    ui.painter()
        .rect_filled(rect, Rounding::same(Radius::PILL), Theme::PROGRESS_TRACK);

    let fill_width = rect.width() * fraction.clamp(0.0, 1.0);
    if fill_width > 0.0 {
        let fill = egui::Rect::from_min_size(rect.min, Vec2::new(fill_width, height));
        ui.painter()
            .rect_filled(fill, Rounding::same(Radius::PILL), Theme::progress_color(fraction));
    }
}

/// Hidden, borderless popup viewport
fn native_options(size: PopupSize) -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("CodexBar")
            .with_app_id("codexbar-tray")
            .with_inner_size([size.width as f32, size.height as f32])
            .with_resizable(false)
            .with_decorations(false)
            .with_always_on_top()
            .with_taskbar(false)
            .with_visible(false),
        event_loop_builder: event_loop_hook(),
        ..Default::default()
    }
}

/// Wayland ignores client hide and move requests, so the popup runs under
/// X11 (XWayland on Wayland sessions).
#[cfg(target_os = "linux")]
fn event_loop_hook() -> Option<eframe::EventLoopBuilderHook> {
    use winit::platform::x11::EventLoopBuilderExtX11;

    Some(Box::new(
        |builder: &mut eframe::EventLoopBuilder<eframe::UserEvent>| {
            builder.with_x11();
        },
    ))
}

#[cfg(not(target_os = "linux"))]
fn event_loop_hook() -> Option<eframe::EventLoopBuilderHook> {
    None
}

/// Run the dashboard event loop until the app quits
pub fn run(
    ctx: AppContext,
    requests: Receiver<UiRequest>,
    options: DashboardOptions,
    local_tray: Option<crate::tray::TrayOptions>,
) -> anyhow::Result<()> {
    eframe::run_native(
        "CodexBar",
        native_options(options.size),
        Box::new(move |cc| {
            let egui_ctx = cc.egui_ctx.clone();
            ctx.set_repaint_hook(move || egui_ctx.request_repaint());
            cc.egui_ctx.set_visuals(egui::Visuals::dark());

            let tray = match local_tray {
                Some(tray_options) => Some(LocalTray::new(ctx.clone(), &tray_options)?),
                None => None,
            };
            Ok(Box::new(DashboardApp::new(ctx, requests, options, tray)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {}", e))?;

    Ok(())
}
