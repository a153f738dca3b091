//! InkStrip - sequential image strip viewer
//!
//! eframe-based UI: discovers a numbered page sequence, renders it as one
//! scrollable strip, and keeps the current page in sync with the scroll
//! position.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui;
use inkstrip_core::{LoadEvent, PageLoader, PageNaming, ViewerConfig};
use inkstrip_scheduler::{DebounceTimer, DelayTimer};
use viewer_core::{StripGeometry, ViewerState};

/// Horizontal swipe displacement that counts as a page gesture.
const SWIPE_MIN_DISTANCE: f32 = 50.0;

/// Texture uploads processed per frame to keep the UI responsive.
const UPLOADS_PER_FRAME: usize = 4;

/// Breathing room around the strip.
const PADDING: f32 = 20.0;

/// Display aspect (width / height) assumed for pages that have not
/// decoded, so the strip keeps stable slots.
const PLACEHOLDER_ASPECT: f32 = 0.7;

fn main() -> eframe::Result {
    env_logger::init();

    let start_dir = std::env::args().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 1000.0])
            .with_min_inner_size([480.0, 600.0])
            .with_title("InkStrip"),
        ..Default::default()
    };

    eframe::run_native(
        "InkStrip",
        options,
        Box::new(move |_cc| {
            let mut app = ViewerApp::new();
            if let Some(dir) = start_dir {
                app.start_session(dir);
            } else if let Some(dir) = app.config.library_dir.clone() {
                app.start_session(dir);
            }
            Ok(Box::new(app))
        }),
    )
}

/// One rendered strip entry, tagged with its 1-based page number.
struct PageSlot {
    number: u32,
    texture: Option<egui::TextureHandle>,
    /// width / height of the decoded image
    aspect: Option<f32>,
}

impl PageSlot {
    fn aspect(&self) -> f32 {
        self.aspect.unwrap_or(PLACEHOLDER_ASPECT)
    }
}

/// Reader-facing navigation commands. Every input surface funnels into
/// this set; none has privileged state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    PrevPage,
    NextPage,
    ZoomIn,
    ZoomOut,
    FitWidth,
    DismissDialog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwipeDir {
    Next,
    Prev,
}

/// Horizontal swipe classification: the horizontal displacement must
/// dominate the vertical one and exceed the minimum distance.
/// Right-to-left means next page.
fn swipe_action(delta: egui::Vec2) -> Option<SwipeDir> {
    if delta.x.abs() > delta.y.abs() && delta.x.abs() >= SWIPE_MIN_DISTANCE {
        if delta.x < 0.0 {
            Some(SwipeDir::Next)
        } else {
            Some(SwipeDir::Prev)
        }
    } else {
        None
    }
}

#[derive(Default)]
struct SwipeTracker {
    start: Option<egui::Pos2>,
}

impl SwipeTracker {
    /// Feed pointer events; returns a gesture when one completes.
    fn observe(&mut self, events: &[egui::Event]) -> Option<SwipeDir> {
        let mut gesture = None;

        for event in events {
            if let egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                ..
            } = event
            {
                if *pressed {
                    self.start = Some(*pos);
                } else if let Some(start) = self.start.take() {
                    gesture = swipe_action(*pos - start).or(gesture);
                }
            }
        }

        gesture
    }
}

/// Error dialog state
struct ErrorDialogState {
    title: String,
    message: String,
}

/// A fully rendered reading session.
struct ReaderSession {
    state: ViewerState,
    slots: Vec<PageSlot>,
    scroll_settle: DebounceTimer,
    dialog_delay: DelayTimer,
    last_scroll_offset: f32,
    last_viewport_height: f32,
    scroll_to_current: bool,
    dialog_open: bool,
    spacing_px: f32,
    completion_tolerance_px: f32,
    completion_delay_ms: u64,
}

enum Session {
    /// No library chosen yet.
    Idle,
    /// Discovery/decoding in progress; input is not wired yet.
    Loading { dir: PathBuf, loader: PageLoader, slots: Vec<PageSlot>, decoded: usize },
    /// Discovery found nothing.
    Empty { dir: PathBuf },
    Ready(ReaderSession),
}

struct ViewerApp {
    config: ViewerConfig,
    session: Session,
    error_dialog: Option<ErrorDialogState>,
    swipe: SwipeTracker,
    epoch: Instant,
}

impl ViewerApp {
    fn new() -> Self {
        Self {
            config: ViewerConfig::load(),
            session: Session::Idle,
            error_dialog: None,
            swipe: SwipeTracker::default(),
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Open a page library using the folder picker
    fn open_library(&mut self) {
        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
            self.start_session(dir);
        }
    }

    /// Begin a fresh session: discovery, then render, then input.
    fn start_session(&mut self, dir: PathBuf) {
        log::info!("opening page library {}", dir.display());
        self.config.library_dir = Some(dir.clone());

        let naming = PageNaming::new(&dir, &self.config.extension, self.config.pad_width);
        self.session = Session::Loading {
            dir,
            loader: PageLoader::spawn(naming, self.config.miss_limit),
            slots: Vec::new(),
            decoded: 0,
        };
    }

    fn ready_session(&mut self) -> Option<&mut ReaderSession> {
        match &mut self.session {
            Session::Ready(session) => Some(session),
            _ => None,
        }
    }

    /// Drain loader events, bounded per frame.
    fn poll_loader(&mut self, ctx: &egui::Context) {
        let mut next_session = None;

        if let Session::Loading { dir, loader, slots, decoded } = &mut self.session {
            for _ in 0..UPLOADS_PER_FRAME {
                match loader.try_next() {
                    Some(LoadEvent::Discovered { pages }) => {
                        if pages.is_empty() {
                            next_session = Some(Session::Empty { dir: dir.clone() });
                            break;
                        }
                        *slots = pages
                            .iter()
                            .enumerate()
                            .map(|(position, _)| PageSlot {
                                number: position as u32 + 1,
                                texture: None,
                                aspect: None,
                            })
                            .collect();
                    }
                    Some(LoadEvent::PageDecoded { page, width, height, rgba }) => {
                        let image = egui::ColorImage::from_rgba_unmultiplied(
                            [width as usize, height as usize],
                            &rgba,
                        );
                        let handle = ctx.load_texture(
                            format!("page_{}", page),
                            image,
                            egui::TextureOptions::LINEAR,
                        );
                        if let Some(slot) = slots.get_mut(page as usize - 1) {
                            slot.texture = Some(handle);
                            slot.aspect = Some(width as f32 / height as f32);
                        }
                        *decoded += 1;
                    }
                    Some(LoadEvent::PageFailed { page, path }) => {
                        log::warn!("page {} unreadable: {}", page, path.display());
                        *decoded += 1;
                    }
                    Some(LoadEvent::Finished) => {
                        let slots = std::mem::take(slots);
                        next_session = Some(Session::Ready(ReaderSession {
                            state: ViewerState::new(slots.len() as u32),
                            slots,
                            scroll_settle: DebounceTimer::new(self.config.debounce_ms),
                            dialog_delay: DelayTimer::new(),
                            last_scroll_offset: 0.0,
                            last_viewport_height: 0.0,
                            scroll_to_current: false,
                            dialog_open: false,
                            spacing_px: self.config.page_spacing_px,
                            completion_tolerance_px: self.config.completion_tolerance_px,
                            completion_delay_ms: self.config.completion_delay_ms,
                        }));
                        break;
                    }
                    Some(LoadEvent::Failed(e)) => {
                        next_session = Some(Session::Idle);
                        self.error_dialog = Some(ErrorDialogState {
                            title: "Could not open library".to_string(),
                            message: e.to_string(),
                        });
                        break;
                    }
                    None => break,
                }
            }

            // Keep draining even when the reader is idle.
            ctx.request_repaint_after(Duration::from_millis(16));
        }

        if let Some(session) = next_session {
            self.session = session;
        }
    }

    /// Keyboard and swipe input. Only wired once the session is ready.
    fn handle_input(&mut self, ctx: &egui::Context) {
        if !matches!(self.session, Session::Ready(_)) {
            return;
        }

        let mut actions: Vec<Action> = Vec::new();

        let events = ctx.input(|i| i.events.clone());
        match self.swipe.observe(&events) {
            Some(SwipeDir::Next) => actions.push(Action::NextPage),
            Some(SwipeDir::Prev) => actions.push(Action::PrevPage),
            None => {}
        }

        ctx.input(|i| {
            if i.key_pressed(egui::Key::ArrowLeft) || i.key_pressed(egui::Key::A) {
                actions.push(Action::PrevPage);
            }
            if i.key_pressed(egui::Key::ArrowRight) || i.key_pressed(egui::Key::D) {
                actions.push(Action::NextPage);
            }
            if i.key_pressed(egui::Key::ArrowUp) || i.key_pressed(egui::Key::W) {
                actions.push(Action::ZoomIn);
            }
            if i.key_pressed(egui::Key::ArrowDown) || i.key_pressed(egui::Key::S) {
                actions.push(Action::ZoomOut);
            }
            if i.key_pressed(egui::Key::F) {
                actions.push(Action::FitWidth);
            }
            if i.key_pressed(egui::Key::Escape) {
                actions.push(Action::DismissDialog);
            }
        });

        for action in actions {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: Action) {
        let mut close_error = false;

        if let Some(session) = self.ready_session() {
            match action {
                Action::PrevPage => {
                    if session.state.prev_page() {
                        session.scroll_to_current = true;
                    }
                }
                Action::NextPage => {
                    if session.state.next_page() {
                        session.scroll_to_current = true;
                    }
                }
                Action::ZoomIn => session.state.zoom_mut().zoom_in(),
                Action::ZoomOut => session.state.zoom_mut().zoom_out(),
                Action::FitWidth => session.state.zoom_mut().fit_width(),
                Action::DismissDialog => {
                    if session.dialog_open {
                        session.dialog_open = false;
                    } else {
                        close_error = true;
                    }
                }
            }
        }

        if close_error && self.error_dialog.is_some() {
            self.error_dialog = None;
        }
    }

    fn draw_toolbar(&mut self, ctx: &egui::Context) {
        let ready = matches!(self.session, Session::Ready(_));
        let mut actions: Vec<Action> = Vec::new();
        let mut open_clicked = false;

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add_space(8.0);

                if ui.button("📂 Open library…").clicked() {
                    open_clicked = true;
                }

                ui.separator();

                ui.add_enabled_ui(ready, |ui| {
                    if ui.button("◀").clicked() {
                        actions.push(Action::PrevPage);
                    }

                    ui.label(self.page_indicator());

                    if ui.button("▶").clicked() {
                        actions.push(Action::NextPage);
                    }

                    ui.separator();

                    if ui.button("−").clicked() {
                        actions.push(Action::ZoomOut);
                    }
                    if ui.button("+").clicked() {
                        actions.push(Action::ZoomIn);
                    }
                    if ui.button("Fit width").clicked() {
                        actions.push(Action::FitWidth);
                    }

                    if let Session::Ready(session) = &self.session {
                        ui.label(format!("{:.0}%", session.state.zoom().level() * 100.0));
                    }
                });
            });
        });

        if open_clicked {
            self.open_library();
        }
        for action in actions {
            self.apply(action);
        }
    }

    /// Text for the page-indicator display.
    fn page_indicator(&self) -> String {
        match &self.session {
            Session::Ready(session) => {
                format!("{} / {}", session.state.current_page(), session.state.total_pages())
            }
            Session::Loading { slots, decoded, .. } if !slots.is_empty() => {
                format!("{} / {}", decoded, slots.len())
            }
            _ => "— / —".to_string(),
        }
    }

    fn draw_strip(&mut self, ctx: &egui::Context) {
        let now_ms = self.now_ms();

        egui::CentralPanel::default().show(ctx, |ui| {
            match &mut self.session {
                Session::Idle => {
                    ui.centered_and_justified(|ui| {
                        ui.heading("Open a page library to get started");
                    });
                }
                Session::Loading { slots, decoded, .. } => {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.spinner();
                            if slots.is_empty() {
                                ui.label("Scanning pages…");
                            } else {
                                ui.label(format!("Loading pages… {} / {}", decoded, slots.len()));
                            }
                        });
                    });
                }
                Session::Empty { dir } => {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.heading("No pages found");
                            ui.label(format!("Place 001.png, 002.png, … in {}", dir.display()));
                        });
                    });
                }
                Session::Ready(session) => {
                    session.draw(ui, now_ms);
                }
            }
        });
    }

    fn draw_completion_dialog(&mut self, ctx: &egui::Context) {
        let links = self.config.platform_links.clone();

        let Some(session) = self.ready_session() else { return };
        if !session.dialog_open {
            return;
        }

        let mut should_close = false;
        let mut restart = false;
        let mut open_url: Option<String> = None;

        let response = egui::Window::new("Chapter complete")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Thanks for reading! Continue the series on:");
                ui.add_space(8.0);

                ui.horizontal_wrapped(|ui| {
                    for link in &links {
                        if ui.button(&link.id).clicked() {
                            open_url = Some(link.url.clone());
                        }
                    }
                });

                ui.add_space(12.0);

                ui.horizontal(|ui| {
                    if ui.button("Read again").clicked() {
                        restart = true;
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                        if ui.button("Close").clicked() {
                            should_close = true;
                        }
                    });
                });
            });

        // Clicking outside the window dismisses it.
        if let Some(response) = &response {
            let clicked_outside = ctx.input(|i| {
                i.pointer.any_click()
                    && i.pointer
                        .interact_pos()
                        .is_some_and(|pos| !response.response.rect.contains(pos))
            });
            if clicked_outside {
                should_close = true;
            }
        }

        if let Some(url) = open_url {
            log::info!("storefront link opened: {}", url);
            ctx.open_url(egui::OpenUrl::new_tab(url));
        }

        if restart {
            session.restart();
        } else if should_close {
            session.dialog_open = false;
        }
    }

    fn draw_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(error) = &self.error_dialog else {
            return;
        };

        let title = error.title.clone();
        let message = error.message.clone();

        let mut should_close = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&message);
                ui.add_space(12.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    if ui.button("OK").clicked() {
                        should_close = true;
                    }
                });
            });

        if should_close {
            self.error_dialog = None;
        }
    }

    /// Ask for a wakeup when a timer deadline is pending, so settles and
    /// the dialog delay fire without user input.
    fn drive_timers(&mut self, ctx: &egui::Context) {
        let now_ms = self.now_ms();

        if let Some(session) = self.ready_session() {
            let pending = [
                session.scroll_settle.time_until_deadline(now_ms),
                session.dialog_delay.time_until_deadline(now_ms),
            ];
            if let Some(wait) = pending.into_iter().flatten().min() {
                ctx.request_repaint_after(Duration::from_millis(wait.max(1)));
            }
        }
    }
}

impl ReaderSession {
    /// Strip layout for the current viewport width and zoom level.
    fn geometry(&self, base_width: f32) -> StripGeometry {
        let heights: Vec<f32> =
            self.slots.iter().map(|slot| base_width / slot.aspect()).collect();
        let mut geometry = StripGeometry::new(heights, self.spacing_px);
        geometry.set_zoom(self.state.zoom().level());
        geometry
    }

    fn draw(&mut self, ui: &mut egui::Ui, now_ms: u64) {
        let avail = ui.available_size();
        let base_width = (avail.x - PADDING * 2.0).max(100.0);
        let zoom = self.state.zoom().level();
        let current = self.state.current_page();
        let spacing = self.spacing_px;
        let scroll_to_current = std::mem::take(&mut self.scroll_to_current);

        let selection = ui.visuals().selection.bg_fill;
        let placeholder_fill = ui.visuals().widgets.inactive.bg_fill;
        let caption_color = ui.visuals().weak_text_color();

        let output = egui::ScrollArea::both()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let inner_width = ui.available_width();
                let last = self.slots.len();

                for (position, slot) in self.slots.iter().enumerate() {
                    let size = egui::vec2(base_width * zoom, base_width / slot.aspect() * zoom);
                    let padding_x = ((inner_width - size.x) / 2.0).max(0.0);

                    ui.horizontal(|ui| {
                        ui.add_space(padding_x);
                        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::hover());

                        if let Some(texture) = &slot.texture {
                            ui.painter().image(
                                texture.id(),
                                rect,
                                egui::Rect::from_min_max(
                                    egui::pos2(0.0, 0.0),
                                    egui::pos2(1.0, 1.0),
                                ),
                                egui::Color32::WHITE,
                            );
                        } else {
                            ui.painter().rect_filled(rect, 4.0, placeholder_fill);
                        }

                        // Exactly one page carries the current marker; a
                        // full repaint clears every other page first.
                        if slot.number == current {
                            ui.painter().rect_stroke(
                                rect,
                                4.0,
                                egui::Stroke::new(2.0, selection),
                                egui::StrokeKind::Outside,
                            );
                        }

                        // Caption painted into the gap below the page so
                        // the strip geometry stays exact.
                        ui.painter().text(
                            rect.center_bottom() + egui::vec2(0.0, 2.0),
                            egui::Align2::CENTER_TOP,
                            slot.number.to_string(),
                            egui::FontId::proportional(12.0),
                            caption_color,
                        );

                        if scroll_to_current && slot.number == current {
                            response.scroll_to_me(Some(egui::Align::Min));
                        }
                    });

                    if position + 1 < last {
                        ui.add_space(spacing);
                    }
                }
            });

        let offset = output.state.offset.y;
        let viewport_height = output.inner_rect.height();
        self.last_viewport_height = viewport_height;

        // Every scroll event replaces the pending settle deadline.
        if offset != self.last_scroll_offset {
            self.last_scroll_offset = offset;
            self.scroll_settle.arm(now_ms);
        }

        if self.scroll_settle.fire(now_ms) {
            self.on_scroll_settled(base_width, now_ms);
        }

        if self.dialog_delay.fire(now_ms) {
            self.dialog_open = true;
        }
    }

    /// Scroll has been quiet for the debounce window: derive the current
    /// page from the scroll position and evaluate completion.
    fn on_scroll_settled(&mut self, base_width: f32, now_ms: u64) {
        let geometry = self.geometry(base_width);

        if let Some(nearest) =
            geometry.page_at_viewport_center(self.last_scroll_offset, self.last_viewport_height)
        {
            self.state.go_to_page(nearest);
        }

        let end_distance =
            geometry.end_distance(self.last_scroll_offset, self.last_viewport_height);
        let on_last_page = self.state.on_last_page();
        let tolerance = self.completion_tolerance_px;
        if self.state.completion_mut().evaluate(on_last_page, end_distance, tolerance) {
            // Give the reader a moment before interrupting.
            self.dialog_delay.schedule(now_ms, self.completion_delay_ms);
        }
    }

    /// Rewind the session without re-rendering any pages.
    fn restart(&mut self) {
        self.state.restart();
        self.dialog_open = false;
        self.dialog_delay.cancel();
        self.scroll_to_current = true;
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader(ctx);
        self.handle_input(ctx);
        self.draw_toolbar(ctx);
        self.draw_strip(ctx);
        self.draw_completion_dialog(ctx);
        self.draw_error_dialog(ctx);
        self.drive_timers(ctx);
    }
}
