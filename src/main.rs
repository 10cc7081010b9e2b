use clap::Parser;
use eframe::egui;
use egui::{CornerRadius, RichText, ScrollArea, Stroke, Ui, ViewportBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod hn_client;
mod loader;
mod models;
mod session;
mod sort;
mod theme;

use crate::config::Config;
use crate::hn_client::HackerNewsClient;
use crate::loader::BackgroundLoader;
use crate::models::Hit;
use crate::session::{SearchSession, SessionView};
use crate::sort::{SortKey, SortState};
use crate::theme::Palette;

const SEARCH_INPUT_ID: &str = "search_input";

fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hn_search=info")))
        .with_target(false)
        .init();

    let config = Config::parse();
    info!(
        "Starting with api_base={} query='{}' hits_per_page={}",
        config.api_base, config.query, config.hits_per_page
    );

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([720.0, 480.0])
            .with_title("HN Search"),
        ..Default::default()
    };

    eframe::run_native(
        "HN Search",
        options,
        Box::new(move |cc| {
            let mut is_dark_mode = true;

            if let Some(storage) = cc.storage {
                if let Some(theme_str) = storage.get_string("is_dark_mode") {
                    if let Ok(saved) = theme_str.parse::<bool>() {
                        is_dark_mode = saved;
                    }
                }
            }

            if config.light {
                is_dark_mode = false;
            }

            Ok(Box::new(SearchApp::new(&config, is_dark_mode)))
        }),
    )
}

// Everything the user asked for during one frame, applied after drawing
#[derive(Default)]
struct FrameActions {
    query_text: Option<String>,
    submit: bool,
    load_more: bool,
    dismiss: Option<String>,
    sort: Option<SortKey>,
    open_url: Option<String>,
    copy_url: Option<String>,
    toggle_theme: bool,
    focus_search: bool,
    clear_notice: bool,
}

struct SearchApp {
    session: SearchSession<BackgroundLoader>,
    sort: SortState,
    theme: Palette,
    is_dark_mode: bool,
    // Short-lived message like "Link copied"
    notice: Option<String>,
}

impl SearchApp {
    fn new(config: &Config, is_dark_mode: bool) -> Self {
        let client = HackerNewsClient::new(&config.api_base, config.timeout());
        let loader = BackgroundLoader::new(Arc::new(client));
        let mut session = SearchSession::new(loader, config.hits_per_page, &config.query);

        // Same as pressing Search on the default query
        session.submit();

        Self {
            session,
            sort: SortState::default(),
            theme: Palette::for_mode(is_dark_mode),
            is_dark_mode,
            notice: None,
        }
    }

    fn toggle_theme(&mut self) {
        self.is_dark_mode = !self.is_dark_mode;
        self.theme = Palette::for_mode(self.is_dark_mode);
    }

    fn open_link(&self, url: &str) {
        if let Err(e) = open::that(url) {
            warn!("Failed to open URL: {}", e);
        }
    }

    fn copy_link(&mut self, url: &str) {
        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(url.to_string()));
        self.notice = Some(match copied {
            Ok(()) => "Link copied to clipboard".to_string(),
            Err(e) => {
                warn!("Clipboard unavailable: {}", e);
                format!("Could not copy link: {}", e)
            }
        });
    }

    fn apply(&mut self, ctx: &egui::Context, actions: FrameActions) {
        if let Some(text) = actions.query_text {
            self.session.update_query_text(&text);
        }
        if actions.submit {
            self.session.submit();
        }
        if actions.load_more {
            self.session.load_more();
        }
        if let Some(id) = actions.dismiss {
            self.session.dismiss(&id);
        }
        if let Some(key) = actions.sort {
            self.sort.on_sort(key);
        }
        if let Some(url) = actions.open_url {
            self.open_link(&url);
        }
        if let Some(url) = actions.copy_url {
            self.copy_link(&url);
        }
        if actions.toggle_theme {
            self.toggle_theme();
            ctx.request_repaint();
        }
        if actions.focus_search {
            ctx.memory_mut(|m| m.request_focus(egui::Id::new(SEARCH_INPUT_ID)));
        }
        if actions.clear_notice {
            self.notice = None;
        }
    }

    fn read_shortcuts(&self, ctx: &egui::Context, actions: &mut FrameActions) {
        let (ctrl_f, escape) = ctx.input(|i| {
            (
                i.modifiers.ctrl && i.key_pressed(egui::Key::F), // Ctrl+F - Jump to the search box
                i.key_pressed(egui::Key::Escape),               // Escape - Dismiss the notice
            )
        });

        actions.focus_search = ctrl_f;
        actions.clear_notice = escape && self.notice.is_some();
    }

    fn render_header(&self, ui: &mut Ui, actions: &mut FrameActions) {
        ui.horizontal(|ui| {
            ui.heading(RichText::new("HN Search").color(self.theme.accent).size(24.0));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_icon = if self.is_dark_mode { "☀" } else { "☾" };
                let theme_btn = ui.add(
                    egui::Button::new(RichText::new(theme_icon).color(self.theme.control_text).size(20.0))
                        .min_size(egui::Vec2::new(32.0, 32.0))
                        .corner_radius(CornerRadius::same(16))
                        .fill(self.theme.control),
                );

                if theme_btn.clicked() {
                    actions.toggle_theme = true;
                }
                theme_btn.on_hover_text(if self.is_dark_mode { "Switch to Light Mode" } else { "Switch to Dark Mode" });
            });
        });
    }

    fn render_search_form(&self, ui: &mut Ui, actions: &mut FrameActions) {
        let mut query = self.session.pending_query().to_string();

        ui.horizontal(|ui| {
            let text_edit = ui.add_sized(
                [(ui.available_width() - 90.0).max(120.0), 30.0],
                egui::TextEdit::singleline(&mut query)
                    .hint_text("Search stories...")
                    .text_color(self.theme.text)
                    .id(egui::Id::new(SEARCH_INPUT_ID)),
            );

            if text_edit.changed() {
                actions.query_text = Some(query.clone());
            }

            let enter_pressed = text_edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            ui.add_space(8.0);
            let search_btn = ui.add_sized(
                [80.0, 30.0],
                egui::Button::new(RichText::new("Search").color(self.theme.control_text))
                    .fill(self.theme.control),
            );

            if enter_pressed || search_btn.clicked() {
                actions.submit = true;
            }
        });
    }

    fn render_banner(&self, ui: &mut Ui, view: &SessionView<'_>) {
        if let Some(error) = view.error {
            egui::Frame::new()
                .fill(self.theme.surface)
                .stroke(Stroke::new(1.0, self.theme.error))
                .corner_radius(CornerRadius::same(6))
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.label(
                        RichText::new(format!(
                            "Loading '{}' (page {}) failed: {}",
                            error.query,
                            error.page + 1,
                            error.message
                        ))
                        .color(self.theme.error),
                    );
                });
            ui.add_space(6.0);
        }

        if let Some(notice) = &self.notice {
            ui.label(RichText::new(notice).color(self.theme.muted).italics());
            ui.add_space(6.0);
        }
    }

    fn render_sort_header(&self, ui: &mut Ui, key: SortKey, actions: &mut FrameActions) {
        let active = self.sort.key == key;
        let label = format!("{} {}", key.label(), self.sort.indicator(key));
        let color = if active { self.theme.accent } else { self.theme.text };

        let response = ui.add(egui::Button::new(RichText::new(label.trim_end()).color(color).strong()).frame(false));
        if response.clicked() {
            actions.sort = Some(key);
        }
        if response.hovered() {
            ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
        }
    }

    fn render_table(&self, ui: &mut Ui, view: &SessionView<'_>, actions: &mut FrameActions) {
        if view.list.is_empty() {
            if !view.is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    let text = match self.session.state().active_key() {
                        None => "Type a query and press Search.".to_string(),
                        Some(key) => format!("No stories for '{}'", key),
                    };
                    ui.label(RichText::new(text).color(self.theme.muted).size(18.0).italics());
                });
            }
            return;
        }

        let now = chrono::Utc::now();
        let rows = self.sort.arrange(view.list);

        ScrollArea::vertical()
            .id_salt("results_scroll_area")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("results_table")
                    .num_columns(6)
                    .striped(true)
                    .spacing([16.0, 8.0])
                    .min_col_width(60.0)
                    .show(ui, |ui| {
                        for key in SortKey::COLUMNS {
                            self.render_sort_header(ui, key, actions);
                        }
                        ui.label(RichText::new("Age").color(self.theme.muted).strong());
                        ui.label(RichText::new("Hide").color(self.theme.muted).strong());
                        ui.end_row();

                        for hit in rows {
                            self.render_row(ui, hit, now, actions);
                            ui.end_row();
                        }
                    });
            });
    }

    fn render_row(&self, ui: &mut Ui, hit: &Hit, now: chrono::DateTime<chrono::Utc>, actions: &mut FrameActions) {
        ui.horizontal(|ui| {
            ui.set_max_width(ui.available_width().min(460.0));
            let title = ui.add(
                egui::Label::new(RichText::new(&hit.title).color(self.theme.title_color(!hit.url.is_empty())).strong())
                    .truncate()
                    .sense(egui::Sense::click()),
            );

            if title.hovered() && !hit.url.is_empty() {
                ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
            }
            if title.clicked() && !hit.url.is_empty() {
                actions.open_url = Some(hit.url.clone());
            }
            title.context_menu(|ui| {
                if ui.add_enabled(!hit.url.is_empty(), egui::Button::new("Copy link")).clicked() {
                    actions.copy_url = Some(hit.url.clone());
                    ui.close_menu();
                }
            });

            if let Some(domain) = hit.domain() {
                ui.label(RichText::new(format!("({})", domain)).color(self.theme.muted).italics());
            }
        });

        ui.label(RichText::new(&hit.author).color(self.theme.text));
        ui.label(RichText::new(hit.num_comments.to_string()).color(self.theme.muted));
        ui.label(RichText::new(hit.points.to_string()).color(self.theme.points_color(hit.points)).strong());
        ui.label(RichText::new(hit.time_ago(now)).color(self.theme.muted));

        if ui.small_button("Dismiss").clicked() {
            actions.dismiss = Some(hit.object_id.clone());
        }
    }

    fn render_footer(&self, ui: &mut Ui, view: &SessionView<'_>, actions: &mut FrameActions) {
        ui.horizontal(|ui| {
            if !view.list.is_empty() {
                ui.label(
                    RichText::new(format!("{} stories, page {}", view.list.len(), view.page + 1))
                        .color(self.theme.muted)
                        .size(14.0),
                );
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if view.is_loading {
                    ui.spinner();
                    ui.label(RichText::new("Loading...").color(self.theme.muted));
                } else if self.session.state().active_key().is_some() {
                    let more_btn = ui.add_sized(
                        [80.0, 28.0],
                        egui::Button::new(RichText::new("More").color(self.theme.control_text))
                            .fill(self.theme.control),
                    );
                    if more_btn.clicked() {
                        actions.load_more = true;
                    }
                    if !view.has_more {
                        ui.label(RichText::new("No more results").color(self.theme.muted).italics());
                    }
                }
            });
        });
    }
}

impl eframe::App for SearchApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string("is_dark_mode", self.is_dark_mode.to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);

        if self.session.pump() > 0 {
            ctx.request_repaint();
        }

        // Keep polling the loader while a request is out
        if !self.session.state().in_flight.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let mut actions = FrameActions::default();
        self.read_shortcuts(ctx, &mut actions);

        let view = self.session.view();

        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::new().fill(self.theme.header).inner_margin(10.0))
            .show(ctx, |ui| {
                self.render_footer(ui, &view, &mut actions);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui, &mut actions);
            ui.add(egui::Separator::default().spacing(12.0));
            self.render_search_form(ui, &mut actions);
            ui.add_space(8.0);
            self.render_banner(ui, &view);
            self.render_table(ui, &view, &mut actions);
        });

        self.apply(ctx, actions);
    }
}
