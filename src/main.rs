use eframe::egui;
use egui::{Color32, CornerRadius, RichText, ScrollArea, Stroke, ViewportBuilder};
use std::sync::mpsc::Receiver;
use std::thread;

mod models;
mod reducer;
mod search_client;
mod settings;

use crate::models::{StoriesState, Story};
use crate::reducer::{filter_stories, reduce, StoriesAction};
use crate::search_client::SearchClient;
use crate::settings::SettingsStore;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    // Settings and the HTTP client are constructed here and handed to the
    // app explicitly, so nothing reaches for ambient global state
    let settings = match SettingsStore::new() {
        Ok(store) => store,
        Err(e) => {
            log::error!("Failed to open settings store: {e:#}");
            std::process::exit(1);
        }
    };

    let search_client = match SearchClient::new() {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to create search client: {e:#}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([600.0, 400.0])
            .with_title("Hacker Stories"),
        ..Default::default()
    };

    eframe::run_native(
        "Hacker Stories",
        options,
        Box::new(|cc| {
            let mut app = HackerStoriesApp::new(search_client, settings);

            if let Some(storage) = cc.storage {
                // Restore the saved theme preference
                if let Some(theme_str) = storage.get_string("is_dark_mode") {
                    if let Ok(is_dark_mode) = theme_str.parse::<bool>() {
                        app.is_dark_mode = is_dark_mode;
                        app.theme = if is_dark_mode {
                            AppTheme::dark()
                        } else {
                            AppTheme::light()
                        };
                    }
                }
            }

            Ok(Box::new(app))
        }),
    )
}

struct AppTheme {
    background: Color32,
    card_background: Color32,
    text: Color32,
    secondary_text: Color32,
    highlight: Color32,
    separator: Color32,
    error: Color32,
    score_high: Color32,
    score_medium: Color32,
    score_low: Color32,
    button_background: Color32,
    button_foreground: Color32,
    button_hover_background: Color32,
}

impl AppTheme {
    fn dark() -> Self {
        Self {
            background: Color32::from_rgb(18, 18, 18),
            card_background: Color32::from_rgb(30, 30, 30),
            text: Color32::from_rgb(240, 240, 240),
            secondary_text: Color32::from_rgb(180, 180, 180),
            highlight: Color32::from_rgb(255, 102, 0), // HN orange
            separator: Color32::from_rgb(60, 60, 60),
            error: Color32::from_rgb(229, 115, 115),
            score_high: Color32::from_rgb(76, 175, 80),
            score_medium: Color32::from_rgb(255, 193, 7),
            score_low: Color32::from_rgb(158, 158, 158),
            button_background: Color32::from_rgb(66, 66, 66),
            button_foreground: Color32::from_rgb(240, 240, 240),
            button_hover_background: Color32::from_rgb(80, 80, 80),
        }
    }

    fn light() -> Self {
        Self {
            background: Color32::from_rgb(245, 245, 245),
            card_background: Color32::from_rgb(255, 255, 255),
            text: Color32::from_rgb(20, 20, 20),
            secondary_text: Color32::from_rgb(90, 90, 90),
            highlight: Color32::from_rgb(235, 92, 0),
            separator: Color32::from_rgb(200, 200, 200),
            error: Color32::from_rgb(180, 40, 40),
            score_high: Color32::from_rgb(30, 110, 40),
            score_medium: Color32::from_rgb(190, 130, 0),
            score_low: Color32::from_rgb(80, 80, 80),
            button_background: Color32::from_rgb(235, 235, 235),
            button_foreground: Color32::from_rgb(20, 20, 20),
            button_hover_background: Color32::from_rgb(210, 210, 210),
        }
    }

    fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.card_background;
        style.visuals.window_stroke = Stroke::new(1.0, self.separator);
        style.visuals.widgets.noninteractive.bg_fill = self.card_background;
        style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text);

        style.visuals.widgets.inactive.bg_fill = self.button_background;
        style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.active.bg_fill = self.highlight;
        style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.hovered.bg_fill = self.button_hover_background;
        style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.button_foreground);

        style.visuals.selection.bg_fill = self.highlight;
        style.visuals.selection.stroke = Stroke::new(1.0, self.highlight);

        style.visuals.window_corner_radius = CornerRadius::same(8);
        style.visuals.widgets.noninteractive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.inactive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.hovered.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.active.corner_radius = CornerRadius::same(4);

        ctx.set_style(style);
    }

    fn score_color(&self, points: i64) -> Color32 {
        if points >= 300 {
            self.score_high
        } else if points >= 100 {
            self.score_medium
        } else {
            self.score_low
        }
    }
}

/// One in-flight fetch result: the request sequence number it belongs to,
/// and the stories on success or None on failure.
type FetchResult = (u64, Option<Vec<Story>>);

/// Map one worker message to the action it should produce, or None when the
/// message belongs to a request that has since been superseded.
fn resolve_fetch_result(
    latest_seq: u64,
    seq: u64,
    payload: Option<Vec<Story>>,
) -> Option<StoriesAction> {
    if seq < latest_seq {
        log::debug!("dropping stale response for request {seq} (latest is {latest_seq})");
        return None;
    }

    Some(match payload {
        Some(stories) => StoriesAction::FetchSuccess(stories),
        None => StoriesAction::FetchFailure,
    })
}

struct HackerStoriesApp {
    search_client: SearchClient,
    settings: SettingsStore,
    stories: StoriesState,
    search_term: String,
    theme: AppTheme,
    is_dark_mode: bool,
    stories_receiver: Option<Receiver<FetchResult>>,
    load_thread: Option<thread::JoinHandle<()>>,
    // Sequence number of the most recently issued fetch; responses tagged
    // with an older number are stale and get dropped
    request_seq: u64,
    needs_repaint: bool,
    initialized: bool,
}

impl HackerStoriesApp {
    fn new(search_client: SearchClient, settings: SettingsStore) -> Self {
        let search_term = match settings.load_search_term() {
            Ok(term) => term,
            Err(e) => {
                log::error!("Failed to load persisted search term: {e:#}");
                settings::DEFAULT_SEARCH_TERM.to_string()
            }
        };

        Self {
            search_client,
            settings,
            stories: StoriesState::default(),
            search_term,
            theme: AppTheme::dark(),
            is_dark_mode: true,
            stories_receiver: None,
            load_thread: None,
            request_seq: 0,
            needs_repaint: false,
            initialized: false,
        }
    }

    fn dispatch(&mut self, action: StoriesAction) {
        reduce(&mut self.stories, action);
        self.needs_repaint = true;
    }

    fn submit_search(&mut self) {
        if self.stories.is_loading {
            return; // Don't start another fetch while one is in flight
        }

        self.dispatch(StoriesAction::FetchInit);

        self.request_seq += 1;
        let seq = self.request_seq;
        let client = self.search_client.clone();
        let term = self.search_term.clone();
        let (tx, rx) = std::sync::mpsc::channel();

        let handle = thread::spawn(move || match client.search(&term) {
            Ok(stories) => {
                let _ = tx.send((seq, Some(stories)));
            }
            Err(e) => {
                log::error!("Search for {term:?} failed: {e:#}");
                let _ = tx.send((seq, None));
            }
        });

        self.load_thread = Some(handle);
        self.stories_receiver = Some(rx);
    }

    fn check_fetch_result(&mut self) {
        let received = self
            .stories_receiver
            .as_ref()
            .and_then(|rx| rx.try_recv().ok());

        if let Some((seq, payload)) = received {
            // Each channel carries exactly one message, so the drained
            // receiver is spent either way
            self.stories_receiver = None;

            // Invariant: the live receiver belongs to the newest request
            // (every submit installs a fresh channel), so here seq equals
            // request_seq; resolve_fetch_result keeps the discard policy in
            // one place for any wiring where older channels survive
            if let Some(action) = resolve_fetch_result(self.request_seq, seq, payload) {
                self.dispatch(action);
            }
        }

        // Reap the worker thread once it is done; results arrive over the
        // channel, the join result itself is unused
        if let Some(handle) = &self.load_thread {
            if handle.is_finished() {
                if let Some(handle) = self.load_thread.take() {
                    let _ = handle.join();
                }
            }
        }
    }

    fn on_search_term_changed(&mut self) {
        // Persist on every change, not just on submit
        if let Err(e) = self.settings.save_search_term(&self.search_term) {
            log::error!("Failed to persist search term: {e:#}");
        }
    }

    fn open_link(&self, url: &str) {
        if let Err(e) = open::that(url) {
            log::error!("Failed to open URL {url}: {e}");
        }
    }

    fn toggle_theme(&mut self) {
        self.is_dark_mode = !self.is_dark_mode;
        self.theme = if self.is_dark_mode {
            AppTheme::dark()
        } else {
            AppTheme::light()
        };
        self.needs_repaint = true;
    }

    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(
                RichText::new("Hacker Stories")
                    .color(self.theme.highlight)
                    .size(24.0),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_icon = if self.is_dark_mode { "☀" } else { "☾" };
                let theme_btn = ui.add(
                    egui::Button::new(
                        RichText::new(theme_icon)
                            .color(self.theme.button_foreground)
                            .size(18.0),
                    )
                    .min_size(egui::Vec2::new(32.0, 32.0))
                    .corner_radius(CornerRadius::same(16))
                    .fill(self.theme.button_background),
                );

                if theme_btn.hovered() {
                    ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                }

                if theme_btn.clicked() {
                    self.toggle_theme();
                }
            });
        });
    }

    fn render_search_row(&mut self, ui: &mut egui::Ui) {
        let mut submit = false;

        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Search:")
                    .color(self.theme.text)
                    .size(15.0),
            );

            let response = ui.add(
                egui::TextEdit::singleline(&mut self.search_term)
                    .hint_text("Search Hacker News")
                    .desired_width(320.0),
            );

            if response.changed() {
                self.on_search_term_changed();
            }

            // Enter in the field submits, same as the button
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }

            let submit_btn = ui.add_enabled(
                !self.stories.is_loading,
                egui::Button::new(
                    RichText::new("Submit").color(self.theme.button_foreground),
                )
                .fill(self.theme.button_background)
                .corner_radius(CornerRadius::same(4)),
            );

            if submit_btn.clicked() {
                submit = true;
            }
        });

        if submit {
            self.submit_search();
        }
    }

    fn render_story_card(&self, ui: &mut egui::Ui, story: &Story) -> bool {
        let mut dismissed = false;

        egui::Frame::new()
            .fill(self.theme.card_background)
            .corner_radius(CornerRadius::same(6))
            .inner_margin(egui::Margin::symmetric(12, 8))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        let title = if story.title.is_empty() {
                            "(untitled)"
                        } else {
                            &story.title
                        };
                        let title_label = ui.add(
                            egui::Label::new(
                                RichText::new(title).color(self.theme.text).size(16.0),
                            )
                            .sense(egui::Sense::click()),
                        );

                        if title_label.hovered() && !story.url.is_empty() {
                            ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                        }

                        if title_label.clicked() && !story.url.is_empty() {
                            self.open_link(&story.url);
                        }

                        ui.horizontal(|ui| {
                            ui.label(
                                RichText::new(format!("{} points", story.points))
                                    .color(self.theme.score_color(story.points))
                                    .size(13.0),
                            );
                            ui.label(
                                RichText::new(format!("by {}", story.author))
                                    .color(self.theme.secondary_text)
                                    .size(13.0),
                            );
                            ui.label(
                                RichText::new(format!("{} comments", story.num_comments))
                                    .color(self.theme.secondary_text)
                                    .size(13.0),
                            );
                        });
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let dismiss_btn = ui.add(
                            egui::Button::new(
                                RichText::new("Dismiss")
                                    .color(self.theme.button_foreground)
                                    .size(13.0),
                            )
                            .fill(self.theme.button_background)
                            .corner_radius(CornerRadius::same(4)),
                        );

                        if dismiss_btn.hovered() {
                            ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                        }

                        if dismiss_btn.clicked() {
                            dismissed = true;
                        }
                    });
                });
            });

        dismissed
    }

    fn render_story_list(&mut self, ui: &mut egui::Ui) {
        let visible = filter_stories(&self.stories.data, &self.search_term);

        if visible.is_empty() && !self.stories.is_loading && !self.stories.is_error {
            ui.label(
                RichText::new("No results.")
                    .color(self.theme.secondary_text)
                    .size(14.0),
            );
            return;
        }

        // Collect the dismissal here and dispatch after the loop to avoid
        // borrow checker issues with the card closures
        let mut pending_remove: Option<u64> = None;

        ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for story in &visible {
                    if self.render_story_card(ui, story) {
                        pending_remove = Some(story.object_id);
                    }
                    ui.add_space(6.0);
                }
            });

        if let Some(object_id) = pending_remove {
            self.dispatch(StoriesAction::RemoveStory(object_id));
        }
    }
}

impl eframe::App for HackerStoriesApp {
    // Save the theme preference when the app is closing
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string("is_dark_mode", self.is_dark_mode.to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);

        self.check_fetch_result();

        // Kick off the initial fetch with the persisted term on first frame
        if !self.initialized {
            self.initialized = true;
            self.submit_search();
        }

        if self.needs_repaint {
            ctx.request_repaint();
            self.needs_repaint = false;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui);
            ui.add_space(6.0);
            self.render_search_row(ui);
            ui.separator();

            if self.stories.is_loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(
                        RichText::new("Loading…")
                            .color(self.theme.secondary_text)
                            .size(14.0),
                    );
                });
                // Keep polling for the fetch result
                ctx.request_repaint_after(std::time::Duration::from_millis(100));
            }

            if self.stories.is_error {
                ui.label(
                    RichText::new("Something went wrong.")
                        .color(self.theme.error)
                        .size(14.0),
                );
            }

            ui.add_space(6.0);
            self.render_story_list(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(object_id: u64, title: &str) -> Story {
        Story {
            title: title.to_string(),
            url: String::new(),
            author: "tester".to_string(),
            topic: String::new(),
            num_comments: 0,
            points: 0,
            object_id,
        }
    }

    #[test]
    fn superseded_response_is_dropped() {
        // Request 1 resolves after request 2 was issued
        let action = resolve_fetch_result(2, 1, Some(vec![story(1, "late")]));
        assert!(action.is_none());
    }

    #[test]
    fn current_response_becomes_fetch_success() {
        let action = resolve_fetch_result(2, 2, Some(vec![story(7, "fresh")]));
        match action {
            Some(StoriesAction::FetchSuccess(stories)) => {
                assert_eq!(stories, vec![story(7, "fresh")]);
            }
            other => panic!("expected FetchSuccess, got {other:?}"),
        }
    }

    #[test]
    fn current_failure_becomes_fetch_failure() {
        let action = resolve_fetch_result(3, 3, None);
        assert!(matches!(action, Some(StoriesAction::FetchFailure)));
    }

    #[test]
    fn stale_response_never_overwrites_newer_state() {
        // The full sequence from the decided overlap strategy: an old
        // success arriving after a newer one must leave state untouched
        let mut state = StoriesState::default();

        reduce(&mut state, StoriesAction::FetchInit);
        if let Some(action) = resolve_fetch_result(2, 2, Some(vec![story(2, "newer")])) {
            reduce(&mut state, action);
        }
        assert!(resolve_fetch_result(2, 1, Some(vec![story(1, "older")])).is_none());

        assert_eq!(state.data, vec![story(2, "newer")]);
        assert!(!state.is_loading);
        assert!(!state.is_error);
    }
}
