//! Main application UI and state management.
//! Handles deck management, card editing and study sessions.

use chrono::NaiveDate;
use eframe::egui;
use study_cards::config::{ClockMode, Config};
use study_cards::database::{Database, db};
use study_cards::export::json::{export_json_to_path, import_json_into};
use study_cards::models::sm2::format_interval;
use study_cards::models::{DeckSummary, Flashcard, Rating, StoredCard, StudySession};

/// Application screen states
#[derive(Default)]
enum AppScreen {
    #[default]
    Main,
    Study,
}

/// Main application state
pub struct StudyApp {
    config: Config,
    db: Database,
    today: NaiveDate,

    show_confirmation_dialog: bool,
    allowed_to_close: bool,

    decks: Vec<DeckSummary>,
    selected_deck: Option<i64>,
    selected_cards: Vec<StoredCard>,
    current_term: String,
    current_definition: String,
    new_deck_title: String,
    new_deck_description: String,

    current_screen: AppScreen,
    session: Option<StudySession>,

    show_export_dialog: bool,
    show_result_dialog: bool,
    result_message: String,
}

/// Deferred card-list actions, applied after the list is drawn
enum CardAction {
    MoveUp(i64),
    MoveDown(i64),
    Delete(i64),
}

impl eframe::App for StudyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.current_screen {
            AppScreen::Main => self.render_main_screen(ctx),
            AppScreen::Study => self.render_study_screen(ctx),
        }

        // Handle window close requests with confirmation dialog
        if ctx.input(|i| i.viewport().close_requested()) && !self.allowed_to_close {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.show_confirmation_dialog = true;
        }

        if self.show_confirmation_dialog {
            egui::Window::new("Do you want to quit?")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("No").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = false;
                        }

                        if ui.button("Yes").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = true;
                            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                });
        }

        if self.show_export_dialog {
            let mut export_deck: Option<i64> = None;
            let mut should_cancel = false;

            egui::Window::new("Export Deck")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Select a deck to export:");
                    ui.separator();

                    for deck in &self.decks {
                        if ui
                            .button(format!("{} ({} cards)", deck.title, deck.card_count))
                            .clicked()
                        {
                            export_deck = Some(deck.id);
                        }
                    }

                    ui.separator();

                    if ui.button("Cancel").clicked() {
                        should_cancel = true;
                    }
                });

            if let Some(id) = export_deck {
                self.handle_export(id);
            }
            if should_cancel {
                self.show_export_dialog = false;
            }
        }

        if self.show_result_dialog {
            egui::Window::new("Result")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&self.result_message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.show_result_dialog = false;
                    }
                });
        }
    }
}

impl StudyApp {
    pub fn new(config: Config, db: Database) -> Self {
        let mut app = Self {
            today: Config::system_today(),
            config,
            db,
            show_confirmation_dialog: false,
            allowed_to_close: false,
            decks: Vec::new(),
            selected_deck: None,
            selected_cards: Vec::new(),
            current_term: String::new(),
            current_definition: String::new(),
            new_deck_title: String::new(),
            new_deck_description: String::new(),
            current_screen: AppScreen::Main,
            session: None,
            show_export_dialog: false,
            show_result_dialog: false,
            result_message: String::new(),
        };
        app.refresh();
        app.selected_deck = app.decks.first().map(|d| d.id);
        app.reload_selected_cards();
        app
    }

    fn show_message(&mut self, message: String) {
        self.result_message = message;
        self.show_result_dialog = true;
    }

    /// Logs a failed operation and tells the user about it
    fn report<E: std::fmt::Display>(&mut self, what: &str, err: E) {
        log::warn!("{}: {}", what, err);
        self.show_message(format!("{}: {}", what, err));
    }

    fn resolve_today(&self) -> NaiveDate {
        match self.config.clock {
            ClockMode::System => Config::system_today(),
            ClockMode::Simulated => {
                db::get_current_date(self.db.conn()).unwrap_or_else(|_| Config::system_today())
            }
        }
    }

    /// Re-reads the date and deck counts
    fn refresh(&mut self) {
        self.today = self.resolve_today();
        match db::deck_summaries(&self.config.user_id, self.today, self.db.conn()) {
            Ok(decks) => self.decks = decks,
            Err(e) => log::warn!("failed to load decks: {}", e),
        }
        if self
            .selected_deck
            .is_some_and(|id| !self.decks.iter().any(|d| d.id == id))
        {
            self.selected_deck = None;
        }
    }

    fn reload_selected_cards(&mut self) {
        self.selected_cards = match self.selected_deck {
            Some(id) => db::get_flashcards_for_deck(id, self.db.conn()).unwrap_or_else(|e| {
                log::warn!("failed to load cards of deck {}: {}", id, e);
                Vec::new()
            }),
            None => Vec::new(),
        };
    }

    /// Renders the main screen with deck management interface
    fn render_main_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.today.format("%Y-%m-%d").to_string());

                if self.config.clock == ClockMode::Simulated && ui.button("Next Day").clicked() {
                    if let Err(e) = db::advance_day(self.db.conn()) {
                        log::warn!("failed to advance the date: {}", e);
                    }
                    self.refresh();
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Export Deck").clicked() {
                    self.show_export_dialog = true;
                }
                if ui.button("Import Deck").clicked() {
                    self.handle_import();
                }
            });

            ui.separator();

            ui.heading("Create New Deck");
            ui.horizontal(|ui| {
                ui.label("Title:");
                ui.text_edit_singleline(&mut self.new_deck_title);
            });
            ui.horizontal(|ui| {
                ui.label("Description:");
                ui.text_edit_singleline(&mut self.new_deck_description);
            });
            if ui.button("Create Deck").clicked() {
                self.handle_create_deck();
            }

            ui.separator();

            ui.heading(format!("Decks ({})", self.decks.len()));

            // Actions are applied after rendering to avoid borrowing conflicts
            let mut action_select: Option<i64> = None;
            let mut action_study: Option<i64> = None;
            let mut action_delete: Option<i64> = None;

            egui::ScrollArea::vertical()
                .id_source("decks_list")
                .max_height(150.0)
                .show(ui, |ui| {
                    for deck in &self.decks {
                        let is_selected = self.selected_deck == Some(deck.id);

                        ui.horizontal(|ui| {
                            if ui
                                .selectable_label(
                                    is_selected,
                                    format!(
                                        "{} ({} cards, {} due)",
                                        deck.title, deck.card_count, deck.due_count
                                    ),
                                )
                                .clicked()
                            {
                                action_select = Some(deck.id);
                            }

                            if ui.button("Study").clicked() {
                                action_study = Some(deck.id);
                            }
                            if ui.button("Delete").clicked() {
                                action_delete = Some(deck.id);
                            }
                        });
                    }
                });

            if let Some(id) = action_select {
                self.selected_deck = Some(id);
                self.reload_selected_cards();
            }
            if let Some(id) = action_study {
                self.start_study_session(id);
            }
            if let Some(id) = action_delete {
                if let Err(e) = db::delete_deck(id, self.db.conn()) {
                    self.report("Failed to delete deck", e);
                }
                self.refresh();
                self.reload_selected_cards();
            }

            ui.separator();

            match self.selected_deck {
                Some(deck_id) => self.render_card_editor(ui, deck_id),
                None => {
                    ui.label("Select a deck to add flashcards");
                }
            }
        });
    }

    fn render_card_editor(&mut self, ui: &mut egui::Ui, deck_id: i64) {
        let title = self
            .decks
            .iter()
            .find(|d| d.id == deck_id)
            .map(|d| d.title.clone())
            .unwrap_or_default();
        ui.heading(format!("Selected Deck: {}", title));

        ui.horizontal(|ui| {
            ui.label("Term:");
            ui.text_edit_singleline(&mut self.current_term);
        });
        ui.horizontal(|ui| {
            ui.label("Definition:");
            ui.text_edit_singleline(&mut self.current_definition);
        });

        if ui.button("Add Flashcard").clicked() {
            let added = Flashcard::new(&self.current_term, &self.current_definition)
                .and_then(|card| db::add_flashcard(deck_id, &card, self.db.conn()));
            match added {
                Ok(_) => {
                    self.current_term.clear();
                    self.current_definition.clear();
                    self.refresh();
                    self.reload_selected_cards();
                }
                Err(e) => self.report("Failed to add flashcard", e),
            }
        }

        ui.separator();

        ui.heading(format!("Flashcards ({})", self.selected_cards.len()));

        let mut action: Option<CardAction> = None;

        egui::ScrollArea::vertical()
            .id_source("flashcards_list")
            .max_height(200.0)
            .show(ui, |ui| {
                for (i, card) in self.selected_cards.iter().enumerate() {
                    ui.group(|ui| {
                        ui.horizontal(|ui| {
                            ui.vertical(|ui| {
                                ui.label(format!("{}. Term: {}", i + 1, card.flashcard.term));
                                ui.label(format!("   Definition: {}", card.flashcard.definition));
                            });
                            if ui.small_button("Up").clicked() {
                                action = Some(CardAction::MoveUp(card.id));
                            }
                            if ui.small_button("Down").clicked() {
                                action = Some(CardAction::MoveDown(card.id));
                            }
                            if ui.small_button("Delete").clicked() {
                                action = Some(CardAction::Delete(card.id));
                            }
                        });
                    });
                }
            });

        if let Some(action) = action {
            let conn = self.db.conn();
            let result = match action {
                CardAction::MoveUp(id) => db::move_flashcard(id, db::Move::Up, conn),
                CardAction::MoveDown(id) => db::move_flashcard(id, db::Move::Down, conn),
                CardAction::Delete(id) => db::delete_flashcard(id, conn),
            };
            if let Err(e) = result {
                self.report("Failed to update flashcards", e);
            }
            self.refresh();
            self.reload_selected_cards();
        }
    }

    /// Renders the study screen: Space flips the card, keys 1-4 rate it
    fn render_study_screen(&mut self, ctx: &egui::Context) {
        let mut action_toggle = ctx.input(|i| i.key_pressed(egui::Key::Space));
        let mut action_rate = ctx.input(|i| {
            [
                (egui::Key::Num1, '1'),
                (egui::Key::Num2, '2'),
                (egui::Key::Num3, '3'),
                (egui::Key::Num4, '4'),
            ]
            .into_iter()
            .find(|(key, _)| i.key_pressed(*key))
            .and_then(|(_, c)| Rating::from_key(c))
        });
        let mut action_back = false;
        let mut action_restart = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = &self.session else {
                action_back = true;
                return;
            };

            ui.heading(format!("Studying: {}", session.deck_title));

            if session.is_completed() {
                action_toggle = false;
                action_rate = None;

                ui.add_space(20.0);
                ui.heading("Session Complete!");
                ui.label(format!(
                    "You studied {} cards from \"{}\"",
                    session.studied_count(),
                    session.deck_title
                ));
                ui.add_space(20.0);
                ui.horizontal(|ui| {
                    if ui.button("Back to Decks").clicked() {
                        action_back = true;
                    }
                    if ui.button("Study Again").clicked() {
                        action_restart = true;
                    }
                });
                return;
            }

            ui.label(session.phase_message());
            ui.add(egui::ProgressBar::new(session.progress()).show_percentage());
            ui.label(format!(
                "{} / {} passed this round ({} remaining)",
                session.learned_count(),
                session.total_count(),
                session.remaining_count()
            ));

            ui.add_space(20.0);

            let show_def = session.is_definition_shown();
            if let Some(card) = session.current_card() {
                ui.group(|ui| {
                    ui.set_min_height(200.0);
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.heading("Term:");
                        ui.label(&card.card.flashcard.term);
                        ui.add_space(20.0);

                        if show_def {
                            ui.heading("Definition:");
                            ui.label(&card.card.flashcard.definition);
                        } else {
                            ui.label("(Press Space or 'Show Definition' to reveal)");
                        }
                        ui.add_space(20.0);
                    });
                });
            }

            ui.add_space(20.0);

            if !show_def {
                action_rate = None;
                if ui.button("Show Definition").clicked() {
                    action_toggle = true;
                }
            } else if let Some(previews) = session.preview_intervals() {
                ui.label("How well did you remember it?");
                ui.horizontal(|ui| {
                    for (rating, days) in Rating::ALL.into_iter().zip(previews) {
                        let text = format!("{} ({})", rating.label(), format_interval(days));
                        if ui.button(text).clicked() {
                            action_rate = Some(rating);
                        }
                    }
                });
            }

            ui.add_space(20.0);

            if ui.button("Back to Decks").clicked() {
                action_back = true;
            }
        });

        if let Some(session) = &mut self.session {
            if action_restart {
                session.restart();
            } else if let Some(rating) = action_rate {
                if let Err(e) = session.rate(rating, &self.db, &self.config.user_id) {
                    log::warn!("failed to record rating: {}", e);
                    self.result_message = format!("Failed to update progress: {}", e);
                    self.show_result_dialog = true;
                }
            } else if action_toggle {
                session.toggle_definition();
            }
        }

        if action_back {
            self.current_screen = AppScreen::Main;
            self.session = None;
            self.refresh();
        }
    }

    /// Starts a study session with the deck's queued cards
    fn start_study_session(&mut self, deck_id: i64) {
        self.refresh();
        let Some(deck) = self.decks.iter().find(|d| d.id == deck_id) else {
            return;
        };
        let title = deck.title.clone();

        match db::cards_with_state(deck_id, &self.config.user_id, self.db.conn()) {
            Ok(cards) => {
                let session = StudySession::new(title.clone(), cards, self.config.queue, self.today);
                if session.total_count() == 0 {
                    self.show_message(format!("No cards in \"{}\" are due today", title));
                    return;
                }
                log::info!("studying '{}' ({} cards)", title, session.total_count());
                self.session = Some(session);
                self.current_screen = AppScreen::Study;
            }
            Err(e) => self.report("Failed to load study session", e),
        }
    }

    fn handle_create_deck(&mut self) {
        let description = Some(self.new_deck_description.as_str());
        match db::new_deck(&self.new_deck_title, description, self.db.conn()) {
            Ok(id) => {
                self.new_deck_title.clear();
                self.new_deck_description.clear();
                self.refresh();
                self.selected_deck = Some(id);
                self.reload_selected_cards();
            }
            Err(e) => self.report("Failed to create deck", e),
        }
    }

    /// Handles deck export to JSON file
    fn handle_export(&mut self, deck_id: i64) {
        self.show_export_dialog = false;

        let deck = match db::load_deck(deck_id, self.db.conn()) {
            Ok(deck) => deck,
            Err(e) => return self.report("Export failed", e),
        };

        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(format!("{}.json", deck.title))
            .add_filter("JSON files", &["json"])
            .save_file()
        {
            match export_json_to_path(&deck, &path) {
                Ok(()) => self.show_message(format!("Deck '{}' exported successfully!", deck.title)),
                Err(e) => self.report("Export failed", e),
            }
        }
    }

    /// Handles deck import from JSON file
    fn handle_import(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        else {
            return;
        };

        match import_json_into(&path, self.db.conn()) {
            Ok((id, deck)) => {
                self.refresh();
                self.selected_deck = Some(id);
                self.reload_selected_cards();
                self.show_message(format!(
                    "Deck '{}' imported successfully with {} cards!",
                    deck.title,
                    deck.flashcards.len()
                ));
            }
            Err(e) => self.report(
                "Import failed",
                format!(
                    "{}\n\nPlease check if the file has correct structure:\n{{\n  \"title\": \"Deck Title\",\n  \"flashcards\": [...]\n}}",
                    e
                ),
            ),
        }
    }
}
