mod app;
use study_cards::*;

use app::StudyApp;
use database::db;

fn main() -> eframe::Result<()> {
    let config_path = Config::path();
    let loaded = Config::load(&config_path);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    if let Err(e) = &loaded {
        log::warn!("ignoring {}: {}", config_path.display(), e);
    }

    let database = Database::open(&config.database_path).expect("Failed to open database");

    if db::get_all_decks(database.conn()).unwrap_or_default().is_empty() {
        if let Ok(deck) = db::new_deck("Polish Vocabulary", None, database.conn()) {
            for (term, definition) in [("cześć", "hello"), ("dziękuję", "thank you"), ("proszę", "please")] {
                if let Ok(card) = Flashcard::new(term, definition) {
                    if let Err(e) = db::add_flashcard(deck, &card, database.conn()) {
                        log::warn!("failed to seed card '{}': {}", term, e);
                    }
                }
            }
            log::info!("sample deck created");
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([500.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Study Cards",
        options,
        Box::new(|_cc| Ok(Box::new(StudyApp::new(config, database)))),
    )
}
