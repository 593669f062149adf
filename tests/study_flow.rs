use chrono::{Days, NaiveDate};
use study_cards::database::db;
use study_cards::{Database, Flashcard, QueueMode, Rating, ReviewStore, StudySession};
use tempfile::TempDir;

const USER: &str = "local";

fn study_deck(database: &Database, deck_id: i64, today: NaiveDate, rating: Rating) -> usize {
    let cards = db::cards_with_state(deck_id, USER, database.conn()).unwrap();
    let mut session = StudySession::new("Vocabulary".into(), cards, QueueMode::Due, today);
    while !session.is_completed() {
        session.reveal();
        session.rate(rating, database, USER).unwrap();
    }
    session.studied_count()
}

#[test]
fn progress_survives_reopening_the_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("study.sqlite3");
    let day_one = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let deck_id = {
        let database = Database::open(&path).unwrap();
        let deck_id = db::new_deck("Vocabulary", Some("first words"), database.conn()).unwrap();
        for (term, definition) in [("cześć", "hello"), ("dziękuję", "thank you")] {
            let card = Flashcard::new(term, definition).unwrap();
            db::add_flashcard(deck_id, &card, database.conn()).unwrap();
        }

        assert_eq!(study_deck(&database, deck_id, day_one, Rating::Good), 2);
        deck_id
    };

    let database = Database::open(&path).unwrap();
    let summaries = db::deck_summaries(USER, day_one, database.conn()).unwrap();
    assert_eq!(summaries[0].card_count, 2);
    assert_eq!(summaries[0].due_count, 0);

    let day_two = day_one + Days::new(1);
    let summaries = db::deck_summaries(USER, day_two, database.conn()).unwrap();
    assert_eq!(summaries[0].due_count, 2);

    assert_eq!(study_deck(&database, deck_id, day_two, Rating::Good), 2);
    for (card, state) in db::cards_with_state(deck_id, USER, database.conn()).unwrap() {
        let state = state.unwrap();
        assert_eq!(state.repetition_count, 2);
        assert_eq!(state.interval_days, 6);
        assert_eq!(state.next_review_date, day_two + Days::new(6));
        assert_eq!(database.get(USER, card.id).unwrap(), Some(state));
    }

    // nothing is due until the six days have passed
    let cards = db::cards_with_state(deck_id, USER, database.conn()).unwrap();
    let early = day_two + Days::new(5);
    let session = StudySession::new("Vocabulary".into(), cards, QueueMode::Due, early);
    assert!(session.is_completed());
}

#[test]
fn users_have_independent_progress() {
    let database = Database::open_in_memory().unwrap();
    let deck_id = db::new_deck("Shared", None, database.conn()).unwrap();
    let card = Flashcard::new("term", "def").unwrap();
    let card_id = db::add_flashcard(deck_id, &card, database.conn()).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let cards = db::cards_with_state(deck_id, "alice", database.conn()).unwrap();
    let mut session = StudySession::new("Shared".into(), cards, QueueMode::Due, today);
    session.reveal();
    session.rate(Rating::Easy, &database, "alice").unwrap();

    assert!(database.get("alice", card_id).unwrap().is_some());
    assert!(database.get("bob", card_id).unwrap().is_none());

    let bob = db::deck_summaries("bob", today + Days::new(1), database.conn()).unwrap();
    assert_eq!(bob[0].due_count, 1);

    database.remove("alice", card_id).unwrap();
    assert!(database.get("alice", card_id).unwrap().is_none());
}
