//! Database operations for the study application
//!
//! Handles SQLite schema setup, CRUD for decks and flashcards, per-user
//! review states and the simulated calendar date.

use crate::models::sm2::is_due;
use crate::models::{Deck, DeckSummary, Flashcard, ReviewState, StoredCard, validate_title};
use crate::store::{Result, StoreError};
use chrono::{Days, Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Direction for reordering a card inside its deck
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
}

/// Opens (or creates) the database file and makes sure all tables exist
pub fn init_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    log::info!("opened study database at {}", path.display());
    Ok(conn)
}

pub fn init_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Creates tables for decks, flashcards, review states and app state.
/// Review states are keyed per user and card and vanish with their card.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS decks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL UNIQUE,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS flashcards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deck_id INTEGER NOT NULL,
            term TEXT NOT NULL,
            definition TEXT NOT NULL,
            position INTEGER NOT NULL,
            FOREIGN KEY (deck_id) REFERENCES decks(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS review_states (
            user_id TEXT NOT NULL,
            card_id INTEGER NOT NULL,
            ease_factor REAL NOT NULL,
            repetition_count INTEGER NOT NULL,
            interval_days INTEGER NOT NULL,
            next_review_date TEXT NOT NULL,
            PRIMARY KEY (user_id, card_id),
            FOREIGN KEY (card_id) REFERENCES flashcards(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;
    Ok(())
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|_| StoreError::CorruptDate(text.to_string()))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ==================== Simulated date ====================

/// Retrieves the simulated current date, seeding it with the local date on first use
pub fn get_current_date(conn: &Connection) -> Result<NaiveDate> {
    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![format_date(Local::now().date_naive())],
    )?;

    let value: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;
    parse_date(&value)
}

pub fn set_current_date(date: NaiveDate, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO app_state (key, value) VALUES ('current_date', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![format_date(date)],
    )?;
    Ok(())
}

/// Advances the simulated date by one day (for trying out spaced repetition)
pub fn advance_day(conn: &Connection) -> Result<NaiveDate> {
    let next = get_current_date(conn)? + Days::new(1);
    set_current_date(next, conn)?;
    Ok(next)
}

// ==================== Decks ====================

/// Creates a new deck and returns its id. Titles are unique.
pub fn new_deck(title: &str, description: Option<&str>, conn: &Connection) -> Result<i64> {
    let title = validate_title(title)?;
    if find_deck_by_title(&title, conn)?.is_some() {
        return Err(StoreError::DuplicateDeck(title));
    }
    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty());

    conn.execute(
        "INSERT INTO decks (title, description) VALUES (?1, ?2)",
        params![title, description],
    )?;
    let id = conn.last_insert_rowid();
    log::info!("deck '{}' created with id {}", title, id);
    Ok(id)
}

pub fn find_deck_by_title(title: &str, conn: &Connection) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM decks WHERE title = ?1",
            params![title.trim()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Retrieves all decks as (id, title, description), newest first
pub fn get_all_decks(conn: &Connection) -> Result<Vec<(i64, String, Option<String>)>> {
    let mut stmt = conn.prepare("SELECT id, title, description FROM decks ORDER BY id DESC")?;
    let decks = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(decks)
}

/// Deletes a deck together with its cards and their review states
pub fn delete_deck(deck_id: i64, conn: &Connection) -> Result<()> {
    let deleted = conn.execute("DELETE FROM decks WHERE id = ?1", params![deck_id])?;
    if deleted == 0 {
        return Err(StoreError::DeckNotFound(deck_id));
    }
    Ok(())
}

/// Loads a deck with its flashcards in position order
pub fn load_deck(deck_id: i64, conn: &Connection) -> Result<Deck> {
    let (title, description) = conn
        .query_row(
            "SELECT title, description FROM decks WHERE id = ?1",
            params![deck_id],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)),
        )
        .optional()?
        .ok_or(StoreError::DeckNotFound(deck_id))?;

    let flashcards = get_flashcards_for_deck(deck_id, conn)?
        .into_iter()
        .map(|card| card.flashcard)
        .collect();

    Ok(Deck {
        title,
        description,
        flashcards,
    })
}

/// Card and due counts for every deck, as seen by `user_id` on `today`.
/// Cards the user never reviewed count as due.
pub fn deck_summaries(user_id: &str, today: NaiveDate, conn: &Connection) -> Result<Vec<DeckSummary>> {
    let mut summaries = Vec::new();

    for (id, title, description) in get_all_decks(conn)? {
        let cards = cards_with_state(id, user_id, conn)?;
        let due_count = cards
            .iter()
            .filter(|(_, state)| is_due(state.as_ref(), today))
            .count();

        summaries.push(DeckSummary {
            id,
            title,
            description,
            card_count: cards.len(),
            due_count,
        });
    }

    Ok(summaries)
}

// ==================== Flashcards ====================

fn deck_exists(deck_id: i64, conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM decks WHERE id = ?1",
        params![deck_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Appends a flashcard to the end of a deck and returns its id
pub fn add_flashcard(deck_id: i64, flashcard: &Flashcard, conn: &Connection) -> Result<i64> {
    if !deck_exists(deck_id, conn)? {
        return Err(StoreError::DeckNotFound(deck_id));
    }

    let position: u32 = conn.query_row(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM flashcards WHERE deck_id = ?1",
        params![deck_id],
        |row| row.get(0),
    )?;

    conn.execute(
        "INSERT INTO flashcards (deck_id, term, definition, position) VALUES (?1, ?2, ?3, ?4)",
        params![deck_id, flashcard.term, flashcard.definition, position],
    )?;

    Ok(conn.last_insert_rowid())
}

fn stored_card_from_row(row: &Row) -> rusqlite::Result<StoredCard> {
    Ok(StoredCard {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        position: row.get(4)?,
        flashcard: Flashcard {
            term: row.get(2)?,
            definition: row.get(3)?,
        },
    })
}

/// Retrieves all flashcards of a deck ordered by position
pub fn get_flashcards_for_deck(deck_id: i64, conn: &Connection) -> Result<Vec<StoredCard>> {
    let mut stmt = conn.prepare(
        "SELECT id, deck_id, term, definition, position FROM flashcards
         WHERE deck_id = ?1 ORDER BY position ASC",
    )?;

    let cards = stmt
        .query_map(params![deck_id], stored_card_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(cards)
}

fn get_flashcard(card_id: i64, conn: &Connection) -> Result<StoredCard> {
    conn.query_row(
        "SELECT id, deck_id, term, definition, position FROM flashcards WHERE id = ?1",
        params![card_id],
        stored_card_from_row,
    )
    .optional()?
    .ok_or(StoreError::CardNotFound(card_id))
}

/// Deletes a flashcard (its review states go with it) and closes the position gap
pub fn delete_flashcard(card_id: i64, conn: &Connection) -> Result<()> {
    let card = get_flashcard(card_id, conn)?;

    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM flashcards WHERE id = ?1", params![card_id])?;
    tx.execute(
        "UPDATE flashcards SET position = position - 1 WHERE deck_id = ?1 AND position > ?2",
        params![card.deck_id, card.position],
    )?;
    tx.commit()?;

    Ok(())
}

/// Swaps a card with its neighbour. Moving past either end does nothing.
pub fn move_flashcard(card_id: i64, direction: Move, conn: &Connection) -> Result<()> {
    let card = get_flashcard(card_id, conn)?;
    let target = match direction {
        Move::Up => match card.position.checked_sub(1) {
            Some(p) => p,
            None => return Ok(()),
        },
        Move::Down => card.position + 1,
    };

    let neighbour: Option<i64> = conn
        .query_row(
            "SELECT id FROM flashcards WHERE deck_id = ?1 AND position = ?2",
            params![card.deck_id, target],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(neighbour_id) = neighbour {
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE flashcards SET position = ?1 WHERE id = ?2",
            params![card.position, neighbour_id],
        )?;
        tx.execute(
            "UPDATE flashcards SET position = ?1 WHERE id = ?2",
            params![target, card_id],
        )?;
        tx.commit()?;
    }

    Ok(())
}

// ==================== Review states ====================

/// Every card of a deck in position order, with `user_id`'s review state if one exists
pub fn cards_with_state(
    deck_id: i64,
    user_id: &str,
    conn: &Connection,
) -> Result<Vec<(StoredCard, Option<ReviewState>)>> {
    let mut stmt = conn.prepare(
        "SELECT f.id, f.deck_id, f.term, f.definition, f.position,
                r.ease_factor, r.repetition_count, r.interval_days, r.next_review_date
         FROM flashcards f
         LEFT JOIN review_states r ON r.card_id = f.id AND r.user_id = ?2
         WHERE f.deck_id = ?1
         ORDER BY f.position ASC",
    )?;

    let rows = stmt
        .query_map(params![deck_id, user_id], |row| {
            let card = stored_card_from_row(row)?;
            let raw_state = match row.get::<_, Option<f64>>(5)? {
                Some(ease_factor) => Some::<StateParts>((
                    ease_factor,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                )),
                None => None,
            };
            Ok((card, raw_state))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut cards = Vec::with_capacity(rows.len());
    for (card, raw_state) in rows {
        let state = match raw_state {
            Some(parts) => Some(state_from_parts(parts)?),
            None => None,
        };
        cards.push((card, state));
    }
    Ok(cards)
}

type StateParts = (f64, u32, u32, String);

fn state_from_parts(
    (ease_factor, repetition_count, interval_days, date): StateParts,
) -> Result<ReviewState> {
    Ok(ReviewState {
        ease_factor,
        repetition_count,
        interval_days,
        next_review_date: parse_date(&date)?,
    })
}

pub fn get_review_state(user_id: &str, card_id: i64, conn: &Connection) -> Result<Option<ReviewState>> {
    let row: Option<StateParts> = conn
        .query_row(
            "SELECT ease_factor, repetition_count, interval_days, next_review_date
             FROM review_states WHERE user_id = ?1 AND card_id = ?2",
            params![user_id, card_id],
            |row| {
                Ok((
                    row.get::<_, f64>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    row.map(state_from_parts).transpose()
}

/// Inserts or overwrites the review state of a card for one user
pub fn upsert_review_state(
    user_id: &str,
    card_id: i64,
    state: &ReviewState,
    conn: &Connection,
) -> Result<()> {
    let written = conn.execute(
        "INSERT INTO review_states
            (user_id, card_id, ease_factor, repetition_count, interval_days, next_review_date)
         SELECT ?1, ?2, ?3, ?4, ?5, ?6 WHERE EXISTS (SELECT 1 FROM flashcards WHERE id = ?2)
         ON CONFLICT(user_id, card_id) DO UPDATE SET
            ease_factor = excluded.ease_factor,
            repetition_count = excluded.repetition_count,
            interval_days = excluded.interval_days,
            next_review_date = excluded.next_review_date",
        params![
            user_id,
            card_id,
            state.ease_factor,
            state.repetition_count,
            state.interval_days,
            format_date(state.next_review_date),
        ],
    )?;

    if written == 0 {
        return Err(StoreError::CardNotFound(card_id));
    }
    Ok(())
}

pub fn delete_review_state(user_id: &str, card_id: i64, conn: &Connection) -> Result<()> {
    conn.execute(
        "DELETE FROM review_states WHERE user_id = ?1 AND card_id = ?2",
        params![user_id, card_id],
    )?;
    Ok(())
}
