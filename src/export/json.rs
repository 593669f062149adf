//! JSON import/export module for flashcard decks.
//! Provides functionality to save and load Deck structures to/from JSON files.
//! Review progress is never exported; an imported deck starts fresh.

use crate::database::db;
use crate::models::{Deck, Flashcard, validate_title};
use crate::store::StoreError;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Exports a deck to a JSON file at the specified path.
pub fn export_json_to_path(deck: &Deck, path: &Path) -> Result<(), ExportError> {
    let json_string = serde_json::to_string_pretty(deck)?;
    fs::write(path, json_string)?;
    log::info!("deck '{}' exported to {}", deck.title, path.display());
    Ok(())
}

/// Reads a deck from a JSON file. The title is validated and cards with
/// neither a term nor a definition are dropped.
pub fn import_json(path: &Path) -> Result<Deck, ExportError> {
    let contents = fs::read_to_string(path)?;
    let deck: Deck = serde_json::from_str(&contents)?;

    let flashcards = deck
        .flashcards
        .iter()
        .filter_map(|card| Flashcard::new(&card.term, &card.definition).ok())
        .collect();

    Ok(Deck {
        title: validate_title(&deck.title)?,
        description: deck.description,
        flashcards,
    })
}

/// Imports a deck file into the database and returns the new deck id.
/// Fails without writing anything if a deck with the same title exists.
pub fn import_json_into(path: &Path, conn: &Connection) -> Result<(i64, Deck), ExportError> {
    let deck = import_json(path)?;

    let tx = conn.unchecked_transaction().map_err(StoreError::from)?;
    let deck_id = db::new_deck(&deck.title, deck.description.as_deref(), &tx)?;
    for flashcard in &deck.flashcards {
        db::add_flashcard(deck_id, flashcard, &tx)?;
    }
    tx.commit().map_err(StoreError::from)?;

    log::info!(
        "deck '{}' imported from {} with {} cards",
        deck.title,
        path.display(),
        deck.flashcards.len()
    );
    Ok((deck_id, deck))
}
