//! Persistence port for review states.
//!
//! The scheduler never touches storage. Callers read a card's state through a
//! [`ReviewStore`], compute the next one and write it back. SQLite
//! ([`crate::database::Database`]) and in-memory ([`MemoryStore`]) backends
//! are provided.

pub mod memory;

pub use memory::MemoryStore;

use crate::models::ReviewState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("deck not found: {0}")]
    DeckNotFound(i64),

    #[error("flashcard not found: {0}")]
    CardNotFound(i64),

    #[error("deck '{0}' already exists")]
    DuplicateDeck(String),

    #[error("stored date is not YYYY-MM-DD: {0}")]
    CorruptDate(String),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Review states keyed by user and card.
///
/// `put` is an upsert. Concurrent writers to the same key are last-write-wins.
pub trait ReviewStore {
    fn get(&self, user_id: &str, card_id: i64) -> Result<Option<ReviewState>>;

    fn put(&self, user_id: &str, card_id: i64, state: &ReviewState) -> Result<()>;

    fn remove(&self, user_id: &str, card_id: i64) -> Result<()>;
}
