pub mod config;
pub mod database;
pub mod export;
pub mod models;
pub mod store;

pub use config::Config;
pub use database::Database;
pub use models::{
    Deck, Flashcard, QueueMode, Rating, ReviewState, ScheduleError, StudySession,
    compute_next_review, is_due,
};
pub use store::{MemoryStore, ReviewStore, StoreError};
