pub mod db;

use crate::models::ReviewState;
use crate::store::{Result, ReviewStore};
use rusqlite::Connection;
use std::path::Path;

/// SQLite-backed [`ReviewStore`]. The connection is also handed out for the
/// deck and card operations in [`db`].
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: db::init_database(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: db::init_in_memory()?,
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl ReviewStore for Database {
    fn get(&self, user_id: &str, card_id: i64) -> Result<Option<ReviewState>> {
        db::get_review_state(user_id, card_id, &self.conn)
    }

    fn put(&self, user_id: &str, card_id: i64, state: &ReviewState) -> Result<()> {
        db::upsert_review_state(user_id, card_id, state, &self.conn)
    }

    fn remove(&self, user_id: &str, card_id: i64) -> Result<()> {
        db::delete_review_state(user_id, card_id, &self.conn)
    }
}
