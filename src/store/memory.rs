use super::{Result, ReviewStore, StoreError};
use crate::models::ReviewState;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process review store, mostly for tests.
#[derive(Default)]
pub struct MemoryStore {
    states: Mutex<HashMap<(String, i64), ReviewState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        let states = self.states.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(states.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl ReviewStore for MemoryStore {
    fn get(&self, user_id: &str, card_id: i64) -> Result<Option<ReviewState>> {
        let states = self.states.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(states.get(&(user_id.to_string(), card_id)).cloned())
    }

    fn put(&self, user_id: &str, card_id: i64, state: &ReviewState) -> Result<()> {
        let mut states = self.states.lock().map_err(|_| StoreError::Poisoned)?;
        states.insert((user_id.to_string(), card_id), state.clone());
        Ok(())
    }

    fn remove(&self, user_id: &str, card_id: i64) -> Result<()> {
        let mut states = self.states.lock().map_err(|_| StoreError::Poisoned)?;
        states.remove(&(user_id.to_string(), card_id));
        Ok(())
    }
}
