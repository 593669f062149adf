//! Wrapper for flashcards that tracks progress inside one study session.
use super::{ReviewState, StoredCard};

#[derive(Clone, Debug)]
pub struct SessionCard {
    pub card: StoredCard,
    /// Review state as of the last write through the store
    pub state: Option<ReviewState>,
    /// Quality given in the current round, if any
    pub last_quality: Option<i32>,
}

impl SessionCard {
    pub fn new(card: StoredCard, state: Option<ReviewState>) -> Self {
        Self {
            card,
            state,
            last_quality: None,
        }
    }

    pub fn id(&self) -> i64 {
        self.card.id
    }

    /// Passed in this round (quality 3 or better).
    pub fn is_learned(&self) -> bool {
        self.last_quality.is_some_and(|q| q >= 3)
    }
}
