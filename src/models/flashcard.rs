//! Flashcard is a pair <term, definition>. Only text is used in terms and definitions
use crate::store::StoreError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub term: String,
    #[serde(default)]
    pub definition: String,
}

impl Flashcard {
    /// Trims both sides. A card needs at least one non-empty side.
    pub fn new(term: &str, definition: &str) -> Result<Self, StoreError> {
        let term = term.trim();
        let definition = definition.trim();
        if term.is_empty() && definition.is_empty() {
            return Err(StoreError::InvalidInput(
                "a card needs a term or a definition".to_string(),
            ));
        }
        Ok(Self {
            term: term.to_string(),
            definition: definition.to_string(),
        })
    }
}

/// A flashcard as persisted: its row id, owning deck and position in the deck.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredCard {
    pub id: i64,
    pub deck_id: i64,
    pub position: u32,
    pub flashcard: Flashcard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashcard_creation_trims() {
        let card = Flashcard::new("  hello ", "cześć\n").unwrap();

        assert_eq!(card.term, "hello");
        assert_eq!(card.definition, "cześć");
    }

    #[test]
    fn test_one_side_is_enough() {
        assert!(Flashcard::new("", "only a definition").is_ok());
        assert!(Flashcard::new("only a term", "   ").is_ok());
    }

    #[test]
    fn test_empty_card_rejected() {
        let result = Flashcard::new("  ", "");
        assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    }
}
