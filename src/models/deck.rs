//! Deck is a titled set of flashcards
use super::Flashcard;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};

pub const MAX_TITLE_CHARS: usize = 120;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
}

impl Default for Deck {
    fn default() -> Self {
        Self {
            title: "My Deck".to_string(),
            description: None,
            flashcards: Vec::new(),
        }
    }
}

/// Returns the trimmed title, or an error if it is empty or too long.
pub fn validate_title(title: &str) -> Result<String, StoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(StoreError::InvalidInput("please enter a title".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(StoreError::InvalidInput(format!(
            "title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(title.to_string())
}

/// Deck list row: counts are computed for one user on one day.
#[derive(Clone, Debug, PartialEq)]
pub struct DeckSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub card_count: usize,
    pub due_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  Biology ").unwrap(), "Biology");
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_CHARS)).is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_CHARS + 1)).is_err());
    }

    #[test]
    fn test_description_omitted_from_json_when_absent() {
        let json = serde_json::to_string(&Deck::default()).unwrap();
        assert!(!json.contains("description"));
    }
}
