//! Spaced repetition state kept per (user, card) pair.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ease factor of a card that has never been reviewed.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Lowest ease factor the scheduler will ever produce.
pub const MIN_EASE_FACTOR: f64 = 1.3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub ease_factor: f64,
    /// Consecutive successful reviews since the last lapse.
    pub repetition_count: u32,
    pub interval_days: u32,
    pub next_review_date: NaiveDate,
}

impl ReviewState {
    /// State assumed for a card without history. `interval_days` is 0 and the
    /// card is due on `today`.
    pub fn new_card(today: NaiveDate) -> Self {
        Self {
            ease_factor: DEFAULT_EASE_FACTOR,
            repetition_count: 0,
            interval_days: 0,
            next_review_date: today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_card_defaults() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let state = ReviewState::new_card(today);

        assert_eq!(state.ease_factor, 2.5);
        assert_eq!(state.repetition_count, 0);
        assert_eq!(state.interval_days, 0);
        assert_eq!(state.next_review_date, today);
    }

    #[test]
    fn test_date_serializes_without_time() {
        let state = ReviewState::new_card(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"2024-03-09\""));
    }
}
