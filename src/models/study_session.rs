//! Study session management for spaced repetition practice.
//! Handles multi-round flashcard review with SM-2 scheduling; every grade is
//! written through a [`ReviewStore`] before the session moves on.

use super::sm2::{self, Rating, ScheduleError};
use super::{ReviewState, SessionCard, StoredCard};
use crate::store::{ReviewStore, StoreError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("failed to save progress: {0}")]
    Store(#[from] StoreError),

    #[error("no card is being studied")]
    NoCurrentCard,

    #[error("reveal the answer before rating the card")]
    NotRevealed,
}

/// Which cards of a deck go into a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueMode {
    /// Only cards whose review date has arrived
    #[default]
    Due,
    /// Every card in the deck
    All,
}

/// Manages a study session with multiple rounds.
/// Cards graded as a lapse (quality < 3) are repeated in the next round.
pub struct StudySession {
    pub deck_title: String,
    pub today: NaiveDate,
    all_cards: Vec<SessionCard>,
    queue: Vec<usize>,
    current_round_cards: Vec<usize>,
    current_index: usize,
    show_definition: bool,
    round_number: usize,
    studied_count: usize,
}

impl StudySession {
    /// Builds the queue: never-reviewed cards first, then the longest overdue,
    /// ties broken by position in the deck.
    pub fn new(
        deck_title: String,
        cards: Vec<(StoredCard, Option<ReviewState>)>,
        mode: QueueMode,
        today: NaiveDate,
    ) -> Self {
        let mut all_cards: Vec<SessionCard> = cards
            .into_iter()
            .filter(|(_, state)| mode == QueueMode::All || sm2::is_due(state.as_ref(), today))
            .map(|(card, state)| SessionCard::new(card, state))
            .collect();

        all_cards.sort_by_key(|c| {
            (
                c.state.as_ref().map(|s| s.next_review_date),
                c.card.position,
            )
        });

        let queue: Vec<usize> = (0..all_cards.len()).collect();

        Self {
            deck_title,
            today,
            all_cards,
            current_round_cards: queue.clone(),
            queue,
            current_index: 0,
            show_definition: false,
            round_number: 1,
            studied_count: 0,
        }
    }

    /// The card being studied; `None` once the session is complete.
    pub fn current_card(&self) -> Option<&SessionCard> {
        if self.is_completed() {
            return None;
        }
        self.current_round_cards
            .get(self.current_index)
            .and_then(|&idx| self.all_cards.get(idx))
    }

    pub fn is_definition_shown(&self) -> bool {
        self.show_definition
    }

    pub fn toggle_definition(&mut self) {
        self.show_definition = !self.show_definition;
    }

    pub fn reveal(&mut self) {
        self.show_definition = true;
    }

    /// Intervals each rating would give the current card.
    pub fn preview_intervals(&self) -> Option<[u32; 4]> {
        self.current_card()
            .map(|card| sm2::preview_intervals(card.state.as_ref(), self.today))
    }

    pub fn rate<S: ReviewStore + ?Sized>(
        &mut self,
        rating: Rating,
        store: &S,
        user_id: &str,
    ) -> Result<ReviewState, SessionError> {
        self.grade(rating.quality(), store, user_id)
    }

    /// Grades the current card: reads its state from the store, computes the
    /// next one, writes it back and moves to the next card. Nothing changes
    /// if any step fails.
    pub fn grade<S: ReviewStore + ?Sized>(
        &mut self,
        quality: i32,
        store: &S,
        user_id: &str,
    ) -> Result<ReviewState, SessionError> {
        if self.is_completed() {
            return Err(SessionError::NoCurrentCard);
        }
        if !self.show_definition {
            return Err(SessionError::NotRevealed);
        }
        let actual_idx = *self
            .current_round_cards
            .get(self.current_index)
            .ok_or(SessionError::NoCurrentCard)?;
        let card_id = self.all_cards[actual_idx].id();

        let prior = store.get(user_id, card_id)?;
        let next = sm2::compute_next_review(quality, prior.as_ref(), self.today)?;
        store.put(user_id, card_id, &next)?;

        let card = &mut self.all_cards[actual_idx];
        card.state = Some(next.clone());
        card.last_quality = Some(quality);
        self.studied_count += 1;

        self.next_card();
        Ok(next)
    }

    fn next_card(&mut self) {
        if self.current_index + 1 < self.current_round_cards.len() {
            self.current_index += 1;
            self.show_definition = false;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the cards that lapsed in this one.
    /// If none did, the session is complete.
    fn start_next_round(&mut self) {
        let failed_indices: Vec<usize> = self
            .current_round_cards
            .iter()
            .copied()
            .filter(|&idx| !self.all_cards[idx].is_learned())
            .collect();

        if failed_indices.is_empty() {
            return;
        }

        for &idx in &failed_indices {
            self.all_cards[idx].last_quality = None;
        }
        self.current_round_cards = failed_indices;
        self.current_index = 0;
        self.show_definition = false;
        self.round_number += 1;
    }

    /// "Study again": every queued card, first round, counters cleared.
    pub fn restart(&mut self) {
        for card in &mut self.all_cards {
            card.last_quality = None;
        }
        self.current_round_cards = self.queue.clone();
        self.current_index = 0;
        self.show_definition = false;
        self.round_number = 1;
        self.studied_count = 0;
    }

    pub fn learned_count(&self) -> usize {
        self.current_round_cards
            .iter()
            .filter(|&&idx| self.all_cards[idx].is_learned())
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round_cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.learned_count()
    }

    /// Number of grades given since the session (re)started
    pub fn studied_count(&self) -> usize {
        self.studied_count
    }

    pub fn round_number(&self) -> usize {
        self.round_number
    }

    /// Fraction of the current round reached, 1.0 once complete
    pub fn progress(&self) -> f32 {
        if self.is_completed() {
            1.0
        } else {
            (self.current_index + 1) as f32 / self.total_count() as f32
        }
    }

    /// True when the queue was empty or every card of the last round passed.
    pub fn is_completed(&self) -> bool {
        self.learned_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} cards", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Review): {} cards to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}
