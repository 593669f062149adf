//! SM-2 (SuperMemo 2) spaced repetition scheduling.
//!
//! Quality grades run from 0 to 5:
//! - 0-2: lapse. Repetitions reset to 0 and the card comes back the next day.
//! - 3-5: successful recall. Intervals grow 1 day → 6 days → previous interval × EF.
//! - The easiness factor (EF) is adjusted after every review, lapses included,
//!   by `0.1 - (5 - q) * 0.08` and never drops below 1.3.
//!
//! Everything here is a pure function of its arguments. `today` is passed in
//! rather than read from a clock.

use super::ReviewState;
use super::review_state::{DEFAULT_EASE_FACTOR, MIN_EASE_FACTOR};
use chrono::{Days, NaiveDate};
use thiserror::Error;

pub const MIN_QUALITY: i32 = 0;
pub const MAX_QUALITY: i32 = 5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid argument: quality {0} is outside 0..=5")]
    InvalidArgument(i32),
}

/// The four answer buttons of a study session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// SM-2 quality grade this rating stands for.
    pub fn quality(self) -> i32 {
        match self {
            Rating::Again => 0,
            Rating::Hard => 3,
            Rating::Good => 4,
            Rating::Easy => 5,
        }
    }

    /// Keyboard shortcut: '1' = Again ... '4' = Easy.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '1' => Some(Rating::Again),
            '2' => Some(Rating::Hard),
            '3' => Some(Rating::Good),
            '4' => Some(Rating::Easy),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        }
    }

    pub fn is_lapse(self) -> bool {
        self.quality() < 3
    }
}

/// Computes the state a card moves to after being graded `quality` on `today`.
///
/// `prior` is `None` for a card that has never been reviewed. A prior with an
/// ease factor under the floor is read as given; only the output is clamped.
///
/// The interval of a reviewed card is at least 1 day, so a corrupted prior
/// (zero interval, negative or NaN ease factor) whose product rounds to 0 is
/// scheduled for tomorrow. Intervals are also capped at the last date
/// `NaiveDate` can represent. Either way `next_review_date` is exactly
/// `today + interval_days`.
pub fn compute_next_review(
    quality: i32,
    prior: Option<&ReviewState>,
    today: NaiveDate,
) -> Result<ReviewState, ScheduleError> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(ScheduleError::InvalidArgument(quality));
    }

    let (ef, rep, interval) = match prior {
        Some(state) => (
            state.ease_factor,
            state.repetition_count,
            state.interval_days,
        ),
        None => (DEFAULT_EASE_FACTOR, 0, 0),
    };

    let (new_interval, new_rep) = if quality < 3 {
        (1, 0)
    } else {
        let new_int = match rep {
            0 => 1,
            1 => 6,
            // `as` saturates, so a corrupted negative EF lands on 0 and is lifted below
            _ => (interval as f64 * ef).round() as u32,
        };
        (new_int, rep.saturating_add(1))
    };

    let q = quality as f64;
    let new_ef = (ef + (0.1 - (5.0 - q) * 0.08)).max(MIN_EASE_FACTOR);

    // A reviewed card is never scheduled for the same day, nor past the calendar's end
    let new_interval = new_interval.max(1).min(days_left_in_calendar(today));
    let next_review_date = today + Days::new(new_interval as u64);

    log::debug!(
        "sm2: q={} ef {:.2}->{:.2} rep {}->{} interval {}->{} next {}",
        quality,
        ef,
        new_ef,
        rep,
        new_rep,
        interval,
        new_interval,
        next_review_date
    );

    Ok(ReviewState {
        ease_factor: new_ef,
        repetition_count: new_rep,
        interval_days: new_interval,
        next_review_date,
    })
}

fn days_left_in_calendar(today: NaiveDate) -> u32 {
    let left = NaiveDate::MAX.signed_duration_since(today).num_days();
    u32::try_from(left).unwrap_or(u32::MAX)
}

/// A card is due once its review date has arrived. Cards without state always are.
pub fn is_due(state: Option<&ReviewState>, today: NaiveDate) -> bool {
    state.is_none_or(|s| s.next_review_date <= today)
}

/// Intervals that Again, Hard, Good and Easy would produce, in that order.
pub fn preview_intervals(prior: Option<&ReviewState>, today: NaiveDate) -> [u32; 4] {
    Rating::ALL.map(|rating| {
        compute_next_review(rating.quality(), prior, today)
            .map(|s| s.interval_days)
            .unwrap_or(1)
    })
}

/// Compact label for an interval, e.g. "6d", "2w", "3mo".
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state(ef: f64, rep: u32, interval: u32, next: NaiveDate) -> ReviewState {
        ReviewState {
            ease_factor: ef,
            repetition_count: rep,
            interval_days: interval,
            next_review_date: next,
        }
    }

    #[test]
    fn test_first_review() {
        let next = compute_next_review(4, None, date(2024, 1, 1)).unwrap();

        assert_eq!(next.interval_days, 1);
        assert_eq!(next.repetition_count, 1);
        assert_eq!(next.next_review_date, date(2024, 1, 2));
        // 2.5 + (0.1 - 0.08)
        assert!((next.ease_factor - 2.52).abs() < 1e-9);
    }

    #[test]
    fn test_second_review() {
        let prior = state(2.6, 1, 1, date(2024, 1, 2));
        let next = compute_next_review(4, Some(&prior), date(2024, 1, 2)).unwrap();

        assert_eq!(next.interval_days, 6);
        assert_eq!(next.repetition_count, 2);
        assert_eq!(next.next_review_date, date(2024, 1, 8));
        assert!((next.ease_factor - 2.62).abs() < 1e-9);
    }

    #[test]
    fn test_third_review_multiplies_by_prior_ef() {
        let prior = state(2.7, 2, 6, date(2024, 1, 8));
        let next = compute_next_review(5, Some(&prior), date(2024, 1, 8)).unwrap();

        assert_eq!(next.interval_days, 16);
        assert_eq!(next.repetition_count, 3);
        assert_eq!(next.next_review_date, date(2024, 1, 24));
        assert!((next.ease_factor - 2.8).abs() < 1e-9);
    }

    #[test]
    fn test_lapse_after_streak() {
        let prior = state(2.8, 3, 16, date(2024, 1, 24));
        let next = compute_next_review(1, Some(&prior), date(2024, 1, 24)).unwrap();

        assert_eq!(next.interval_days, 1);
        assert_eq!(next.repetition_count, 0);
        assert_eq!(next.next_review_date, date(2024, 1, 25));
        assert!((next.ease_factor - 2.58).abs() < 1e-9);
    }

    #[test]
    fn test_quality_three_lowers_ef() {
        let next = compute_next_review(3, None, date(2024, 1, 1)).unwrap();
        assert!((next.ease_factor - 2.44).abs() < 1e-9);
    }

    #[test]
    fn test_ef_floor() {
        let prior = state(1.3, 4, 10, date(2024, 1, 1));
        let next = compute_next_review(0, Some(&prior), date(2024, 1, 1)).unwrap();
        assert_eq!(next.ease_factor, 1.3);
    }

    #[test]
    fn test_corrupted_ef_is_read_then_floored() {
        let prior = state(1.0, 3, 10, date(2024, 1, 1));
        let next = compute_next_review(5, Some(&prior), date(2024, 1, 1)).unwrap();

        // interval uses the EF as given
        assert_eq!(next.interval_days, 10);
        assert_eq!(next.ease_factor, 1.3);
    }

    #[test]
    fn test_zero_interval_with_history_still_schedules_a_day() {
        let prior = state(2.5, 3, 0, date(2024, 1, 1));
        let next = compute_next_review(4, Some(&prior), date(2024, 1, 1)).unwrap();
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.next_review_date, date(2024, 1, 2));
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        // 5 * 2.5 = 12.5 -> 13
        let prior = state(2.5, 2, 5, date(2024, 1, 1));
        let next = compute_next_review(4, Some(&prior), date(2024, 1, 1)).unwrap();
        assert_eq!(next.interval_days, 13);
    }

    #[test]
    fn test_out_of_range_quality() {
        let today = date(2024, 1, 1);
        assert_eq!(
            compute_next_review(6, None, today),
            Err(ScheduleError::InvalidArgument(6))
        );
        assert_eq!(
            compute_next_review(-1, None, today),
            Err(ScheduleError::InvalidArgument(-1))
        );
    }

    #[test]
    fn test_interval_capped_at_calendar_end() {
        let today = NaiveDate::MAX - Days::new(3);
        let prior = state(2.5, 5, 1000, today);
        let next = compute_next_review(5, Some(&prior), today).unwrap();

        assert_eq!(next.interval_days, 3);
        assert_eq!(next.next_review_date, NaiveDate::MAX);
    }

    #[test]
    fn test_is_due() {
        let today = date(2024, 1, 10);
        assert!(is_due(None, today));
        assert!(is_due(Some(&state(2.5, 1, 1, date(2024, 1, 10))), today));
        assert!(is_due(Some(&state(2.5, 1, 1, date(2024, 1, 2))), today));
        assert!(!is_due(Some(&state(2.5, 1, 1, date(2024, 1, 11))), today));
    }

    #[test]
    fn test_rating_mapping() {
        assert_eq!(Rating::Again.quality(), 0);
        assert_eq!(Rating::Hard.quality(), 3);
        assert_eq!(Rating::Good.quality(), 4);
        assert_eq!(Rating::Easy.quality(), 5);
        assert_eq!(Rating::from_key('3'), Some(Rating::Good));
        assert_eq!(Rating::from_key('5'), None);
        assert!(Rating::Again.is_lapse());
        assert!(!Rating::Hard.is_lapse());
    }

    #[test]
    fn test_preview_intervals() {
        let today = date(2024, 1, 8);
        assert_eq!(preview_intervals(None, today), [1, 1, 1, 1]);

        let prior = state(2.5, 2, 6, today);
        assert_eq!(preview_intervals(Some(&prior), today), [1, 15, 15, 15]);
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(6), "6d");
        assert_eq!(format_interval(7), "1w");
        assert_eq!(format_interval(16), "2w");
        assert_eq!(format_interval(30), "1mo");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(365), "1y");
        assert_eq!(format_interval(800), "2y");
    }
}
