use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use study_cards::{ReviewState, ScheduleError, compute_next_review};

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    (0u64..36_500).prop_map(move |offset| epoch + Days::new(offset))
}

fn arb_state() -> impl Strategy<Value = ReviewState> {
    (1.3f64..4.0, 0u32..50, 1u32..2_000, arb_date()).prop_map(
        |(ease_factor, repetition_count, interval_days, next_review_date)| ReviewState {
            ease_factor,
            repetition_count,
            interval_days,
            next_review_date,
        },
    )
}

proptest! {
    #[test]
    fn ease_factor_never_below_floor(
        quality in 0i32..=5,
        prior in proptest::option::of(arb_state()),
        corrupted_ef in 0.0f64..1.3,
        corrupt in any::<bool>(),
        today in arb_date(),
    ) {
        let prior = prior.map(|mut s| {
            if corrupt {
                s.ease_factor = corrupted_ef;
            }
            s
        });
        let next = compute_next_review(quality, prior.as_ref(), today).unwrap();
        prop_assert!(next.ease_factor >= 1.3);
    }

    #[test]
    fn lapse_resets_streak(quality in 0i32..3, prior in arb_state(), today in arb_date()) {
        let next = compute_next_review(quality, Some(&prior), today).unwrap();
        prop_assert_eq!(next.repetition_count, 0);
        prop_assert_eq!(next.interval_days, 1);
    }

    #[test]
    fn success_interval_follows_streak(quality in 3i32..=5, mut prior in arb_state(), today in arb_date()) {
        let next = compute_next_review(quality, Some(&prior), today).unwrap();
        let expected = match prior.repetition_count {
            0 => 1,
            1 => 6,
            _ => (prior.interval_days as f64 * prior.ease_factor).round() as u32,
        };
        prop_assert_eq!(next.interval_days, expected);
        prop_assert_eq!(next.repetition_count, prior.repetition_count + 1);

        prior.repetition_count = 0;
        let first = compute_next_review(quality, Some(&prior), today).unwrap();
        prop_assert_eq!(first.interval_days, 1);
    }

    #[test]
    fn next_date_is_today_plus_interval(
        quality in 0i32..=5,
        prior in proptest::option::of(arb_state()),
        today in arb_date(),
    ) {
        let next = compute_next_review(quality, prior.as_ref(), today).unwrap();
        prop_assert_eq!(next.next_review_date, today + Days::new(next.interval_days as u64));
        prop_assert!(next.interval_days >= 1);
    }

    #[test]
    fn same_inputs_same_output(
        quality in 0i32..=5,
        prior in proptest::option::of(arb_state()),
        today in arb_date(),
    ) {
        let a = compute_next_review(quality, prior.as_ref(), today).unwrap();
        let b = compute_next_review(quality, prior.as_ref(), today).unwrap();
        prop_assert_eq!(a.ease_factor.to_bits(), b.ease_factor.to_bits());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn out_of_range_quality_rejected(
        quality in prop_oneof![i32::MIN..0, 6..i32::MAX],
        prior in proptest::option::of(arb_state()),
        today in arb_date(),
    ) {
        prop_assert_eq!(
            compute_next_review(quality, prior.as_ref(), today),
            Err(ScheduleError::InvalidArgument(quality))
        );
    }
}

#[test]
fn spaced_repetition_walkthrough() {
    let day = |d: u32| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();

    let first = compute_next_review(4, None, day(1)).unwrap();
    assert_eq!((first.repetition_count, first.interval_days), (1, 1));
    assert_eq!(first.next_review_date, day(2));

    let second = compute_next_review(4, Some(&first), day(2)).unwrap();
    assert_eq!((second.repetition_count, second.interval_days), (2, 6));
    assert_eq!(second.next_review_date, day(8));

    let third = compute_next_review(5, Some(&second), day(8)).unwrap();
    // 6 * 2.54 = 15.24
    assert_eq!((third.repetition_count, third.interval_days), (3, 15));
    assert_eq!(third.next_review_date, day(23));

    let lapse = compute_next_review(1, Some(&third), day(23)).unwrap();
    assert_eq!((lapse.repetition_count, lapse.interval_days), (0, 1));
    assert_eq!(lapse.next_review_date, day(24));
    assert!((lapse.ease_factor - 2.42).abs() < 1e-9);
}
