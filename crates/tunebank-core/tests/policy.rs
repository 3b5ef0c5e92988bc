// tunebank-core/tests/policy.rs
// ============================================================================
// Module: Validity and Ranking Policy Tests
// Description: Validate the sentinel filter and mean-run-time ordering.
// Purpose: Pin the literal sentinel-inclusive ranking arithmetic.
// Dependencies: tunebank-core, proptest
// ============================================================================

//! ## Overview
//! Pins the validity predicate, the sentinel-inclusive unweighted mean, and
//! the stable ascending top-k ordering, including the literal mean a record
//! with a mixed sentinel/real sample sequence receives.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::float_cmp,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use proptest::prelude::*;
use tunebank_core::MAX_MEAN_TIME;
use tunebank_core::core::policy::is_valid;
use tunebank_core::core::policy::mean_run_secs;
use tunebank_core::core::policy::rank_top_k;

// ============================================================================
// SECTION: Validity Tests
// ============================================================================

#[test]
fn absent_or_empty_samples_are_invalid() {
    assert!(!is_valid(None));
    assert!(!is_valid(Some(&[])));
}

#[test]
fn all_sentinel_samples_are_invalid() {
    assert!(!is_valid(Some(&[MAX_MEAN_TIME])));
    assert!(!is_valid(Some(&[MAX_MEAN_TIME, MAX_MEAN_TIME])));
}

#[test]
fn one_real_sample_makes_a_record_valid() {
    assert!(is_valid(Some(&[MAX_MEAN_TIME, 2.5])));
    assert!(is_valid(Some(&[0.25])));
}

// ============================================================================
// SECTION: Mean Tests
// ============================================================================

#[test]
fn mean_is_unweighted_over_all_samples() {
    assert_eq!(mean_run_secs(&[1.0, 2.0, 3.0]), 2.0);
    assert_eq!(mean_run_secs(&[4.5]), 4.5);
}

#[test]
fn mean_includes_sentinel_samples_literally() {
    // The sentinel is averaged in literally, skewing the score.
    assert_eq!(mean_run_secs(&[MAX_MEAN_TIME, 2.5]), (MAX_MEAN_TIME + 2.5) / 2.0);
}

// ============================================================================
// SECTION: Ranking Tests
// ============================================================================

#[test]
fn rank_orders_ascending_and_truncates() {
    let items = vec![
        ("slow", Some(vec![3.0])),
        ("fast", Some(vec![1.0])),
        ("mid", Some(vec![2.0])),
    ];
    assert_eq!(rank_top_k(items.clone(), 2), vec!["fast", "mid"]);
    assert_eq!(rank_top_k(items, 10), vec!["fast", "mid", "slow"]);
}

#[test]
fn rank_drops_invalid_items_entirely() {
    let items = vec![
        ("unmeasured", None),
        ("stub", Some(vec![MAX_MEAN_TIME, MAX_MEAN_TIME])),
        ("real", Some(vec![MAX_MEAN_TIME, 2.5])),
        ("empty", Some(vec![])),
    ];
    assert_eq!(rank_top_k(items, 10), vec!["real"]);
}

#[test]
fn rank_of_no_valid_items_is_empty() {
    let items: Vec<(&str, Option<Vec<f64>>)> = vec![("unmeasured", None)];
    assert!(rank_top_k(items, 5).is_empty());
    assert!(rank_top_k(Vec::<(&str, Option<Vec<f64>>)>::new(), 5).is_empty());
}

#[test]
fn ties_keep_original_fetch_order() {
    let items = vec![
        ("first", Some(vec![1.0, 3.0])),
        ("second", Some(vec![2.0, 2.0])),
        ("third", Some(vec![2.0])),
    ];
    // All three means are 2.0; the sort is stable.
    assert_eq!(rank_top_k(items, 3), vec!["first", "second", "third"]);
}

proptest! {
    #[test]
    fn ranked_means_are_ascending_and_bounded(
        sample_sets in proptest::collection::vec(
            proptest::collection::vec(0.001_f64..100.0, 1..6),
            0..20,
        ),
        top_k in 0_usize..25,
    ) {
        let items: Vec<(Vec<f64>, Option<Vec<f64>>)> = sample_sets
            .iter()
            .map(|samples| (samples.clone(), Some(samples.clone())))
            .collect();
        let ranked = rank_top_k(items, top_k);
        prop_assert!(ranked.len() <= top_k);
        prop_assert!(ranked.len() <= sample_sets.len());
        let means: Vec<f64> = ranked.iter().map(|samples| mean_run_secs(samples)).collect();
        prop_assert!(means.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
