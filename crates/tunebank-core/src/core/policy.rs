// tunebank-core/src/core/policy.rs
// ============================================================================
// Module: Tunebank Validity and Ranking Policy
// Description: Decide which records are usable and how top-k orders them.
// Purpose: Shared ranking rules for every database backend.
// Dependencies: none
// ============================================================================

//! ## Overview
//! A record is valid for ranking iff it has at least one run-time sample and
//! at least one sample differs from [`MAX_MEAN_TIME`], the sentinel that
//! marks "time could not be measured". Invalid records never appear in top-k
//! output regardless of `k`.
//!
//! The ranking score is the unweighted arithmetic mean over all samples,
//! sentinels included. When some but not all samples are the sentinel it
//! dominates the score; excluding sentinels from the mean would silently
//! reorder top-k results for databases already on disk, so the literal
//! arithmetic stays. Ties keep their original fetch order (the sort is
//! stable and no secondary key is defined).

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sentinel run time in seconds marking an unmeasurable sample.
pub const MAX_MEAN_TIME: f64 = 1e10;

// ============================================================================
// SECTION: Validity
// ============================================================================

/// Returns whether a run-time sample sequence makes a record rankable.
#[must_use]
pub fn is_valid(run_secs: Option<&[f64]>) -> bool {
    match run_secs {
        None => false,
        Some(samples) if samples.is_empty() => false,
        Some(samples) => samples.iter().any(|&sample| sample != MAX_MEAN_TIME),
    }
}

/// Returns the unweighted mean of a non-empty sample sequence.
#[must_use]
pub fn mean_run_secs(run_secs: &[f64]) -> f64 {
    if run_secs.is_empty() {
        return MAX_MEAN_TIME;
    }
    let total: f64 = run_secs.iter().sum();
    total / run_secs.len() as f64
}

// ============================================================================
// SECTION: Ranking
// ============================================================================

/// Filters invalid items, stable-sorts ascending by mean run time, and
/// truncates to `top_k`.
///
/// Each item is paired with its parsed run-time samples so callers can rank
/// raw rows before paying for a full decode.
#[must_use]
pub fn rank_top_k<T>(items: Vec<(T, Option<Vec<f64>>)>, top_k: usize) -> Vec<T> {
    let mut valid: Vec<(T, Vec<f64>)> = items
        .into_iter()
        .filter_map(|(item, run_secs)| match run_secs {
            Some(samples) if is_valid(Some(samples.as_slice())) => Some((item, samples)),
            _ => None,
        })
        .collect();
    valid.sort_by(|left, right| mean_run_secs(&left.1).total_cmp(&mean_run_secs(&right.1)));
    valid.truncate(top_k);
    valid.into_iter().map(|(item, _)| item).collect()
}
