//! Property-based testing generators.
//!
//! This module provides proptest strategies for engine inputs.

use parlons_core::Phase;
use proptest::prelude::*;

/// Free text mixing ASCII, French diacritics, digits and punctuation.
pub fn french_text() -> impl Strategy<Value = String> {
    "[a-zA-Zéèêëàâäîïôöûüùç' ,.!?0-9-]{0,40}"
}

/// Text that is non-empty after normalization.
pub fn spoken_phrase() -> impl Strategy<Value = String> {
    "[a-zéèàç]{1,10}( [a-zéèàç]{1,10}){0,4}"
}

/// Any score in 0-100.
pub fn score() -> impl Strategy<Value = f64> {
    0.0..=100.0f64
}

/// Score that advances a phase.
pub fn excellent_score() -> impl Strategy<Value = f64> {
    90.0..=100.0f64
}

/// Score that retests after the immediate tier.
pub fn poor_score() -> impl Strategy<Value = f64> {
    0.0..70.0f64
}

/// Any phase.
pub fn phase() -> impl Strategy<Value = Phase> {
    prop::sample::select(Phase::ALL.to_vec())
}

/// Sequence of scores for one item.
pub fn score_sequence(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(score(), 0..max_len)
}
