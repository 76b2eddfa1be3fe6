//! Trigram language models over sparse n-gram counts.
//!
//! This module provides:
//! - The count aggregator (`NGramCounts`) and its rows (`State`)
//! - The add-k estimator (`AddKTrigramLm`)
//! - The Kneser-Ney estimator (`KneserNeyTrigramLm`)
//! - The estimator capability (`NextWordEstimator`) shared by both

/// Additive smoothing over trigram counts.
pub mod add_k;

/// Preceding-word tuples used as count table keys.
pub mod context;

/// Single-pass aggregation of unigram, bigram and trigram statistics.
///
/// Supports binary caching of the aggregated tables with `postcard`.
pub mod counts;

/// Next-word estimator trait and runtime dispatch over model kinds.
pub mod estimator;

/// Interpolated Kneser-Ney smoothing with fertility-based unigrams.
pub mod kneser_ney;

/// One counts-table row: a context and its next-word occurrences.
pub mod state;

/// Distinct words observed during aggregation.
pub mod vocabulary;
