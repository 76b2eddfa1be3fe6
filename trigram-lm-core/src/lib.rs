//! Trigram language modelling over sparse n-gram statistics.
//!
//! This crate provides:
//! - Single-pass aggregation of unigram, bigram and trigram counts
//! - Add-k and Kneser-Ney smoothed next-word estimators
//! - Sequence scoring (log probability, perplexity) and sampling
//! - Validated live hyperparameters and count diagnostics
//!
//! Tokenisation, vocabulary construction and sentence boundary insertion
//! belong to the caller: the models consume an ordered stream of tokens.

/// Smoothing hyperparameters and their validation.
pub mod config;

/// Error taxonomy shared by every module.
pub mod error;

/// Corpus reading and path helpers.
pub mod io;

/// Count tables and the two trigram estimators.
pub mod model;

/// Next-word distributions, sampling and sentence generation.
pub mod sampling;

/// Log probability of token sequences.
pub mod scoring;

/// Diagnostics over the count tables.
pub mod stats;

pub use config::{AddKParams, KneserNeyParams, LiveParams};
pub use error::{LmError, Result};
pub use model::add_k::AddKTrigramLm;
pub use model::context::Context;
pub use model::counts::{CountOrders, NGramCounts};
pub use model::estimator::{LanguageModel, ModelKind, NextWordEstimator};
pub use model::kneser_ney::KneserNeyTrigramLm;
pub use model::vocabulary::Vocabulary;
