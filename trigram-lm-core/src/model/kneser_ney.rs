use std::sync::Arc;

use super::context::Context;
use super::counts::{CountOrders, NGramCounts};
use super::estimator::NextWordEstimator;
use super::vocabulary::Vocabulary;
use crate::config::{KneserNeyParams, LiveParams};
use crate::error::{LmError, Result};

/// Trigram language model with interpolated Kneser-Ney smoothing.
///
/// The estimate is computed lowest order first:
/// 1. `pw1 = type_fertility(w) / z_tf`, the continuation unigram
/// 2. `pw2 = kn_interp(w, (w_1,), delta, pw1)`
/// 3. `pw3 = kn_interp(w, (w_2, w_1), delta, pw2)`, the returned value
///
/// # Invariants
/// - Built over `CountOrders::Full` tables
/// - `delta` stays in `[0, 1)`, so each row of `kn_interp` sums to 1
#[derive(Clone, Debug, PartialEq)]
pub struct KneserNeyTrigramLm {
	counts: Arc<NGramCounts>,
	params: KneserNeyParams,
}

impl KneserNeyTrigramLm {
	pub const ORDER: usize = 3;

	/// Builds the model from a token stream with the default `delta`.
	pub fn new<I, S>(tokens: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self {
			counts: Arc::new(NGramCounts::build(tokens, CountOrders::Full)),
			params: KneserNeyParams::default(),
		}
	}

	/// Wraps already aggregated counts.
	///
	/// # Errors
	/// Returns `LmError::IncompatibleCounts` if the tables lack unigram and
	/// bigram rows.
	pub fn from_counts(counts: Arc<NGramCounts>) -> Result<Self> {
		if counts.orders() != CountOrders::Full {
			return Err(LmError::IncompatibleCounts {
				expected: CountOrders::Full,
			});
		}
		Ok(Self {
			counts,
			params: KneserNeyParams::default(),
		})
	}

	/// Returns a view over the same counts with other parameters.
	pub fn with_params(&self, params: KneserNeyParams) -> Self {
		Self {
			counts: Arc::clone(&self.counts),
			params,
		}
	}

	pub fn params(&self) -> KneserNeyParams {
		self.params
	}

	pub fn set_params(&mut self, params: KneserNeyParams) {
		self.params = params;
	}

	/// # Errors
	/// Returns an error if `delta` is outside `[0, 1)`.
	pub fn set_delta(&mut self, delta: f64) -> Result<()> {
		self.params = KneserNeyParams::new(delta)?;
		Ok(())
	}

	pub fn counts(&self) -> &Arc<NGramCounts> {
		&self.counts
	}

	/// Continuation unigram estimate: the share of distinct bigram types
	/// ending in `word`. Words never seen after another word get 0.
	///
	/// # Errors
	/// `LmError::DegenerateSmoothing` if the corpus holds no bigram at all.
	pub fn unigram_proba(&self, word: &str) -> Result<f64> {
		let z_tf = self.counts.z_tf();
		if z_tf == 0.0 {
			return Err(LmError::DegenerateSmoothing {
				context: Context::empty(),
			});
		}
		Ok(self.counts.type_fertility(word) as f64 / z_tf)
	}

	/// `max(c(context, word) - delta, 0) / c(context)`, 0 for unseen contexts.
	pub fn discounted_estimate(&self, word: &str, context: &Context, delta: f64) -> f64 {
		let c_ab = self.counts.context_total(context);
		if c_ab == 0 {
			return 0.0;
		}
		let c_abc = self.counts.count(context, word) as f64;
		(c_abc - delta).max(0.0) / c_ab as f64
	}

	/// Mass reserved for the backoff distribution, `delta · nnz(context) / c(context)`.
	///
	/// An unseen context defers entirely to the backoff (weight 1).
	pub fn backoff_weight(&self, context: &Context, delta: f64) -> f64 {
		let c_ab = self.counts.context_total(context);
		if c_ab == 0 {
			return 1.0;
		}
		delta * self.counts.context_nnz(context) as f64 / c_ab as f64
	}

	/// Interpolates the discounted estimate for `context` with `backoff`,
	/// the already computed lower order probability of `word`.
	///
	/// An unseen context returns `backoff` unchanged.
	pub fn kn_interp(&self, word: &str, context: &Context, delta: f64, backoff: f64) -> f64 {
		if self.counts.context_total(context) == 0 {
			return backoff;
		}
		self.discounted_estimate(word, context, delta) + self.backoff_weight(context, delta) * backoff
	}
}

impl NextWordEstimator for KneserNeyTrigramLm {
	fn order(&self) -> usize {
		Self::ORDER
	}

	fn vocabulary(&self) -> &Vocabulary {
		self.counts.vocabulary()
	}

	fn next_word_proba<S: AsRef<str>>(&self, word: &str, seq: &[S]) -> Result<f64> {
		let delta = self.params.delta();
		let pw1 = self.unigram_proba(word)?;
		let pw2 = self.kn_interp(word, &Context::trailing(seq, 1), delta, pw1);
		Ok(self.kn_interp(word, &Context::trailing(seq, 2), delta, pw2))
	}

	fn set_live_params(&mut self, params: &LiveParams) -> Result<()> {
		if let Some(delta) = params.delta {
			self.set_delta(delta)?;
		}
		Ok(())
	}
}
