use std::sync::Arc;

use super::context::Context;
use super::counts::{CountOrders, NGramCounts};
use super::estimator::NextWordEstimator;
use super::vocabulary::Vocabulary;
use crate::config::{AddKParams, LiveParams};
use crate::error::{LmError, Result};

/// Trigram language model with additive ("add-k") smoothing.
///
/// `P_k(w | w_2 w_1) = (c(w_2 w_1, w) + k) / (c(w_2 w_1) + k·V)`
///
/// The model is a thin view over shared counts: changing `k` never
/// re-aggregates the corpus.
#[derive(Clone, Debug, PartialEq)]
pub struct AddKTrigramLm {
	counts: Arc<NGramCounts>,
	params: AddKParams,
}

impl AddKTrigramLm {
	pub const ORDER: usize = 3;

	/// Builds the model from a token stream with the default `k`.
	pub fn new<I, S>(tokens: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self {
			counts: Arc::new(NGramCounts::build(tokens, CountOrders::Trigram)),
			params: AddKParams::default(),
		}
	}

	/// Wraps already aggregated counts.
	///
	/// # Errors
	/// Returns `LmError::IncompatibleCounts` unless the tables hold trigram
	/// rows only. Full tables would answer short contexts from their unigram
	/// and bigram rows instead of as unseen trigram contexts.
	pub fn from_counts(counts: Arc<NGramCounts>) -> Result<Self> {
		if counts.orders() != CountOrders::Trigram {
			return Err(LmError::IncompatibleCounts {
				expected: CountOrders::Trigram,
			});
		}
		Ok(Self {
			counts,
			params: AddKParams::default(),
		})
	}

	/// Returns a view over the same counts with other parameters.
	pub fn with_params(&self, params: AddKParams) -> Self {
		Self {
			counts: Arc::clone(&self.counts),
			params,
		}
	}

	pub fn params(&self) -> AddKParams {
		self.params
	}

	pub fn set_params(&mut self, params: AddKParams) {
		self.params = params;
	}

	/// # Errors
	/// Returns an error if `k` is negative or not finite.
	pub fn set_k(&mut self, k: f64) -> Result<()> {
		self.params = AddKParams::new(k)?;
		Ok(())
	}

	pub fn counts(&self) -> &Arc<NGramCounts> {
		&self.counts
	}

	/// `P_k(word | context)` for an explicit context.
	///
	/// # Errors
	/// `LmError::DegenerateSmoothing` if `c(context) + k·V` is zero, which
	/// happens with `k = 0` and an unseen context, or an empty vocabulary.
	pub fn proba(&self, word: &str, context: &Context) -> Result<f64> {
		let k = self.params.k();
		let c_abc = self.counts.count(context, word) as f64;
		let c_ab = self.counts.context_total(context) as f64;
		let denominator = c_ab + k * self.counts.vocabulary().size() as f64;

		if denominator == 0.0 {
			return Err(LmError::DegenerateSmoothing {
				context: context.clone(),
			});
		}
		Ok((c_abc + k) / denominator)
	}
}

impl NextWordEstimator for AddKTrigramLm {
	fn order(&self) -> usize {
		Self::ORDER
	}

	fn vocabulary(&self) -> &Vocabulary {
		self.counts.vocabulary()
	}

	fn next_word_proba<S: AsRef<str>>(&self, word: &str, seq: &[S]) -> Result<f64> {
		self.proba(word, &Context::trailing(seq, Self::ORDER - 1))
	}

	fn set_live_params(&mut self, params: &LiveParams) -> Result<()> {
		if let Some(k) = params.k {
			self.set_k(k)?;
		}
		Ok(())
	}
}
