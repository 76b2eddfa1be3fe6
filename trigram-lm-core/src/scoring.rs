use log::debug;

use crate::error::{LmError, Result};
use crate::model::context::Context;
use crate::model::estimator::NextWordEstimator;

/// Sentence start marker, never scored.
pub const SENTENCE_START: &str = "<s>";

/// Sentence end marker, never scored.
pub const SENTENCE_END: &str = "</s>";

/// Whether `word` is a sentence boundary marker.
pub fn is_boundary(word: &str) -> bool {
	word == SENTENCE_START || word == SENTENCE_END
}

/// Base-2 log probability of a sequence and the number of scored tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SequenceScore {
	pub log2_prob: f64,
	pub count: usize,
}

impl SequenceScore {
	/// `2^(-log2_prob / count)`, `None` when nothing was scored.
	pub fn perplexity(&self) -> Option<f64> {
		if self.count == 0 {
			return None;
		}
		Some((-self.log2_prob / self.count as f64).exp2())
	}

	/// Accumulates another score into this one.
	pub fn add(&mut self, other: &SequenceScore) {
		self.log2_prob += other.log2_prob;
		self.count += other.count;
	}
}

/// Scores `seq` under `lm`.
///
/// Starts at index `order - 1`, the first position with a full context.
/// Boundary markers are excluded from both the sum and the count.
///
/// # Errors
/// - `LmError::ZeroProbability` if any scored token gets probability 0
/// - Any estimator error (e.g. `LmError::DegenerateSmoothing`)
pub fn score_seq<E, S>(lm: &E, seq: &[S]) -> Result<SequenceScore>
where
	E: NextWordEstimator,
	S: AsRef<str>,
{
	let context_size = lm.order().saturating_sub(1);
	let mut score = SequenceScore::default();

	for i in context_size..seq.len() {
		let word = seq[i].as_ref();
		if is_boundary(word) {
			continue;
		}
		let context = &seq[i - context_size..i];
		let p = lm.next_word_proba(word, context)?;
		if p <= 0.0 {
			return Err(LmError::ZeroProbability {
				word: word.to_owned(),
				context: Context::from_words(context),
			});
		}

		let s = p.log2();
		debug!(
			"log P({} | {}) = {:.3}",
			word,
			Context::from_words(context),
			s
		);
		score.log2_prob += s;
		score.count += 1;
	}

	Ok(score)
}

/// Scores every sentence and sums the results.
pub fn score_corpus<E, T, S>(lm: &E, sentences: &[T]) -> Result<SequenceScore>
where
	E: NextWordEstimator,
	T: AsRef<[S]>,
	S: AsRef<str>,
{
	let mut total = SequenceScore::default();
	for sentence in sentences {
		total.add(&score_seq(lm, sentence.as_ref())?);
	}
	Ok(total)
}
