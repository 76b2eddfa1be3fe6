use log::warn;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use crate::error::{LmError, Result};
use crate::model::context::Context;
use crate::model::estimator::NextWordEstimator;
use crate::scoring::{SENTENCE_END, SENTENCE_START};

/// Tolerance on the total mass before a distribution is reported as unnormalized.
const NORMALIZATION_TOLERANCE: f64 = 1e-6;

/// Computes `P(w | seq)` for every word of the vocabulary.
///
/// Words are enumerated in the vocabulary's stable order.
///
/// # Errors
/// - `LmError::InvalidDistribution` on negative or non-finite entries
/// - `LmError::NoProbabilityMass` if every entry is 0
pub fn next_word_distribution<'a, E, S>(lm: &'a E, seq: &[S]) -> Result<Vec<(&'a str, f64)>>
where
	E: NextWordEstimator,
	S: AsRef<str>,
{
	let mut probs = Vec::with_capacity(lm.vocabulary().size());
	let mut total = 0.0;

	for word in lm.vocabulary().iter() {
		let p = lm.next_word_proba(word, seq)?;
		if !p.is_finite() || p < 0.0 {
			return Err(LmError::InvalidDistribution(format!(
				"P({}) = {} after {}",
				word,
				p,
				Context::trailing(seq, lm.order() - 1)
			)));
		}
		total += p;
		probs.push((word, p));
	}

	if total <= 0.0 {
		return Err(LmError::NoProbabilityMass {
			context: Context::trailing(seq, lm.order() - 1),
		});
	}
	if (total - 1.0).abs() > NORMALIZATION_TOLERANCE {
		warn!("Next-word distribution sums to {} instead of 1", total);
	}

	Ok(probs)
}

/// Draws the next word after `seq`, with probability proportional to the
/// estimator's distribution. Only vocabulary words can be drawn.
///
/// Each call costs one estimator evaluation per vocabulary word.
pub fn predict_next<E, S, R>(lm: &E, seq: &[S], rng: &mut R) -> Result<String>
where
	E: NextWordEstimator,
	S: AsRef<str>,
	R: Rng + ?Sized,
{
	let probs = next_word_distribution(lm, seq)?;
	let index = WeightedIndex::new(probs.iter().map(|(_, p)| *p))
		.map_err(|e| LmError::InvalidDistribution(e.to_string()))?;
	Ok(probs[index.sample(rng)].0.to_owned())
}

/// Generates a sentence by repeated sampling.
///
/// - Starts from `seed` (or `<s> <s>` when empty)
/// - Stops on `</s>` or after `max_words` sampled words
///
/// Returns the generated words only, without the seed and the end marker.
pub fn generate<E, S, R>(lm: &E, seed: &[S], max_words: usize, rng: &mut R) -> Result<Vec<String>>
where
	E: NextWordEstimator,
	S: AsRef<str>,
	R: Rng + ?Sized,
{
	let mut sequence: Vec<String> = if seed.is_empty() {
		vec![SENTENCE_START.to_owned(); lm.order() - 1]
	} else {
		seed.iter().map(|w| w.as_ref().to_owned()).collect()
	};
	let mut generated = Vec::new();

	while generated.len() < max_words {
		let word = predict_next(lm, &sequence, rng)?;
		if word == SENTENCE_END {
			break;
		}
		generated.push(word.clone());
		sequence.push(word);
	}

	Ok(generated)
}
