use serde::{Deserialize, Serialize};

use super::add_k::AddKTrigramLm;
use super::kneser_ney::KneserNeyTrigramLm;
use super::vocabulary::Vocabulary;
use crate::config::LiveParams;
use crate::error::Result;

/// Capability shared by every next-word estimator.
///
/// The scorer and the sampler are written against this trait only.
pub trait NextWordEstimator {
	/// Order `n` of the model (3 for a trigram model).
	fn order(&self) -> usize;

	/// Words the estimator can assign probability to.
	fn vocabulary(&self) -> &Vocabulary;

	/// `P(word | seq)`, where only the last `order() - 1` entries of `seq` matter.
	///
	/// Shorter sequences are conditioned on a truncated context.
	///
	/// # Errors
	/// Returns `LmError::DegenerateSmoothing` when the formula would divide by zero.
	fn next_word_proba<S: AsRef<str>>(&self, word: &str, seq: &[S]) -> Result<f64>;

	/// Applies the recognised options of `params`, ignoring the others.
	///
	/// # Errors
	/// Returns an error, leaving the model unchanged, if a recognised option
	/// is out of range.
	fn set_live_params(&mut self, params: &LiveParams) -> Result<()>;
}

/// Smoothing method selector.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
	AddK,
	KneserNey,
}

/// Either of the two trigram estimators, for callers choosing at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum LanguageModel {
	AddK(AddKTrigramLm),
	KneserNey(KneserNeyTrigramLm),
}

impl LanguageModel {
	pub fn kind(&self) -> ModelKind {
		match self {
			LanguageModel::AddK(_) => ModelKind::AddK,
			LanguageModel::KneserNey(_) => ModelKind::KneserNey,
		}
	}
}

impl NextWordEstimator for LanguageModel {
	fn order(&self) -> usize {
		match self {
			LanguageModel::AddK(lm) => lm.order(),
			LanguageModel::KneserNey(lm) => lm.order(),
		}
	}

	fn vocabulary(&self) -> &Vocabulary {
		match self {
			LanguageModel::AddK(lm) => lm.vocabulary(),
			LanguageModel::KneserNey(lm) => lm.vocabulary(),
		}
	}

	fn next_word_proba<S: AsRef<str>>(&self, word: &str, seq: &[S]) -> Result<f64> {
		match self {
			LanguageModel::AddK(lm) => lm.next_word_proba(word, seq),
			LanguageModel::KneserNey(lm) => lm.next_word_proba(word, seq),
		}
	}

	fn set_live_params(&mut self, params: &LiveParams) -> Result<()> {
		match self {
			LanguageModel::AddK(lm) => lm.set_live_params(params),
			LanguageModel::KneserNey(lm) => lm.set_live_params(params),
		}
	}
}

impl From<AddKTrigramLm> for LanguageModel {
	fn from(lm: AddKTrigramLm) -> Self {
		LanguageModel::AddK(lm)
	}
}

impl From<KneserNeyTrigramLm> for LanguageModel {
	fn from(lm: KneserNeyTrigramLm) -> Self {
		LanguageModel::KneserNey(lm)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const TOKENS: [&str; 6] = ["a", "b", "a", "b", "a", "c"];

	#[test]
	fn dispatches_to_variant() {
		let add_k = AddKTrigramLm::new(TOKENS);
		let mut model = LanguageModel::from(add_k.clone());
		model.set_live_params(&LiveParams { k: Some(1.0), delta: None }).unwrap();

		assert_eq!(model.kind(), ModelKind::AddK);
		assert_eq!(model.order(), 3);
		assert_eq!(model.vocabulary(), add_k.vocabulary());
		assert_eq!(model.next_word_proba("a", &["a", "b"]).unwrap(), 0.6);
	}

	#[test]
	fn kind_is_serialized_lowercase() {
		let kind: ModelKind = kind_from_str("kneserney");
		assert_eq!(kind, ModelKind::KneserNey);
	}

	fn kind_from_str(name: &str) -> ModelKind {
		use serde::de::IntoDeserializer;
		let deserializer: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
			name.into_deserializer();
		ModelKind::deserialize(deserializer).unwrap()
	}
}
