use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered tuple of the words preceding a prediction, oldest first.
///
/// - `()` is the unigram context
/// - `(w_1,)` is a bigram context
/// - `(w_2, w_1)` is a trigram context
///
/// ## Invariants
/// - Holds at most `Context::MAX_LEN` words
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Context(Vec<String>);

impl Context {
	/// Longest context a trigram model conditions on.
	pub const MAX_LEN: usize = 2;

	/// The unigram (empty) context.
	pub fn empty() -> Self {
		Self(Vec::new())
	}

	/// Builds a context from explicit words, oldest first.
	///
	/// Only the last `MAX_LEN` words are kept.
	pub fn from_words<S: AsRef<str>>(words: &[S]) -> Self {
		Self::trailing(words, Self::MAX_LEN)
	}

	/// Returns the last `n` entries of `seq` as a context.
	///
	/// When `seq` is shorter than `n` the context is truncated instead of
	/// failing, so a sequence of one word yields a bigram context and an
	/// empty sequence yields the unigram context.
	pub fn trailing<S: AsRef<str>>(seq: &[S], n: usize) -> Self {
		let n = n.min(Self::MAX_LEN);
		let start = seq.len().saturating_sub(n);
		Self(seq[start..].iter().map(|w| w.as_ref().to_owned()).collect())
	}

	pub(crate) fn unigram() -> Self {
		Self::empty()
	}

	pub(crate) fn bigram(w_1: &str) -> Self {
		Self(vec![w_1.to_owned()])
	}

	pub(crate) fn trigram(w_2: &str, w_1: &str) -> Self {
		Self(vec![w_2.to_owned(), w_1.to_owned()])
	}

	/// Number of words in the context (0, 1 or 2).
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the context words, oldest first.
	pub fn words(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}
}

impl fmt::Display for Context {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({})", self.0.join(", "))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn trailing_keeps_last_words() {
		let seq = ["a", "b", "c"];
		assert_eq!(Context::trailing(&seq, 2), Context::trigram("b", "c"));
		assert_eq!(Context::trailing(&seq, 1), Context::bigram("c"));
	}

	#[test]
	fn trailing_truncates_short_sequences() {
		let one = ["a"];
		let none: [&str; 0] = [];
		assert_eq!(Context::trailing(&one, 2), Context::bigram("a"));
		assert_eq!(Context::trailing(&none, 2), Context::empty());
		assert!(Context::trailing(&none, 1).is_empty());
	}

	#[test]
	fn from_words_caps_length() {
		let context = Context::from_words(&["x", "y", "z", "w"]);
		assert_eq!(context.len(), Context::MAX_LEN);
		assert_eq!(context.words().collect::<Vec<_>>(), vec!["z", "w"]);
	}

	#[test]
	fn display_lists_words() {
		assert_eq!(Context::trigram("a", "b").to_string(), "(a, b)");
		assert_eq!(Context::empty().to_string(), "()");
	}
}
