use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The set of distinct word tokens observed during aggregation.
///
/// Iteration order is lexicographic and therefore stable across runs, which
/// keeps sampled distributions reproducible under a seeded RNG.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Vocabulary {
	words: BTreeSet<String>,
}

impl Vocabulary {
	/// Number of distinct words (`V`).
	pub fn size(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	pub fn contains(&self, word: &str) -> bool {
		self.words.contains(word)
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.words.iter().map(String::as_str)
	}

	pub(crate) fn insert(&mut self, word: &str) {
		if !self.words.contains(word) {
			self.words.insert(word.to_owned());
		}
	}
}

impl<S: AsRef<str>> FromIterator<S> for Vocabulary {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		let mut vocabulary = Self::default();
		for word in iter {
			vocabulary.insert(word.as_ref());
		}
		vocabulary
	}
}
