use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::context::Context;

/// One row of the counts table.
///
/// A `State` corresponds to a fixed context (`key`) and stores how many times
/// each next word immediately followed that context in the training stream.
///
/// ## Responsibilities:
/// - Accumulate next-word occurrences during aggregation
/// - Answer "zero when absent" count lookups without creating entries
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct State {
	/// Context this row is conditioned on.
	key: Context,
	/// Outgoing transitions indexed by the next word.
	/// Example: { "the" => 42, "a" => 3 }
	transitions: HashMap<String, u64>,
}

impl State {
	/// Creates a new empty row for the given context.
	pub fn new(key: Context) -> Self {
		Self {
			key,
			transitions: HashMap::new(),
		}
	}

	/// Records an occurrence of `next_word` after this row's context.
	pub fn add_transition(&mut self, next_word: &str) {
		// get_mut first: the key is only allocated for a new word
		match self.transitions.get_mut(next_word) {
			Some(occurrence) => *occurrence += 1,
			None => {
				self.transitions.insert(next_word.to_owned(), 1);
			}
		}
	}

	pub fn key(&self) -> &Context {
		&self.key
	}

	/// Count of `word` after this context, zero when never observed.
	pub fn count(&self, word: &str) -> u64 {
		self.transitions.get(word).copied().unwrap_or(0)
	}

	/// Sum of all transition counts.
	pub fn total(&self) -> u64 {
		self.transitions.values().sum()
	}

	/// Number of distinct words observed after this context.
	pub fn nnz(&self) -> usize {
		self.transitions.len()
	}

	/// Iterates over `(next_word, count)` pairs in arbitrary order.
	pub fn transitions(&self) -> impl Iterator<Item = (&str, u64)> {
		self.transitions.iter().map(|(word, count)| (word.as_str(), *count))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_and_totals() {
		let mut state = State::new(Context::bigram("a"));
		state.add_transition("b");
		state.add_transition("b");
		state.add_transition("c");

		assert_eq!(state.count("b"), 2);
		assert_eq!(state.count("c"), 1);
		assert_eq!(state.count("z"), 0);
		assert_eq!(state.total(), 3);
		assert_eq!(state.nnz(), 2);
	}

	#[test]
	fn absent_lookup_does_not_create_entries() {
		let state = State::new(Context::empty());
		assert_eq!(state.count("missing"), 0);
		assert_eq!(state.nnz(), 0);
	}
}
