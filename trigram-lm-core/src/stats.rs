use std::fmt;

use crate::model::context::Context;
use crate::model::counts::NGramCounts;

/// Bytes per context word in the memory estimate.
const CONTEXT_WORD_BYTES: usize = 4;
/// Bytes per `(word, count)` entry in the memory estimate.
const ENTRY_BYTES: usize = 20;

/// Read-only diagnostics over aggregated counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountStats {
	/// `unique_ngrams[i]` is the number of distinct `(i + 1)`-grams.
	pub unique_ngrams: Vec<usize>,
	/// Lower bound on the memory needed by the count tables alone.
	pub optimal_memory_bytes: usize,
}

impl CountStats {
	pub fn from_counts(counts: &NGramCounts) -> Self {
		let mut unique_ngrams = vec![0; Context::MAX_LEN + 1];
		let mut optimal_memory_bytes = 0;

		for row in counts.rows() {
			unique_ngrams[row.key().len()] += row.nnz();
			optimal_memory_bytes += CONTEXT_WORD_BYTES * row.key().len() + ENTRY_BYTES * row.nnz();
		}

		Self {
			unique_ngrams,
			optimal_memory_bytes,
		}
	}

	pub fn optimal_memory_mb(&self) -> usize {
		self.optimal_memory_bytes / (1 << 20)
	}
}

impl fmt::Display for CountStats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "=== N-gram Language Model stats ===")?;
		for (i, unique) in self.unique_ngrams.iter().enumerate() {
			writeln!(f, "{} unique {}-grams", unique, i + 1)?;
		}
		write!(f, "Optimal memory usage (counts only): {} MB", self.optimal_memory_mb())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::counts::CountOrders;

	const TOKENS: [&str; 6] = ["a", "b", "a", "b", "a", "c"];

	#[test]
	fn unique_ngrams_per_order() {
		let stats = CountStats::from_counts(&NGramCounts::build(TOKENS, CountOrders::Full));
		// unigrams a b c; bigrams ab ba ac; trigrams aba bab bac
		assert_eq!(stats.unique_ngrams, vec![3, 3, 3]);
	}

	#[test]
	fn trigram_only_tables() {
		let stats = CountStats::from_counts(&NGramCounts::build(TOKENS, CountOrders::Trigram));
		assert_eq!(stats.unique_ngrams, vec![0, 0, 3]);
		// rows (a,b): {a}, (b,a): {b, c}
		assert_eq!(stats.optimal_memory_bytes, (8 + 20) + (8 + 40));
	}

	#[test]
	fn display_report() {
		let stats = CountStats::from_counts(&NGramCounts::build(TOKENS, CountOrders::Full));
		let report = stats.to_string();
		assert!(report.contains("3 unique 2-grams"));
		assert!(report.ends_with("0 MB"));
	}
}
