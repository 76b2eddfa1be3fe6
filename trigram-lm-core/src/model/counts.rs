use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::context::Context;
use super::state::State;
use super::vocabulary::Vocabulary;
use crate::error::Result;
use crate::io::{build_output_path, read_tokens};

/// Which count tables the aggregator fills.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CountOrders {
	/// Trigram rows only, vocabulary collected from every token.
	/// Enough for add-k smoothing.
	Trigram,
	/// Unigram, bigram and trigram rows plus type fertility and
	/// nonzero counts. Required by Kneser-Ney smoothing.
	Full,
}

impl CountOrders {
	fn cache_extension(self) -> &'static str {
		match self {
			CountOrders::Trigram => "trigram.bin",
			CountOrders::Full => "full.bin",
		}
	}
}

/// Sparse n-gram statistics collected in one pass over a token stream.
///
/// # Responsibilities
/// - Count every `(context, word)` pair for contexts of length 0 to 2
/// - Derive context totals, nonzero counts and word type fertility
/// - Provide "zero when absent" lookups that never create entries
///
/// # Invariants
/// - `context_totals[c]` equals the sum of the row `counts[c]`
/// - `context_nnz[c]` equals the number of distinct words in `counts[c]`
/// - `type_fertility[w] == |type_contexts[w]|` and `z_tf` is their sum
/// - Read-only once built
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NGramCounts {
	orders: CountOrders,

	/// `counts[context][word]`, rows indexed by context.
	counts: HashMap<Context, State>,

	/// Sum of each row of `counts`.
	context_totals: HashMap<Context, u64>,

	/// Number of distinct words in each row (`Full` only).
	context_nnz: HashMap<Context, usize>,

	/// Distinct immediate predecessors of each word (`Full` only).
	type_contexts: HashMap<String, HashSet<String>>,

	/// `|type_contexts[w]|` for each word.
	type_fertility: HashMap<String, usize>,

	/// Sum of all type fertilities, i.e. the number of distinct bigram types.
	z_tf: f64,

	vocabulary: Vocabulary,
}

impl NGramCounts {
	/// Aggregates a token stream in a single left-to-right pass.
	///
	/// A sliding window `(w_2, w_1)` holds the two most recent tokens, both
	/// absent at stream start. Boundary markers are ordinary tokens here.
	pub fn build<I, S>(tokens: I, orders: CountOrders) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut counts: HashMap<Context, State> = HashMap::new();
		let mut type_contexts: HashMap<String, HashSet<String>> = HashMap::new();
		let mut wordset = Vocabulary::default();

		let mut w_1: Option<String> = None;
		let mut w_2: Option<String> = None;
		let mut nb_tokens: usize = 0;

		for token in tokens {
			let word = token.as_ref();
			nb_tokens += 1;

			match orders {
				CountOrders::Trigram => wordset.insert(word),
				CountOrders::Full => Self::record(&mut counts, Context::unigram(), word),
			}

			if let Some(prev) = w_1.as_deref() {
				if orders == CountOrders::Full {
					Self::record(&mut counts, Context::bigram(prev), word);
					type_contexts
						.entry(word.to_owned())
						.or_default()
						.insert(prev.to_owned());
				}
				if let Some(prev_prev) = w_2.as_deref() {
					Self::record(&mut counts, Context::trigram(prev_prev, prev), word);
				}
			}

			w_2 = w_1.take();
			w_1 = Some(word.to_owned());
		}

		let context_totals: HashMap<Context, u64> = counts
			.iter()
			.map(|(context, row)| (context.clone(), row.total()))
			.collect();

		let context_nnz: HashMap<Context, usize> = match orders {
			CountOrders::Trigram => HashMap::new(),
			CountOrders::Full => counts
				.iter()
				.map(|(context, row)| (context.clone(), row.nnz()))
				.collect(),
		};

		let type_fertility: HashMap<String, usize> = type_contexts
			.iter()
			.map(|(word, preceding)| (word.clone(), preceding.len()))
			.collect();
		let z_tf = type_fertility.values().sum::<usize>() as f64;

		let vocabulary = match orders {
			CountOrders::Trigram => wordset,
			CountOrders::Full => counts
				.get(&Context::unigram())
				.map(|row| row.transitions().map(|(word, _)| word).collect::<Vocabulary>())
				.unwrap_or_default(),
		};

		debug!(
			"Aggregated {} tokens into {} contexts, V = {}",
			nb_tokens,
			counts.len(),
			vocabulary.size()
		);

		Self {
			orders,
			counts,
			context_totals,
			context_nnz,
			type_contexts,
			type_fertility,
			z_tf,
			vocabulary,
		}
	}

	fn record(counts: &mut HashMap<Context, State>, context: Context, word: &str) {
		counts
			.entry(context)
			.or_insert_with_key(|key| State::new(key.clone()))
			.add_transition(word);
	}

	/// Loads aggregated tables for a corpus file, using a binary cache.
	///
	/// - `filepath` is a whitespace-tokenised text file, one sentence per line.
	/// - If `<stem>.<orders>.bin` exists next to it, it is decoded with `postcard`.
	/// - Otherwise the corpus is aggregated and the cache is written.
	pub fn from_corpus_file<P: AsRef<Path>>(filepath: P, orders: CountOrders) -> Result<Self> {
		let binary_data_path = build_output_path(&filepath, orders.cache_extension())?;
		if binary_data_path.exists() {
			info!("Loading cached counts from {}", binary_data_path.display());
			return Self::load(binary_data_path);
		}

		let tokens = read_tokens(&filepath)?;
		info!(
			"Aggregating {} tokens from {}",
			tokens.len(),
			filepath.as_ref().display()
		);
		let counts = Self::build(&tokens, orders);
		counts.save(&binary_data_path)?;
		Ok(counts)
	}

	/// Serializes the tables with `postcard`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(path, bytes)?;
		Ok(())
	}

	/// Deserializes tables written by `save`.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = std::fs::read(path)?;
		Ok(postcard::from_bytes(&bytes)?)
	}

	pub fn orders(&self) -> CountOrders {
		self.orders
	}

	/// `c(context, word)`, zero when absent.
	pub fn count(&self, context: &Context, word: &str) -> u64 {
		self.counts.get(context).map_or(0, |row| row.count(word))
	}

	/// `c(context)`, zero when the context was never observed.
	pub fn context_total(&self, context: &Context) -> u64 {
		self.context_totals.get(context).copied().unwrap_or(0)
	}

	/// Number of distinct words seen after `context`, zero when absent.
	pub fn context_nnz(&self, context: &Context) -> usize {
		self.context_nnz.get(context).copied().unwrap_or(0)
	}

	/// Distinct predecessors of `word`, if it ever had one.
	pub fn type_contexts(&self, word: &str) -> Option<&HashSet<String>> {
		self.type_contexts.get(word)
	}

	/// Number of distinct predecessors of `word`, zero when absent.
	pub fn type_fertility(&self, word: &str) -> usize {
		self.type_fertility.get(word).copied().unwrap_or(0)
	}

	pub fn z_tf(&self) -> f64 {
		self.z_tf
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	/// The row for `context`, if observed.
	pub fn row(&self, context: &Context) -> Option<&State> {
		self.counts.get(context)
	}

	/// Iterates over every observed row.
	pub fn rows(&self) -> impl Iterator<Item = &State> {
		self.counts.values()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	const TOKENS: [&str; 6] = ["a", "b", "a", "b", "a", "c"];

	#[test]
	fn trigram_tables_for_add_k() {
		let counts = NGramCounts::build(TOKENS, CountOrders::Trigram);
		let ab = Context::trigram("a", "b");

		assert_eq!(counts.count(&ab, "a"), 2);
		assert_eq!(counts.context_total(&ab), 2);
		assert_eq!(counts.count(&Context::trigram("b", "a"), "b"), 1);
		assert_eq!(counts.count(&Context::trigram("b", "a"), "c"), 1);
		assert_eq!(counts.vocabulary().size(), 3);
		assert!(counts.row(&Context::unigram()).is_none());
		assert!(counts.row(&Context::bigram("a")).is_none());
	}

	#[test]
	fn full_tables_for_kneser_ney() {
		let counts = NGramCounts::build(TOKENS, CountOrders::Full);

		assert_eq!(counts.context_total(&Context::unigram()), 6);
		assert_eq!(counts.count(&Context::unigram(), "a"), 3);
		assert_eq!(counts.count(&Context::bigram("a"), "b"), 2);
		assert_eq!(counts.context_nnz(&Context::bigram("a")), 2);
		assert_eq!(counts.context_total(&Context::bigram("c")), 0);

		// "b" is only ever preceded by "a"
		assert_eq!(counts.type_fertility("b"), 1);
		assert_eq!(counts.type_fertility("a"), 1);
		assert_eq!(counts.type_fertility("c"), 1);
		// distinct bigram types: (a,b) (b,a) (a,c)
		assert_eq!(counts.z_tf(), 3.0);
	}

	#[test]
	fn first_token_is_in_vocabulary() {
		let counts = NGramCounts::build(["x", "y"], CountOrders::Full);
		assert!(counts.vocabulary().contains("x"));
		assert_eq!(counts.type_fertility("x"), 0);
		assert!(counts.type_contexts("x").is_none());

		let counts = NGramCounts::build(["x", "y"], CountOrders::Trigram);
		assert!(counts.vocabulary().contains("x"));
	}

	#[test]
	fn empty_stream() {
		let tokens: Vec<String> = Vec::new();
		let counts = NGramCounts::build(&tokens, CountOrders::Full);
		assert!(counts.vocabulary().is_empty());
		assert_eq!(counts.z_tf(), 0.0);
		assert_eq!(counts.rows().count(), 0);
	}

	#[test]
	fn lookups_do_not_create_rows() {
		let counts = NGramCounts::build(TOKENS, CountOrders::Full);
		let before = counts.rows().count();
		let unseen = Context::trigram("zz", "yy");
		assert_eq!(counts.count(&unseen, "a"), 0);
		assert_eq!(counts.context_total(&unseen), 0);
		assert_eq!(counts.rows().count(), before);
	}

	#[test]
	fn save_and_load() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("counts.bin");
		let counts = NGramCounts::build(TOKENS, CountOrders::Full);

		counts.save(&path).unwrap();
		assert_eq!(NGramCounts::load(&path).unwrap(), counts);
	}

	#[test]
	fn corpus_file_is_cached() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("corpus.txt");
		std::fs::write(&path, "a b a\nb a c\n").unwrap();

		let first = NGramCounts::from_corpus_file(&path, CountOrders::Full).unwrap();
		assert!(dir.path().join("corpus.full.bin").exists());
		assert!(first.vocabulary().contains("<s>"));
		assert!(first.vocabulary().contains("</s>"));

		let second = NGramCounts::from_corpus_file(&path, CountOrders::Full).unwrap();
		assert_eq!(first, second);
	}

	fn token_stream() -> impl Strategy<Value = Vec<String>> {
		prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d", "<s>", "</s>"]), 0..60)
			.prop_map(|words| words.into_iter().map(str::to_owned).collect())
	}

	proptest! {
		#[test]
		fn totals_match_rows(tokens in token_stream()) {
			let counts = NGramCounts::build(&tokens, CountOrders::Full);
			for row in counts.rows() {
				let sum: u64 = row.transitions().map(|(_, count)| count).sum();
				prop_assert_eq!(counts.context_total(row.key()), sum);
				prop_assert_eq!(counts.context_nnz(row.key()), row.nnz());
			}
			prop_assert_eq!(counts.context_total(&Context::unigram()), tokens.len() as u64);
		}

		#[test]
		fn fertility_matches_type_contexts(tokens in token_stream()) {
			let counts = NGramCounts::build(&tokens, CountOrders::Full);
			let mut sum = 0usize;
			for word in counts.vocabulary().iter() {
				let fertility = counts.type_contexts(word).map_or(0, HashSet::len);
				prop_assert_eq!(counts.type_fertility(word), fertility);
				sum += fertility;
			}
			prop_assert_eq!(counts.z_tf(), sum as f64);

			let bigram_types: HashSet<(&String, &String)> = tokens.iter().zip(tokens.iter().skip(1)).collect();
			prop_assert_eq!(counts.z_tf(), bigram_types.len() as f64);
		}

		#[test]
		fn aggregation_is_idempotent(tokens in token_stream()) {
			prop_assert_eq!(
				NGramCounts::build(&tokens, CountOrders::Full),
				NGramCounts::build(&tokens, CountOrders::Full)
			);
			prop_assert_eq!(
				NGramCounts::build(&tokens, CountOrders::Trigram),
				NGramCounts::build(&tokens, CountOrders::Trigram)
			);
		}

		#[test]
		fn vocabularies_agree(tokens in token_stream()) {
			let full = NGramCounts::build(&tokens, CountOrders::Full);
			let trigram = NGramCounts::build(&tokens, CountOrders::Trigram);
			prop_assert_eq!(full.vocabulary(), trigram.vocabulary());
		}
	}
}
