use thiserror::Error;

use crate::model::context::Context;
use crate::model::counts::CountOrders;

/// Errors raised while building, configuring or querying a language model.
///
/// Arithmetic edge cases (zero denominators, zero probabilities, empty
/// distributions) are reported here instead of leaking out as NaN or infinity.
#[derive(Debug, Error)]
pub enum LmError {
	/// A smoothing hyperparameter outside of its valid range.
	#[error("invalid hyperparameter {name} = {value}: {reason}")]
	InvalidHyperparameter {
		name: &'static str,
		value: f64,
		reason: &'static str,
	},

	/// The estimator formula would divide by zero.
	#[error("degenerate smoothing: zero denominator for context {context}")]
	DegenerateSmoothing { context: Context },

	/// A scored token received probability exactly 0.
	#[error("zero probability for '{word}' after context {context}")]
	ZeroProbability { word: String, context: Context },

	/// Every word of the vocabulary received probability 0.
	#[error("no probability mass to sample from after context {context}")]
	NoProbabilityMass { context: Context },

	/// The next-word distribution holds negative or non-finite entries.
	#[error("invalid next-word distribution: {0}")]
	InvalidDistribution(String),

	/// The count tables were built for the other estimator.
	#[error("estimator requires {expected:?} count tables")]
	IncompatibleCounts { expected: CountOrders },

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Codec(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, LmError>;
