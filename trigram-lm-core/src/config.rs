use serde::{Deserialize, Serialize};

use crate::error::{LmError, Result};

/// Additive smoothing mass `k` for `AddKTrigramLm`.
///
/// `k = 0` is plain maximum likelihood and can yield zero probabilities.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct AddKParams {
	k: f64,
}

impl AddKParams {
	/// # Errors
	/// Returns an error if `k` is negative or not finite.
	pub fn new(k: f64) -> Result<Self> {
		if !k.is_finite() || k < 0.0 {
			return Err(LmError::InvalidHyperparameter {
				name: "k",
				value: k,
				reason: "must be a finite value >= 0",
			});
		}
		Ok(Self { k })
	}

	pub fn k(&self) -> f64 {
		self.k
	}
}

impl Default for AddKParams {
	fn default() -> Self {
		Self { k: 0.0 }
	}
}

/// Absolute discount `delta` for `KneserNeyTrigramLm`.
///
/// Restricted to `[0, 1)`: every observed pair keeps a positive discounted
/// count, so the backoff weight accounts for exactly the mass removed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct KneserNeyParams {
	delta: f64,
}

impl KneserNeyParams {
	/// # Errors
	/// Returns an error if `delta` is outside `[0, 1)`.
	pub fn new(delta: f64) -> Result<Self> {
		if !(0.0..1.0).contains(&delta) {
			return Err(LmError::InvalidHyperparameter {
				name: "delta",
				value: delta,
				reason: "must be in [0, 1)",
			});
		}
		Ok(Self { delta })
	}

	pub fn delta(&self) -> f64 {
		self.delta
	}
}

impl Default for KneserNeyParams {
	fn default() -> Self {
		Self { delta: 0.75 }
	}
}

/// Live hyperparameter update, settable after the counts are built.
///
/// Each model applies the option it recognises and ignores the others:
/// - `k`: additive smoothing mass
/// - `delta`: absolute discount applied to every observed (context, word) pair
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct LiveParams {
	pub k: Option<f64>,
	pub delta: Option<f64>,
}

impl LiveParams {
	/// Validates every present option without applying anything.
	pub fn validate(&self) -> Result<()> {
		if let Some(k) = self.k {
			AddKParams::new(k)?;
		}
		if let Some(delta) = self.delta {
			KneserNeyParams::new(delta)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		assert_eq!(AddKParams::default().k(), 0.0);
		assert_eq!(KneserNeyParams::default().delta(), 0.75);
	}

	#[test]
	fn k_range() {
		assert!(AddKParams::new(0.0).is_ok());
		assert!(AddKParams::new(2.5).is_ok());
		assert!(matches!(
			AddKParams::new(-0.1),
			Err(LmError::InvalidHyperparameter { name: "k", .. })
		));
		assert!(AddKParams::new(f64::NAN).is_err());
		assert!(AddKParams::new(f64::INFINITY).is_err());
	}

	#[test]
	fn delta_range() {
		assert!(KneserNeyParams::new(0.0).is_ok());
		assert!(KneserNeyParams::new(0.999).is_ok());
		assert!(KneserNeyParams::new(1.0).is_err());
		assert!(KneserNeyParams::new(-0.5).is_err());
		assert!(KneserNeyParams::new(f64::NAN).is_err());
	}

	#[test]
	fn live_params_validation() {
		assert!(LiveParams { k: Some(1.0), delta: None }.validate().is_ok());
		assert!(LiveParams { k: None, delta: Some(1.5) }.validate().is_err());
		assert!(LiveParams::default().validate().is_ok());
	}
}
