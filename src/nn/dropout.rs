//! Dropout regularization
//!
//! A zero probability selects [`Dropout::Identity`], which hands the input
//! back untouched instead of running a mask with p = 0.

use ndarray::{Array, Dimension};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GatError, Result};

/// Something that perturbs activations during training
pub trait Regularizer {
    /// Apply the regularizer. `rng = None` means inference: the input is
    /// returned unchanged.
    fn regularize<D, R>(&self, input: Array<f64, D>, rng: Option<&mut R>) -> Array<f64, D>
    where
        D: Dimension,
        R: Rng + ?Sized;
}

/// Dropout variant chosen at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Dropout {
    /// Disabled
    Identity,
    /// Zero each element with probability p, scale survivors by 1/(1-p)
    Bernoulli(f64),
}

impl Dropout {
    /// Create from a drop probability in [0, 1)
    pub fn new(p: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&p) {
            return Err(GatError::InvalidConfig(format!(
                "dropout probability must be in [0, 1), got {}",
                p
            )));
        }
        if p == 0.0 {
            Ok(Dropout::Identity)
        } else {
            Ok(Dropout::Bernoulli(p))
        }
    }

    pub fn probability(&self) -> f64 {
        match self {
            Dropout::Identity => 0.0,
            Dropout::Bernoulli(p) => *p,
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Dropout::Identity)
    }
}

impl Regularizer for Dropout {
    fn regularize<D, R>(&self, input: Array<f64, D>, rng: Option<&mut R>) -> Array<f64, D>
    where
        D: Dimension,
        R: Rng + ?Sized,
    {
        match (self, rng) {
            (Dropout::Bernoulli(p), Some(rng)) => {
                let p = *p;
                let scale = 1.0 / (1.0 - p);
                input.mapv_into(|x| if rng.gen::<f64>() < p { 0.0 } else { x * scale })
            }
            _ => input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_probability_is_identity() {
        assert_eq!(Dropout::new(0.0).unwrap(), Dropout::Identity);
        assert_eq!(Dropout::new(0.5).unwrap(), Dropout::Bernoulli(0.5));
    }

    #[test]
    fn test_invalid_probability() {
        assert!(Dropout::new(1.0).is_err());
        assert!(Dropout::new(-0.1).is_err());
        assert!(Dropout::new(f64::NAN).is_err());
    }

    #[test]
    fn test_inference_passthrough() {
        let x = Array2::from_elem((4, 4), 2.0);
        let dropout = Dropout::Bernoulli(0.9);

        let y = dropout.regularize(x.clone(), None::<&mut StdRng>);
        assert_eq!(x, y);
    }

    #[test]
    fn test_identity_ignores_rng() {
        let x = Array2::from_elem((3, 3), 1.5);
        let mut rng = StdRng::seed_from_u64(11);

        let y = Dropout::Identity.regularize(x.clone(), Some(&mut rng));
        assert_eq!(x, y);
    }

    #[test]
    fn test_training_mask_and_scale() {
        let x = Array2::from_elem((100, 100), 1.0);
        let mut rng = StdRng::seed_from_u64(42);

        let y = Dropout::Bernoulli(0.5).regularize(x, Some(&mut rng));

        // Survivors are scaled by 1 / (1 - p)
        assert!(y.iter().all(|&v| v == 0.0 || (v - 2.0).abs() < 1e-12));

        let dropped = y.iter().filter(|&&v| v == 0.0).count() as f64 / 10_000.0;
        assert!((dropped - 0.5).abs() < 0.05);
    }
}
