//! Bias-free linear projection

use ndarray::{Array2, ArrayBase, Data, Ix2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::init::xavier_normal;
use crate::error::{GatError, Result};

/// Linear map `y = x · W` with no bias term
///
/// The weight is stored input-major, shape (in_dim, out_dim).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    weight: Array2<f64>,
}

impl Linear {
    /// Create a projection with Xavier-normal weights
    pub fn xavier<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        gain: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let weight = xavier_normal((in_dim, out_dim), in_dim, out_dim, gain, rng)?;
        Ok(Self { weight })
    }

    /// Wrap an existing (in_dim, out_dim) weight matrix
    pub fn from_weight(weight: Array2<f64>) -> Self {
        Self { weight }
    }

    /// Input width
    pub fn in_dim(&self) -> usize {
        self.weight.nrows()
    }

    /// Output width
    pub fn out_dim(&self) -> usize {
        self.weight.ncols()
    }

    pub fn weight(&self) -> &Array2<f64> {
        &self.weight
    }

    pub fn weight_mut(&mut self) -> &mut Array2<f64> {
        &mut self.weight
    }

    pub fn num_parameters(&self) -> usize {
        self.weight.len()
    }

    /// Project a batch of rows
    pub fn forward<S>(&self, x: &ArrayBase<S, Ix2>) -> Result<Array2<f64>>
    where
        S: Data<Elem = f64>,
    {
        if x.ncols() != self.in_dim() {
            return Err(GatError::shape(
                "linear input width",
                self.in_dim(),
                x.ncols(),
            ));
        }
        Ok(x.dot(&self.weight))
    }
}
