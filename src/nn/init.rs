//! Parameter initialization
//!
//! Variance-scaling (Xavier/Glorot) initializers.

use ndarray::{Array, Dimension, ShapeBuilder};
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;
use rand::Rng;

use crate::error::{GatError, Result};

/// Gain used for every GAT parameter (≈ sqrt(2), the ReLU gain)
pub const XAVIER_GAIN: f64 = 1.414;

/// Standard deviation of the Xavier-normal distribution
pub fn xavier_std(fan_in: usize, fan_out: usize, gain: f64) -> f64 {
    gain * (2.0 / (fan_in + fan_out) as f64).sqrt()
}

/// Sample an array from N(0, xavier_std^2)
///
/// Fans follow the PyTorch convention: for a linear weight `fan_in` is the
/// input width and `fan_out` the output width; for a per-head attention
/// vector of shape (H, D', 1) `fan_in = D'` and `fan_out = H`.
pub fn xavier_normal<Sh, D, R>(
    shape: Sh,
    fan_in: usize,
    fan_out: usize,
    gain: f64,
    rng: &mut R,
) -> Result<Array<f64, D>>
where
    Sh: ShapeBuilder<Dim = D>,
    D: Dimension,
    R: Rng + ?Sized,
{
    if fan_in + fan_out == 0 {
        return Err(GatError::InvalidConfig(
            "xavier init needs a non-empty fan".to_string(),
        ));
    }

    let std = xavier_std(fan_in, fan_out, gain);
    let normal = Normal::new(0.0, std)
        .map_err(|e| GatError::InvalidConfig(format!("xavier std {}: {}", std, e)))?;

    Ok(Array::random_using(shape, normal, rng))
}
