//! Activation functions

use ndarray::{Array, Dimension};
use serde::{Deserialize, Serialize};

/// LeakyReLU activation
pub fn leaky_relu(x: f64, negative_slope: f64) -> f64 {
    if x >= 0.0 {
        x
    } else {
        negative_slope * x
    }
}

/// ELU activation
pub fn elu(x: f64, alpha: f64) -> f64 {
    if x >= 0.0 {
        x
    } else {
        alpha * (x.exp() - 1.0)
    }
}

/// Nonlinearity applied between hidden GAT layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Exponential Linear Unit with alpha = 1
    Elu,
    /// Rectified Linear Unit
    Relu,
    /// Leaky ReLU with the given negative slope
    LeakyRelu(f64),
    /// Hyperbolic tangent
    Tanh,
    /// Pass-through
    Identity,
}

impl Default for Activation {
    fn default() -> Self {
        Activation::Elu
    }
}

impl Activation {
    /// Apply activation function
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Self::Elu => elu(x, 1.0),
            Self::Relu => x.max(0.0),
            Self::LeakyRelu(slope) => leaky_relu(x, *slope),
            Self::Tanh => x.tanh(),
            Self::Identity => x,
        }
    }

    /// Apply elementwise, consuming the input
    pub fn apply_array<D: Dimension>(&self, x: Array<f64, D>) -> Array<f64, D> {
        match self {
            Self::Identity => x,
            _ => x.mapv_into(|v| self.apply(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_leaky_relu() {
        assert_eq!(leaky_relu(1.0, 0.2), 1.0);
        assert_eq!(leaky_relu(-1.0, 0.2), -0.2);
        assert_eq!(leaky_relu(0.0, 0.2), 0.0);
    }

    #[test]
    fn test_elu() {
        assert_eq!(elu(2.0, 1.0), 2.0);
        assert!((elu(-1.0, 1.0) - (-1.0f64).exp_m1()).abs() < 1e-12);
        assert!(elu(-50.0, 1.0) > -1.0 - 1e-12);
    }

    #[test]
    fn test_activation_array() {
        let x = array![[-2.0, 0.5], [1.0, -0.5]];

        let relu = Activation::Relu.apply_array(x.clone());
        assert_eq!(relu, array![[0.0, 0.5], [1.0, 0.0]]);

        let leaky = Activation::LeakyRelu(0.1).apply_array(x.clone());
        assert!((leaky[[0, 0]] + 0.2).abs() < 1e-12);

        let same = Activation::Identity.apply_array(x.clone());
        assert_eq!(same, x);
    }

    #[test]
    fn test_tanh_bounded() {
        for &v in &[-100.0, -1.0, 0.0, 3.0, 100.0] {
            let y = Activation::Tanh.apply(v);
            assert!((-1.0..=1.0).contains(&y));
        }
    }

    #[test]
    fn test_default_is_elu() {
        assert_eq!(Activation::default(), Activation::Elu);
    }
}
