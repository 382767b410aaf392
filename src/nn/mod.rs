//! Dense tensor building blocks
//!
//! Projection, initialization, dropout and activations on `ndarray`, plus the
//! head reshapes shared by every attention layer.

mod activation;
mod dropout;
mod init;
mod linear;

pub use activation::{elu, leaky_relu, Activation};
pub use dropout::{Dropout, Regularizer};
pub use init::{xavier_normal, xavier_std, XAVIER_GAIN};
pub use linear::Linear;

use ndarray::{Array2, Array3, Axis};

use crate::error::{GatError, Result};

/// Reshape [N, H*D] into [N, H, D]
pub fn split_heads(x: Array2<f64>, num_heads: usize) -> Result<Array3<f64>> {
    let (n, width) = x.dim();
    if num_heads == 0 || width % num_heads != 0 {
        return Err(GatError::shape(
            "split heads",
            format!("width divisible by {}", num_heads),
            width,
        ));
    }
    let x = standard(x);
    Ok(x.into_shape((n, num_heads, width / num_heads))?)
}

/// Reshape [N, H, D] into [N, H*D]
pub fn flatten_heads(x: Array3<f64>) -> Result<Array2<f64>> {
    let (n, h, d) = x.dim();
    let x = standard(x);
    Ok(x.into_shape((n, h * d))?)
}

/// Average over the head axis: [N, H, D] -> [N, D]
pub fn mean_heads(x: &Array3<f64>) -> Result<Array2<f64>> {
    x.mean_axis(Axis(1))
        .ok_or_else(|| GatError::shape("mean over heads", "at least one head", 0))
}

fn standard<D: ndarray::Dimension>(x: ndarray::Array<f64, D>) -> ndarray::Array<f64, D> {
    if x.is_standard_layout() {
        x
    } else {
        x.as_standard_layout().into_owned()
    }
}
