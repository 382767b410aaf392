//! Attention mechanisms for GAT
//!
//! Per-head attention vectors, node-side scores and edge logits.

use ndarray::{s, Array2, Array3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GatError, Result};
use crate::graph::{Graph, NodeFrame};
use crate::nn::{leaky_relu, xavier_normal};

/// Left (source) and right (destination) attention vectors, one row per head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionVectors {
    /// Source-side vector [H, D']
    pub attn_l: Array2<f64>,
    /// Destination-side vector [H, D']
    pub attn_r: Array2<f64>,
}

impl AttentionVectors {
    /// Xavier-normal vectors with the fans of an (H, D', 1) tensor
    pub fn xavier<R: Rng + ?Sized>(
        num_heads: usize,
        out_dim: usize,
        gain: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let attn_l = xavier_normal((num_heads, out_dim), out_dim, num_heads, gain, rng)?;
        let attn_r = xavier_normal((num_heads, out_dim), out_dim, num_heads, gain, rng)?;
        Ok(Self { attn_l, attn_r })
    }

    pub fn num_heads(&self) -> usize {
        self.attn_l.nrows()
    }

    pub fn out_dim(&self) -> usize {
        self.attn_l.ncols()
    }

    pub fn num_parameters(&self) -> usize {
        self.attn_l.len() + self.attn_r.len()
    }

    /// Node-side attention scores `(a1, a2)`, each [N, H]
    pub fn node_scores(&self, features: &Array3<f64>) -> Result<(Array2<f64>, Array2<f64>)> {
        let (_, heads, dim) = features.dim();
        if (heads, dim) != self.attn_l.dim() || self.attn_l.dim() != self.attn_r.dim() {
            return Err(GatError::shape(
                "attention vectors",
                (heads, dim),
                (self.attn_l.dim(), self.attn_r.dim()),
            ));
        }
        Ok((
            head_dot(features, &self.attn_l),
            head_dot(features, &self.attn_r),
        ))
    }
}

/// Batched per-head dot product: `out[n, h] = features[n, h, :] · vectors[h, :]`
pub fn head_dot(features: &Array3<f64>, vectors: &Array2<f64>) -> Array2<f64> {
    let (n, heads, _) = features.dim();
    Array2::from_shape_fn((n, heads), |(i, h)| {
        features.slice(s![i, h, ..]).dot(&vectors.row(h))
    })
}

/// Unnormalized attention for every edge and head
///
/// `logit[e, h] = leaky_relu(attn_src[src(e), h] + attn_dst[dst(e), h])`
pub fn edge_logits(
    graph: &Graph,
    nodes: &NodeFrame,
    negative_slope: f64,
) -> Result<Array2<f64>> {
    nodes.check(graph)?;

    Ok(graph.apply_edges(nodes.num_heads(), |edge, mut row| {
        let src = nodes.attn_src.row(edge.src);
        let dst = nodes.attn_dst.row(edge.dst);
        for (h, logit) in row.iter_mut().enumerate() {
            *logit = leaky_relu(src[h] + dst[h], negative_slope);
        }
    }))
}
