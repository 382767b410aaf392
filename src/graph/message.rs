//! Message passing primitives
//!
//! Per-edge computation (`apply_edges`), per-destination normalization
//! (`edge_softmax`) and message + reduce (`update_all`).

use ndarray::{Array2, Array3, ArrayViewMut1, Axis};
use serde::{Deserialize, Serialize};

use super::sparse::{Edge, Graph};
use crate::error::{GatError, Result};

/// Message computed on each edge from its source node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// M(u -> v) = h_u
    CopySrc,
    /// M(u -> v) = h_u * e_uv, one edge scalar per head
    SrcMulEdge,
}

/// Reduction of incoming messages at the destination node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reduce {
    /// Sum all messages
    Sum,
    /// Average all messages
    Mean,
    /// Element-wise maximum
    Max,
}

impl Graph {
    /// Compute a `width`-wide row for every edge from its endpoints
    ///
    /// Rows are written in edge-id order.
    pub fn apply_edges<F>(&self, width: usize, mut edge_fn: F) -> Array2<f64>
    where
        F: FnMut(Edge, ArrayViewMut1<f64>),
    {
        let mut out = Array2::zeros((self.num_edges(), width));
        for (edge, row) in self.edges().zip(out.axis_iter_mut(Axis(0))) {
            edge_fn(edge, row);
        }
        out
    }

    /// Softmax of edge scores over the incoming edges of each node, per column
    pub fn edge_softmax(&self, logits: &Array2<f64>) -> Result<Array2<f64>> {
        if logits.nrows() != self.num_edges() {
            return Err(GatError::shape(
                "edge softmax rows",
                self.num_edges(),
                logits.nrows(),
            ));
        }

        let mut out = Array2::zeros(logits.raw_dim());
        for v in 0..self.num_nodes() {
            let edges = self.in_edges(v);
            if edges.is_empty() {
                continue;
            }

            for head in 0..logits.ncols() {
                let scores: Vec<f64> = edges.iter().map(|&e| logits[[e, head]]).collect();
                for (&e, alpha) in edges.iter().zip(softmax(&scores)) {
                    out[[e, head]] = alpha;
                }
            }
        }

        Ok(out)
    }

    /// Send a message along every edge and reduce at each destination
    ///
    /// `node_data` is [N, H, D]; `edge_data` is [E, H] and is required for
    /// [`Message::SrcMulEdge`]. Nodes without incoming edges get zeros.
    pub fn update_all(
        &self,
        node_data: &Array3<f64>,
        edge_data: Option<&Array2<f64>>,
        message: Message,
        reduce: Reduce,
    ) -> Result<Array3<f64>> {
        let (n, heads, dim) = node_data.dim();
        if n != self.num_nodes() {
            return Err(GatError::shape("message source rows", self.num_nodes(), n));
        }

        let edge_data = match (message, edge_data) {
            (Message::SrcMulEdge, None) => {
                return Err(GatError::shape("edge message data", (self.num_edges(), heads), "none"));
            }
            (Message::SrcMulEdge, Some(e)) if e.dim() != (self.num_edges(), heads) => {
                return Err(GatError::shape(
                    "edge message data",
                    (self.num_edges(), heads),
                    e.dim(),
                ));
            }
            (Message::SrcMulEdge, Some(e)) => Some(e),
            (Message::CopySrc, _) => None,
        };

        let mut out = Array3::zeros((n, heads, dim));
        for v in 0..n {
            let edges = self.in_edges(v);
            if edges.is_empty() {
                continue;
            }

            let mut acc = out.index_axis_mut(Axis(0), v);
            if reduce == Reduce::Max {
                acc.fill(f64::NEG_INFINITY);
            }

            for &e in edges {
                let src = node_data.index_axis(Axis(0), self.sources()[e]);
                for head in 0..heads {
                    let scale = edge_data.map_or(1.0, |w| w[[e, head]]);
                    let msg = src.index_axis(Axis(0), head);
                    let mut slot = acc.index_axis_mut(Axis(0), head);
                    match reduce {
                        Reduce::Sum | Reduce::Mean => slot.scaled_add(scale, &msg),
                        Reduce::Max => {
                            slot.zip_mut_with(&msg, |a, &m| *a = a.max(scale * m))
                        }
                    }
                }
            }

            if reduce == Reduce::Mean {
                acc /= edges.len() as f64;
            }
        }

        Ok(out)
    }
}

/// Softmax function
fn softmax(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }

    // Numerical stability: subtract max
    let max_score = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp_scores: Vec<f64> = scores.iter().map(|&s| (s - max_score).exp()).collect();
    let sum: f64 = exp_scores.iter().sum();

    exp_scores.into_iter().map(|e| e / sum).collect()
}
