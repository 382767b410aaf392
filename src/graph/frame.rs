//! Typed per-node and per-edge attribute tables
//!
//! Filled by one attention forward pass and handed back for inspection.

use ndarray::{Array2, Array3};

use super::Graph;
use crate::error::{GatError, Result};

/// Node attributes of one attention forward pass
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFrame {
    /// Projected per-head features [N, H, D']
    pub features: Array3<f64>,
    /// Source-side attention score per head [N, H]
    pub attn_src: Array2<f64>,
    /// Destination-side attention score per head [N, H]
    pub attn_dst: Array2<f64>,
}

/// Edge attributes of one attention forward pass
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeFrame {
    /// Unnormalized attention logits [E, H]
    pub logits: Array2<f64>,
    /// Softmax-normalized weights, grouped by destination [E, H]
    pub attn_weight: Array2<f64>,
    /// Weights after attention dropout [E, H]
    pub attn_dropped: Array2<f64>,
}

impl NodeFrame {
    pub fn num_heads(&self) -> usize {
        self.features.dim().1
    }

    /// Check every table has one row per graph node
    pub fn check(&self, graph: &Graph) -> Result<()> {
        let (n, h, _) = self.features.dim();
        if n != graph.num_nodes() {
            return Err(GatError::shape("node frame rows", graph.num_nodes(), n));
        }
        for (name, table) in [("attn_src", &self.attn_src), ("attn_dst", &self.attn_dst)] {
            if table.dim() != (n, h) {
                return Err(GatError::shape(name, (n, h), table.dim()));
            }
        }
        Ok(())
    }
}

impl EdgeFrame {
    pub fn num_heads(&self) -> usize {
        self.attn_weight.ncols()
    }

    /// Sum of normalized weights per destination node and head [N, H]
    ///
    /// Rows of nodes without incoming edges are zero.
    pub fn incoming_weight_sums(&self, graph: &Graph) -> Array2<f64> {
        let mut sums = Array2::zeros((graph.num_nodes(), self.num_heads()));
        for edge in graph.edges() {
            let mut row = sums.row_mut(edge.dst);
            row += &self.attn_weight.row(edge.id);
        }
        sums
    }
}
