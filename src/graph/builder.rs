//! Graph construction methods
//!
//! Build node graphs for attention layers:
//! - Fully connected
//! - Random (distance-biased)

use rand::Rng;

use super::Graph;
use crate::error::{GatError, Result};

/// Graph builder for constructing attention graphs
pub struct GraphBuilder;

impl GraphBuilder {
    /// Build fully connected graph (no self-loops)
    ///
    /// All nodes are connected (let attention learn sparsity).
    pub fn fully_connected(n: usize) -> Graph {
        let capacity = n * n.saturating_sub(1);
        let mut src = Vec::with_capacity(capacity);
        let mut dst = Vec::with_capacity(capacity);
        for i in 0..n {
            for j in (0..n).filter(|&j| j != i) {
                src.push(i);
                dst.push(j);
            }
        }

        Graph::assemble(n, src, dst)
    }

    /// Build a random directed graph
    ///
    /// Edge `i -> j` appears with probability `p / (1 + |i - j|)`, so nearby
    /// indices are more likely to be connected.
    pub fn random<R: Rng + ?Sized>(n: usize, p: f64, rng: &mut R) -> Result<Graph> {
        if !(0.0..=1.0).contains(&p) {
            return Err(GatError::InvalidConfig(format!(
                "edge probability must be in [0, 1], got {}",
                p
            )));
        }

        let mut edges = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let distance = (i as i64 - j as i64).abs() as f64;
                    if rng.gen::<f64>() < p / (1.0 + distance) {
                        edges.push((i, j));
                    }
                }
            }
        }

        Graph::from_edges(n, &edges)
    }
}
