//! Graph Attention Networks for Node Classification
//!
//! This crate provides a Graph Attention Network (GAT) layer and a stacked
//! multi-layer GAT model, written as per-node and per-edge tensor operations
//! over a small message-passing graph engine.
//!
//! # Features
//!
//! - **Graph Engine**: Static directed topology with `apply_edges`,
//!   `edge_softmax` and `update_all` (message + reduce)
//! - **Attention Layer**: Two projections, per-head edge attention,
//!   destination-wise softmax, weighted aggregation, optional residual
//! - **Stacked Model**: Hidden layers with concatenated heads, tanh before
//!   the output layer, head-averaged class logits
//! - **Graph Binding**: Swap the graph a model runs on between calls
//!
//! # Example
//!
//! ```rust,no_run
//! use gat_nodes::{config::NetworkConfig, gat::GraphAttentionNetwork, graph::Graph};
//! use ndarray::Array2;
//!
//! fn main() -> gat_nodes::Result<()> {
//!     let graph = Graph::from_edges(3, &[(0, 1), (2, 1), (1, 0)])?.add_self_loops();
//!     let features = Array2::<f64>::ones((3, 16));
//!
//!     let gat = GraphAttentionNetwork::new(NetworkConfig::default())?;
//!     let logits = gat.forward(&graph, &features)?;
//!     assert_eq!(logits.dim(), (3, 3));
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod gat;
pub mod graph;
pub mod nn;

// Re-export commonly used types
pub use config::{LayerConfig, NetworkConfig};
pub use error::{GatError, Result};
pub use gat::{BoundNetwork, GraphAttentionLayer, GraphAttentionNetwork};
pub use graph::{Graph, GraphBuilder};
