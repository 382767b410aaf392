//! Graph Attention Network implementation
//!
//! Provides GAT layers and networks for node classification.

mod attention;
mod layer;
mod network;

pub use attention::{edge_logits, head_dot, AttentionVectors};
pub use layer::{GraphAttentionLayer, LayerOutput, LayerParams};
pub use network::{BoundNetwork, GraphAttentionNetwork};
