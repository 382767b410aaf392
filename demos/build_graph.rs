//! Build graphs for Graph Attention Networks
//!
//! Shows the ways to construct a topology and what a single attention layer
//! does with nodes that have no incoming edges.
//!
//! Run with: cargo run --example build_graph

use anyhow::Result;
use gat_nodes::config::LayerConfig;
use gat_nodes::gat::GraphAttentionLayer;
use gat_nodes::graph::{Graph, GraphBuilder};
use ndarray::{array, Array2, Axis};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== Graph Construction ===\n");

    let mut rng = StdRng::seed_from_u64(7);

    // 1. Explicit edge list
    println!("1. Edge list");
    let listed = Graph::from_edges(4, &[(0, 1), (2, 1), (1, 3)])?;
    println!("   Nodes: {}, Edges: {}", listed.num_nodes(), listed.num_edges());
    println!("   Without incoming edges: {:?}", listed.nodes_without_in_edges());

    // 2. Dense adjacency
    println!("\n2. Dense adjacency");
    let adj = array![[0.0, 1.0, 0.0], [1.0, 0.0, 1.0], [0.0, 1.0, 0.0]];
    let dense = Graph::from_dense(&adj)?;
    println!("   Edges: {}", dense.num_edges());
    for node in 0..dense.num_nodes() {
        let preds: Vec<usize> = dense.predecessors(node).collect();
        println!("   {} <- {:?}", node, preds);
    }

    // 3. Generated graphs
    println!("\n3. Fully connected and random graphs");
    let full = GraphBuilder::fully_connected(6);
    println!("   Fully connected: {} nodes, {} edges", full.num_nodes(), full.num_edges());
    let random = GraphBuilder::random(6, 0.7, &mut rng)?;
    println!(
        "   Random: {} edges, in-degrees {:?}",
        random.num_edges(),
        random.in_degrees().to_vec()
    );

    // 4. Self-loops
    println!("\n4. Self-loops");
    let looped = random.add_self_loops();
    println!("   With self-loops: {} edges", looped.num_edges());
    println!("   Without incoming edges: {:?}", looped.nodes_without_in_edges());

    // 5. Isolated nodes through one layer
    println!("\n5. Attention layer on the edge-list graph");
    let layer_input = Array2::random_using((4, 32), StandardNormal, &mut rng);
    for residual in [false, true] {
        let layer = GraphAttentionLayer::with_rng(
            LayerConfig::new(32, 32, 2).with_residual(residual),
            &mut rng,
        )?;
        let out = layer.forward(&listed, &layer_input)?;
        let norm0: f64 = out.index_axis(Axis(0), 0).mapv(|v| v * v).sum().sqrt();
        println!("   residual = {:<5} |h'(node 0)| = {:.3}", residual, norm0);
    }

    println!("\n=== Graph Construction Complete ===");
    Ok(())
}
