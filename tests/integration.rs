//! Integration tests for GAT layers and networks

use gat_nodes::gat::{AttentionVectors, LayerParams};
use gat_nodes::nn::{flatten_heads, Activation, Linear};
use gat_nodes::{Graph, GraphAttentionLayer, GraphAttentionNetwork, GraphBuilder};
use gat_nodes::{LayerConfig, NetworkConfig};
use ndarray::{array, s, Array2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Layer with identity projections and the given attention vectors
fn identity_layer(dim: usize, attn_l: Array2<f64>, attn_r: Array2<f64>) -> GraphAttentionLayer {
    let config = LayerConfig::new(dim, dim, 1);
    let params = LayerParams {
        fc1: Linear::from_weight(Array2::eye(dim)),
        fc2: Linear::from_weight(Array2::eye(dim)),
        attn: AttentionVectors { attn_l, attn_r },
        res_fc: None,
    };
    GraphAttentionLayer::from_params(config, params).unwrap()
}

#[test]
fn test_hand_computed_attention() {
    // 0 -> 1 and 2 -> 1; only the source score matters
    let graph = Graph::from_edges(3, &[(0, 1), (2, 1)]).unwrap();
    let layer = identity_layer(2, array![[1.0, 0.0]], array![[0.0, 0.0]]);
    let x = array![[1.0, 0.0], [0.5, 0.5], [0.0, 1.0]];

    let out = layer.forward(&graph, &x).unwrap();

    // logits: 1.0 for 0 -> 1, 0.0 for 2 -> 1
    let e = std::f64::consts::E;
    let w0 = e / (e + 1.0);
    let w2 = 1.0 / (e + 1.0);
    assert!((out[[1, 0, 0]] - w0).abs() < 1e-12);
    assert!((out[[1, 0, 1]] - w2).abs() < 1e-12);

    // Nodes 0 and 2 have no incoming edges
    assert_eq!(out.slice(s![0, 0, ..]).to_vec(), vec![0.0, 0.0]);
    assert_eq!(out.slice(s![2, 0, ..]).to_vec(), vec![0.0, 0.0]);
}

#[test]
fn test_edge_logits_add_source_and_destination_scores() {
    let graph = Graph::from_edges(2, &[(0, 1), (1, 1)]).unwrap();
    let layer = identity_layer(1, array![[1.0]], array![[0.0]]);
    let x = array![[2.0], [3.0]];

    let out = layer.forward_with_attention(&graph, &x).unwrap();

    assert_eq!(out.edges.logits, array![[2.0], [3.0]]);
    let sums = out.edges.incoming_weight_sums(&graph);
    assert!((sums[[1, 0]] - 1.0).abs() < 1e-12);
}

#[test]
fn test_convex_combination_scenario() {
    let mut rng = StdRng::seed_from_u64(10);
    let graph = Graph::from_edges(3, &[(0, 1), (2, 1)]).unwrap();
    let layer = GraphAttentionLayer::with_rng(LayerConfig::new(4, 4, 1), &mut rng).unwrap();
    let x = Array2::random_using((3, 4), Uniform::new(-1.0, 1.0), &mut rng);

    let out = layer.forward_with_attention(&graph, &x).unwrap();
    let w0 = out.edges.attn_weight[[0, 0]];
    let w2 = out.edges.attn_weight[[1, 0]];

    assert!(w0 > 0.0 && w2 > 0.0);
    assert!((w0 + w2 - 1.0).abs() < 1e-12);

    let ft = &out.nodes.features;
    let expected = &ft.slice(s![0, 0, ..]) * w0 + &ft.slice(s![2, 0, ..]) * w2;
    for (got, want) in out.output.slice(s![1, 0, ..]).iter().zip(expected.iter()) {
        assert!((got - want).abs() < 1e-12);
    }
}

#[test]
fn test_weights_sum_to_one_per_head() {
    let mut rng = StdRng::seed_from_u64(11);
    let graph = GraphBuilder::random(12, 0.9, &mut rng).unwrap();
    let layer = GraphAttentionLayer::with_rng(LayerConfig::new(5, 3, 4), &mut rng).unwrap();
    let x = Array2::random_using((12, 5), Uniform::new(-2.0, 2.0), &mut rng);

    let out = layer.forward_with_attention(&graph, &x).unwrap();
    let sums = out.edges.incoming_weight_sums(&graph);

    for v in 0..12 {
        let expected = if graph.in_degree(v) > 0 { 1.0 } else { 0.0 };
        for h in 0..4 {
            assert!((sums[[v, h]] - expected).abs() < 1e-9);
        }
    }
}

#[test]
fn test_identity_residual() {
    let mut rng = StdRng::seed_from_u64(12);
    let graph = Graph::from_edges(2, &[(0, 1)]).unwrap();
    let config = LayerConfig::new(3, 3, 2).with_residual(true);
    let with_res = GraphAttentionLayer::with_rng(config.clone(), &mut rng).unwrap();
    let without_res = GraphAttentionLayer::from_params(
        config.with_residual(false),
        with_res.params().clone(),
    )
    .unwrap();
    let x = Array2::random_using((2, 3), Uniform::new(-1.0, 1.0), &mut rng);

    let res = with_res.forward(&graph, &x).unwrap();
    let plain = without_res.forward(&graph, &x).unwrap();
    let diff = &res - &plain;

    // Input is broadcast across both heads
    for v in 0..2 {
        for h in 0..2 {
            for d in 0..3 {
                assert!((diff[[v, h, d]] - x[[v, d]]).abs() < 1e-12);
            }
        }
    }
    // Node 0 has no incoming edge: output is its own input
    for h in 0..2 {
        assert_eq!(res.slice(s![0, h, ..]).to_vec(), x.row(0).to_vec());
    }
}

#[test]
fn test_projected_residual_on_isolated_node() {
    let mut rng = StdRng::seed_from_u64(13);
    let graph = Graph::from_edges(3, &[(0, 1)]).unwrap();
    let layer =
        GraphAttentionLayer::with_rng(LayerConfig::new(4, 2, 3).with_residual(true), &mut rng)
            .unwrap();
    let x = Array2::random_using((3, 4), Uniform::new(-1.0, 1.0), &mut rng);

    let out = layer.forward(&graph, &x).unwrap();
    let res_fc = layer.params().res_fc.as_ref().unwrap();
    let projected = res_fc.forward(&x).unwrap();

    // Node 2 is isolated: output equals the projected input, head by head
    for h in 0..3 {
        for d in 0..2 {
            assert!((out[[2, h, d]] - projected[[2, h * 2 + d]]).abs() < 1e-12);
        }
    }
}

#[test]
fn test_isolated_node_without_residual_is_zero() {
    let mut rng = StdRng::seed_from_u64(14);
    let graph = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 0)]).unwrap();
    let layer = GraphAttentionLayer::with_rng(LayerConfig::new(3, 5, 2), &mut rng).unwrap();
    let x = Array2::random_using((4, 3), Uniform::new(-1.0, 1.0), &mut rng);

    let out = layer.forward(&graph, &x).unwrap();

    assert!(out.index_axis(Axis(0), 3).iter().all(|&v| v == 0.0));
}

#[test]
fn test_layer_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(15);
    let graph = GraphBuilder::fully_connected(6).add_self_loops();
    let layer = GraphAttentionLayer::with_rng(LayerConfig::new(4, 4, 2), &mut rng).unwrap();
    let x = Array2::random_using((6, 4), Uniform::new(-1.0, 1.0), &mut rng);

    let a = layer.forward(&graph, &x).unwrap();
    let b = layer.forward(&graph, &x).unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_network_output_shape() {
    let mut rng = StdRng::seed_from_u64(16);
    let config = NetworkConfig::minimal(6, 3)
        .with_heads(vec![4, 4, 2, 1])
        .with_hidden(5)
        .with_residual(true)
        .with_activation(Activation::Relu);
    let gat = GraphAttentionNetwork::with_rng(config, &mut rng).unwrap();
    let graph = GraphBuilder::random(9, 0.7, &mut rng).unwrap();
    let x = Array2::random_using((9, 6), Uniform::new(-1.0, 1.0), &mut rng);

    let logits = gat.forward(&graph, &x).unwrap();

    assert_eq!(gat.num_layers(), 4);
    assert_eq!(logits.dim(), (9, 3));
}

#[test]
fn test_network_matches_manual_composition() {
    let mut rng = StdRng::seed_from_u64(17);
    let gat = GraphAttentionNetwork::with_rng(NetworkConfig::minimal(4, 2), &mut rng).unwrap();
    let graph = GraphBuilder::fully_connected(5).add_self_loops();
    let x = Array2::random_using((5, 4), Uniform::new(-1.0, 1.0), &mut rng);

    let hidden = gat.layers()[0].forward(&graph, &x).unwrap();
    let hidden = flatten_heads(hidden)
        .unwrap()
        .mapv(|v| Activation::Elu.apply(v).tanh());
    let out = gat.layers()[1].forward(&graph, &hidden).unwrap();
    let expected = out.mean_axis(Axis(1)).unwrap();

    let logits = gat.forward(&graph, &x).unwrap();
    for (a, b) in logits.iter().zip(expected.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[test]
fn test_rebinding_follows_new_topology() {
    let mut rng = StdRng::seed_from_u64(18);
    let gat = GraphAttentionNetwork::with_rng(NetworkConfig::minimal(3, 2), &mut rng).unwrap();
    let x = Array2::random_using((4, 3), Uniform::new(-1.0, 1.0), &mut rng);

    let train_graph = GraphBuilder::fully_connected(4);
    // Node 3 has no incoming edges here
    let test_graph = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 0), (3, 0)]).unwrap();

    let mut bound = gat.bind(&train_graph);
    let before = bound.forward(&x).unwrap();

    bound.set_g(&test_graph);
    let after = bound.forward(&x).unwrap();

    assert_eq!(after, gat.forward(&test_graph, &x).unwrap());
    assert_ne!(after, before);
    // Without residuals an isolated node ends at zero logits
    assert!(after.row(3).iter().all(|&v| v == 0.0));
}

#[test]
fn test_rebinding_to_graph_of_different_size() {
    let mut rng = StdRng::seed_from_u64(19);
    let gat = GraphAttentionNetwork::with_rng(NetworkConfig::minimal(3, 2), &mut rng).unwrap();
    let small = GraphBuilder::fully_connected(3);
    let large = GraphBuilder::fully_connected(6);

    let mut bound = gat.bind(&small);
    assert_eq!(bound.forward(&Array2::ones((3, 3))).unwrap().dim(), (3, 2));

    bound.set_g(&large);
    assert!(bound.forward(&Array2::ones((3, 3))).is_err());
    assert_eq!(bound.forward(&Array2::ones((6, 3))).unwrap().dim(), (6, 2));
}

#[test]
fn test_external_parameter_update_changes_output() {
    let mut rng = StdRng::seed_from_u64(20);
    let mut gat =
        GraphAttentionNetwork::with_rng(NetworkConfig::minimal(3, 2), &mut rng).unwrap();
    let graph = GraphBuilder::fully_connected(4);
    let x = Array2::random_using((4, 3), Uniform::new(-1.0, 1.0), &mut rng);

    let before = gat.forward(&graph, &x).unwrap();
    gat.layers_mut()[1].params_mut().fc2.weight_mut().mapv_inplace(|w| w * 2.0);
    let after = gat.forward(&graph, &x).unwrap();

    assert_ne!(before, after);
}

#[test]
fn test_checkpoint_round_trip() {
    let mut rng = StdRng::seed_from_u64(21);
    let gat = GraphAttentionNetwork::with_rng(NetworkConfig::minimal(3, 2), &mut rng).unwrap();
    let graph = GraphBuilder::fully_connected(4);
    let x = Array2::random_using((4, 3), Uniform::new(-1.0, 1.0), &mut rng);

    let path = std::env::temp_dir().join("gat_nodes_checkpoint_test.json");
    gat.save(&path).unwrap();
    let restored = GraphAttentionNetwork::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(gat.forward(&graph, &x).unwrap(), restored.forward(&graph, &x).unwrap());
}

#[test]
fn test_config_from_toml_file() {
    let path = std::env::temp_dir().join("gat_nodes_integration_config.toml");
    std::fs::write(
        &path,
        r#"
num_layers = 3
in_dim = 12
num_hidden = 6
num_classes = 5
heads = [4, 4, 1]
activation = "elu"
feat_drop = 0.1
attn_drop = 0.1
alpha = 0.2
residual = true
"#,
    )
    .unwrap();

    let config = NetworkConfig::from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.heads, vec![4, 4, 1]);
    let gat = GraphAttentionNetwork::new(config).unwrap();
    assert_eq!(gat.layers()[2].in_dim(), 24);
}
