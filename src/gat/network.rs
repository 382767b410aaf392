//! Graph Attention Network
//!
//! Stack of attention layers for node classification.

use std::path::Path;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::layer::GraphAttentionLayer;
use crate::config::NetworkConfig;
use crate::error::{GatError, Result};
use crate::graph::Graph;
use crate::nn::{flatten_heads, mean_heads};

/// Graph Attention Network
///
/// Hidden layers concatenate their heads and pass through the configured
/// activation; the last hidden output is squashed with tanh before the
/// output layer, whose heads are averaged into class logits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphAttentionNetwork {
    config: NetworkConfig,
    layers: Vec<GraphAttentionLayer>,
}

impl GraphAttentionNetwork {
    /// Create a new GAT network
    pub fn new(config: NetworkConfig) -> Result<Self> {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    /// Create a network initialized from the given RNG
    pub fn with_rng<R: Rng + ?Sized>(config: NetworkConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let layers = config
            .layer_configs()
            .into_iter()
            .map(|layer| GraphAttentionLayer::with_rng(layer, rng))
            .collect::<Result<Vec<_>>>()?;

        let network = Self { config, layers };
        info!(
            layers = network.num_layers(),
            parameters = network.num_parameters(),
            "built graph attention network"
        );
        Ok(network)
    }

    /// Inference forward pass: [N, in_dim] -> [N, num_classes]
    pub fn forward(&self, graph: &Graph, inputs: &Array2<f64>) -> Result<Array2<f64>> {
        self.run(graph, inputs, None::<&mut StdRng>)
    }

    /// Training forward pass with dropout drawn from `rng`
    pub fn forward_train<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        inputs: &Array2<f64>,
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        self.run(graph, inputs, Some(rng))
    }

    fn run<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        inputs: &Array2<f64>,
        mut rng: Option<&mut R>,
    ) -> Result<Array2<f64>> {
        let (output_layer, hidden) = self
            .layers
            .split_last()
            .ok_or_else(|| GatError::InvalidConfig("network has no layers".to_string()))?;

        let mut h = inputs.to_owned();
        for layer in hidden {
            let out = layer.run(graph, &h, rng.as_deref_mut())?.output;
            h = self.config.activation.apply_array(flatten_heads(out)?);
        }
        h.mapv_inplace(f64::tanh);

        let out = output_layer.run(graph, &h, rng.as_deref_mut())?.output;
        mean_heads(&out)
    }

    /// Bind the network to a graph for repeated forward calls
    pub fn bind<'g>(&self, graph: &'g Graph) -> BoundNetwork<'_, 'g> {
        BoundNetwork {
            network: self,
            graph,
        }
    }

    pub fn layers(&self) -> &[GraphAttentionLayer] {
        &self.layers
    }

    /// Mutable layers for an external optimizer
    pub fn layers_mut(&mut self) -> &mut [GraphAttentionLayer] {
        &mut self.layers
    }

    /// Get number of layers
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn num_classes(&self) -> usize {
        self.config.num_classes
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Get number of parameters
    pub fn num_parameters(&self) -> usize {
        self.layers.iter().map(|l| l.num_parameters()).sum()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    ///
    /// The layer stack must match what the stored config would build.
    pub fn from_json(json: &str) -> Result<Self> {
        let network: Self = serde_json::from_str(json)?;
        network.check_stack()?;
        Ok(network)
    }

    /// Write a JSON checkpoint
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a JSON checkpoint
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn check_stack(&self) -> Result<()> {
        self.config.validate()?;

        let expected = self.config.layer_configs();
        if expected.len() != self.layers.len() {
            return Err(GatError::InvalidConfig(format!(
                "checkpoint has {} layers, config expects {}",
                self.layers.len(),
                expected.len()
            )));
        }
        for (layer, config) in self.layers.iter().zip(&expected) {
            if layer.config() != config {
                return Err(GatError::InvalidConfig(format!(
                    "layer {} does not match its network config",
                    layer.name()
                )));
            }
            layer.params().check(config)?;
        }

        debug!(layers = self.layers.len(), "checkpoint layer stack verified");
        Ok(())
    }
}

/// A network paired with the graph it currently runs on
///
/// Layers never store a graph; the handle only decides which graph is passed
/// to them, so swapping it leaves nothing of the old topology behind.
#[derive(Debug, Clone, Copy)]
pub struct BoundNetwork<'n, 'g> {
    network: &'n GraphAttentionNetwork,
    graph: &'g Graph,
}

impl<'n, 'g> BoundNetwork<'n, 'g> {
    /// Rebind every layer to a different graph
    pub fn set_g(&mut self, graph: &'g Graph) {
        debug!(
            from_nodes = self.graph.num_nodes(),
            to_nodes = graph.num_nodes(),
            to_edges = graph.num_edges(),
            "rebinding network graph"
        );
        self.graph = graph;
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn network(&self) -> &'n GraphAttentionNetwork {
        self.network
    }

    /// Inference forward pass on the bound graph
    pub fn forward(&self, inputs: &Array2<f64>) -> Result<Array2<f64>> {
        self.network.forward(self.graph, inputs)
    }

    /// Training forward pass on the bound graph
    pub fn forward_train<R: Rng + ?Sized>(
        &self,
        inputs: &Array2<f64>,
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        self.network.forward_train(self.graph, inputs, rng)
    }
}
