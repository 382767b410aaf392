//! Graph Attention Layer implementation
//!
//! Single layer of Graph Attention Network.

use ndarray::{Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::attention::{edge_logits, AttentionVectors};
use crate::config::LayerConfig;
use crate::error::{GatError, Result};
use crate::graph::{EdgeFrame, Graph, Message, NodeFrame, Reduce};
use crate::nn::{leaky_relu, split_heads, Dropout, Linear, Regularizer, XAVIER_GAIN};

/// Learnable parameters of one attention layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerParams {
    /// First projection [D, D]
    pub fc1: Linear,
    /// Second projection [D, H*D']
    pub fc2: Linear,
    /// Per-head attention vectors
    pub attn: AttentionVectors,
    /// Residual projection [D, H*D'], present only when residual is on and
    /// the input and per-head output widths differ
    pub res_fc: Option<Linear>,
}

impl LayerParams {
    /// Xavier-normal parameters for the given layer shape
    pub fn xavier<R: Rng + ?Sized>(config: &LayerConfig, rng: &mut R) -> Result<Self> {
        let fc1 = Linear::xavier(config.in_dim, config.in_dim, XAVIER_GAIN, rng)?;
        let fc2 = Linear::xavier(config.in_dim, config.output_dim(), XAVIER_GAIN, rng)?;
        let attn = AttentionVectors::xavier(config.num_heads, config.out_dim, XAVIER_GAIN, rng)?;
        let res_fc = if config.needs_residual_projection() {
            Some(Linear::xavier(config.in_dim, config.output_dim(), XAVIER_GAIN, rng)?)
        } else {
            None
        };

        Ok(Self {
            fc1,
            fc2,
            attn,
            res_fc,
        })
    }

    /// Check every tensor against the layer shape
    pub fn check(&self, config: &LayerConfig) -> Result<()> {
        let (d, hd) = (config.in_dim, config.output_dim());
        let expected_attn = (config.num_heads, config.out_dim);

        if self.fc1.weight().dim() != (d, d) {
            return Err(GatError::shape("fc1 weight", (d, d), self.fc1.weight().dim()));
        }
        if self.fc2.weight().dim() != (d, hd) {
            return Err(GatError::shape("fc2 weight", (d, hd), self.fc2.weight().dim()));
        }
        for (name, vector) in [("attn_l", &self.attn.attn_l), ("attn_r", &self.attn.attn_r)] {
            if vector.dim() != expected_attn {
                return Err(GatError::shape(name, expected_attn, vector.dim()));
            }
        }
        match (&self.res_fc, config.needs_residual_projection()) {
            (Some(res_fc), true) if res_fc.weight().dim() == (d, hd) => Ok(()),
            (Some(res_fc), true) => Err(GatError::shape("res_fc weight", (d, hd), res_fc.weight().dim())),
            (None, false) => Ok(()),
            (Some(_), false) => Err(GatError::InvalidConfig(format!(
                "layer {}: res_fc given but residual projection not used",
                config.name
            ))),
            (None, true) => Err(GatError::InvalidConfig(format!(
                "layer {}: residual with in_dim != out_dim needs res_fc",
                config.name
            ))),
        }
    }

    pub fn num_parameters(&self) -> usize {
        self.fc1.num_parameters()
            + self.fc2.num_parameters()
            + self.attn.num_parameters()
            + self.res_fc.as_ref().map_or(0, Linear::num_parameters)
    }
}

/// Result of a forward pass with its intermediate attention tables
#[derive(Debug, Clone)]
pub struct LayerOutput {
    /// Layer output [N, H, D']
    pub output: Array3<f64>,
    /// Node attributes computed on the way
    pub nodes: NodeFrame,
    /// Edge attributes computed on the way
    pub edges: EdgeFrame,
}

/// Graph Attention Layer
///
/// Projects node features twice, scores every edge from its endpoints,
/// normalizes the scores over each node's incoming edges and sums the
/// attention-weighted source features. The graph is supplied per call.
///
/// Serializes as its config and parameters. Loading goes through
/// [`GraphAttentionLayer::from_params`], which rebuilds dropout from the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LayerRecord", into = "LayerRecord")]
pub struct GraphAttentionLayer {
    config: LayerConfig,
    params: LayerParams,
    feat_drop: Dropout,
    attn_drop: Dropout,
}

/// Serialized form of a [`GraphAttentionLayer`]
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayerRecord {
    config: LayerConfig,
    params: LayerParams,
}

impl TryFrom<LayerRecord> for GraphAttentionLayer {
    type Error = GatError;

    fn try_from(record: LayerRecord) -> Result<Self> {
        Self::from_params(record.config, record.params)
    }
}

impl From<GraphAttentionLayer> for LayerRecord {
    fn from(layer: GraphAttentionLayer) -> Self {
        LayerRecord {
            config: layer.config,
            params: layer.params,
        }
    }
}

impl GraphAttentionLayer {
    /// Create a new Graph Attention Layer
    pub fn new(config: LayerConfig) -> Result<Self> {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    /// Create a layer initialized from the given RNG
    pub fn with_rng<R: Rng + ?Sized>(config: LayerConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let params = LayerParams::xavier(&config, rng)?;
        Self::from_params(config, params)
    }

    /// Create a layer from existing parameters
    pub fn from_params(config: LayerConfig, params: LayerParams) -> Result<Self> {
        config.validate()?;
        params.check(&config)?;

        let feat_drop = Dropout::new(config.feat_drop)?;
        let attn_drop = Dropout::new(config.attn_drop)?;

        debug!(
            layer = %config.name,
            in_dim = config.in_dim,
            out_dim = config.out_dim,
            heads = config.num_heads,
            residual = config.residual,
            "built attention layer"
        );

        Ok(Self {
            config,
            params,
            feat_drop,
            attn_drop,
        })
    }

    /// Inference forward pass: [N, in_dim] -> [N, H, out_dim]
    pub fn forward(&self, graph: &Graph, inputs: &Array2<f64>) -> Result<Array3<f64>> {
        Ok(self.run(graph, inputs, None::<&mut StdRng>)?.output)
    }

    /// Training forward pass with dropout drawn from `rng`
    pub fn forward_train<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        inputs: &Array2<f64>,
        rng: &mut R,
    ) -> Result<Array3<f64>> {
        Ok(self.run(graph, inputs, Some(rng))?.output)
    }

    /// Inference forward pass that also returns the node and edge tables
    pub fn forward_with_attention(
        &self,
        graph: &Graph,
        inputs: &Array2<f64>,
    ) -> Result<LayerOutput> {
        self.run(graph, inputs, None::<&mut StdRng>)
    }

    pub(crate) fn run<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        inputs: &Array2<f64>,
        mut rng: Option<&mut R>,
    ) -> Result<LayerOutput> {
        self.check_input(graph, inputs)?;

        let heads = self.config.num_heads;
        let alpha = self.config.alpha;

        let h = self
            .feat_drop
            .regularize(inputs.to_owned(), rng.as_deref_mut());

        let h2 = self
            .params
            .fc1
            .forward(&h)?
            .mapv_into(|x| leaky_relu(x, alpha));
        let features = split_heads(self.params.fc2.forward(&h2)?, heads)?;
        let (attn_src, attn_dst) = self.params.attn.node_scores(&features)?;
        let nodes = NodeFrame {
            features,
            attn_src,
            attn_dst,
        };

        let logits = edge_logits(graph, &nodes, alpha)?;
        let attn_weight = graph.edge_softmax(&logits)?;
        let attn_dropped = self
            .attn_drop
            .regularize(attn_weight.clone(), rng.as_deref_mut());
        let edges = EdgeFrame {
            logits,
            attn_weight,
            attn_dropped,
        };

        // The softmax already normalizes per destination, so the weighted sum
        // is not divided again.
        let mut output = graph.update_all(
            &nodes.features,
            Some(&edges.attn_dropped),
            Message::SrcMulEdge,
            Reduce::Sum,
        )?;

        if self.config.residual {
            match &self.params.res_fc {
                Some(res_fc) => output += &split_heads(res_fc.forward(&h)?, heads)?,
                None => output += &h.view().insert_axis(Axis(1)),
            }
        }

        trace!(
            layer = %self.config.name,
            nodes = graph.num_nodes(),
            edges = graph.num_edges(),
            without_in_edges = graph.nodes_without_in_edges().len(),
            training = rng.is_some(),
            "attention forward"
        );

        Ok(LayerOutput {
            output,
            nodes,
            edges,
        })
    }

    fn check_input(&self, graph: &Graph, inputs: &Array2<f64>) -> Result<()> {
        let expected = (graph.num_nodes(), self.config.in_dim);
        if inputs.dim() != expected {
            return Err(GatError::shape(
                format!("layer {} input", self.config.name),
                expected,
                inputs.dim(),
            ));
        }
        Ok(())
    }

    /// Layer identifier
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn in_dim(&self) -> usize {
        self.config.in_dim
    }

    /// Output dimension per head
    pub fn out_dim(&self) -> usize {
        self.config.out_dim
    }

    pub fn num_heads(&self) -> usize {
        self.config.num_heads
    }

    /// Get output dimension once heads are flattened
    pub fn output_dim(&self) -> usize {
        self.config.output_dim()
    }

    pub fn has_residual(&self) -> bool {
        self.config.residual
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn params(&self) -> &LayerParams {
        &self.params
    }

    /// Mutable parameters for an external optimizer
    pub fn params_mut(&mut self) -> &mut LayerParams {
        &mut self.params
    }

    pub fn feat_drop(&self) -> Dropout {
        self.feat_drop
    }

    pub fn attn_drop(&self) -> Dropout {
        self.attn_drop
    }

    /// Get number of parameters
    pub fn num_parameters(&self) -> usize {
        self.params.num_parameters()
    }
}
