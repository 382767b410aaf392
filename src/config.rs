//! Hyperparameters for attention layers and stacked networks

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GatError, Result};
use crate::nn::Activation;

/// Configuration of a single graph attention layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Input feature dimension
    pub in_dim: usize,
    /// Output feature dimension per head
    pub out_dim: usize,
    /// Number of attention heads
    pub num_heads: usize,
    /// Feature dropout probability
    pub feat_drop: f64,
    /// Attention dropout probability
    pub attn_drop: f64,
    /// Negative slope of the LeakyReLU
    pub alpha: f64,
    /// Layer identifier
    pub name: String,
    /// Add a residual connection
    pub residual: bool,
}

impl LayerConfig {
    /// Create a config with no dropout, slope 0.2 and no residual
    pub fn new(in_dim: usize, out_dim: usize, num_heads: usize) -> Self {
        Self {
            in_dim,
            out_dim,
            num_heads,
            feat_drop: 0.0,
            attn_drop: 0.0,
            alpha: 0.2,
            name: "0".to_string(),
            residual: false,
        }
    }

    /// Builder method: set both dropout probabilities
    pub fn with_dropout(mut self, feat_drop: f64, attn_drop: f64) -> Self {
        self.feat_drop = feat_drop;
        self.attn_drop = attn_drop;
        self
    }

    /// Builder method: set LeakyReLU slope
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Builder method: set layer identifier
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder method: toggle residual connection
    pub fn with_residual(mut self, residual: bool) -> Self {
        self.residual = residual;
        self
    }

    /// Width of the flattened layer output
    pub fn output_dim(&self) -> usize {
        self.num_heads * self.out_dim
    }

    /// Residual needs a learned projection
    pub fn needs_residual_projection(&self) -> bool {
        self.residual && self.in_dim != self.out_dim
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.in_dim == 0 || self.out_dim == 0 {
            return Err(GatError::InvalidConfig(format!(
                "layer {}: dimensions must be positive (in_dim={}, out_dim={})",
                self.name, self.in_dim, self.out_dim
            )));
        }
        if self.num_heads == 0 {
            return Err(GatError::InvalidConfig(format!(
                "layer {}: num_heads must be at least 1",
                self.name
            )));
        }
        check_dropout(&self.name, "feat_drop", self.feat_drop)?;
        check_dropout(&self.name, "attn_drop", self.attn_drop)?;
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(GatError::InvalidConfig(format!(
                "layer {}: alpha must be positive, got {}",
                self.name, self.alpha
            )));
        }
        Ok(())
    }
}

fn check_dropout(layer: &str, field: &str, p: f64) -> Result<()> {
    if !(0.0..1.0).contains(&p) {
        return Err(GatError::InvalidConfig(format!(
            "layer {}: {} must be in [0, 1), got {}",
            layer, field, p
        )));
    }
    Ok(())
}

/// Configuration of a stacked GAT model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of attention layers, output layer included
    pub num_layers: usize,
    /// Input feature dimension
    pub in_dim: usize,
    /// Hidden dimension per head
    pub num_hidden: usize,
    /// Number of output classes
    pub num_classes: usize,
    /// Heads per layer (length = num_layers)
    pub heads: Vec<usize>,
    /// Nonlinearity between hidden layers
    #[serde(default)]
    pub activation: Activation,
    /// Feature dropout probability
    pub feat_drop: f64,
    /// Attention dropout probability
    pub attn_drop: f64,
    /// Negative slope of the LeakyReLU
    pub alpha: f64,
    /// Residual connections on layers after the first
    pub residual: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            num_layers: 2,
            in_dim: 16,
            num_hidden: 8,
            num_classes: 3,
            heads: vec![8, 1],
            activation: Activation::Elu,
            feat_drop: 0.6,
            attn_drop: 0.6,
            alpha: 0.2,
            residual: false,
        }
    }
}

impl NetworkConfig {
    /// Create a minimal config for testing
    pub fn minimal(in_dim: usize, num_classes: usize) -> Self {
        Self {
            num_layers: 2,
            in_dim,
            num_hidden: 4,
            num_classes,
            heads: vec![2, 1],
            activation: Activation::Elu,
            feat_drop: 0.0,
            attn_drop: 0.0,
            alpha: 0.2,
            residual: false,
        }
    }

    /// Builder method: set heads (also sets num_layers)
    pub fn with_heads(mut self, heads: Vec<usize>) -> Self {
        self.num_layers = heads.len();
        self.heads = heads;
        self
    }

    /// Builder method: set hidden dimension
    pub fn with_hidden(mut self, num_hidden: usize) -> Self {
        self.num_hidden = num_hidden;
        self
    }

    /// Builder method: set dropout
    pub fn with_dropout(mut self, feat_drop: f64, attn_drop: f64) -> Self {
        self.feat_drop = feat_drop;
        self.attn_drop = attn_drop;
        self
    }

    /// Builder method: set activation
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Builder method: toggle residual connections
    pub fn with_residual(mut self, residual: bool) -> Self {
        self.residual = residual;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.num_layers < 2 {
            return Err(GatError::InvalidConfig(format!(
                "num_layers must be at least 2 (input and output layer), got {}",
                self.num_layers
            )));
        }
        if self.heads.len() != self.num_layers {
            return Err(GatError::InvalidConfig(format!(
                "heads has {} entries but num_layers is {}",
                self.heads.len(),
                self.num_layers
            )));
        }
        for layer in self.layer_configs() {
            layer.validate()?;
        }
        Ok(())
    }

    /// Per-layer configs of the stack
    ///
    /// Layer 0 never has a residual; hidden layers read the concatenated
    /// heads of the previous layer; the last layer (named "X") maps to the
    /// class count.
    pub fn layer_configs(&self) -> Vec<LayerConfig> {
        let last = self.num_layers.saturating_sub(1);
        (0..self.num_layers)
            .map(|l| {
                let heads = self.heads.get(l).copied().unwrap_or(0);
                let in_dim = if l == 0 {
                    self.in_dim
                } else {
                    self.num_hidden * self.heads.get(l - 1).copied().unwrap_or(0)
                };
                let out_dim = if l == last {
                    self.num_classes
                } else {
                    self.num_hidden
                };
                let name = if l == last { "X".to_string() } else { l.to_string() };

                LayerConfig {
                    in_dim,
                    out_dim,
                    num_heads: heads,
                    feat_drop: self.feat_drop,
                    attn_drop: self.attn_drop,
                    alpha: self.alpha,
                    name,
                    residual: l != 0 && self.residual,
                }
            })
            .collect()
    }

    /// Load configuration from a `.toml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: NetworkConfig = if is_json(path) {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.toml` or `.json` file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}
