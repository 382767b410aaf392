//! Error types for the GAT library

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, GatError>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum GatError {
    /// Tensor dimensions do not line up
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: String,
        actual: String,
    },

    /// ndarray refused a reshape
    #[error("reshape failed: {0}")]
    Reshape(#[from] ndarray::ShapeError),

    /// Invalid hyperparameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Edge endpoint outside the node range
    #[error("node {node} out of range for graph with {num_nodes} nodes")]
    NodeOutOfRange { node: usize, num_nodes: usize },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML write error
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl GatError {
    /// Build a shape mismatch error from anything printable
    pub fn shape(
        context: impl Into<String>,
        expected: impl std::fmt::Debug,
        actual: impl std::fmt::Debug,
    ) -> Self {
        GatError::ShapeMismatch {
            context: context.into(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }

    /// Check if the error comes from bad tensor shapes
    pub fn is_shape_error(&self) -> bool {
        matches!(self, GatError::ShapeMismatch { .. } | GatError::Reshape(_))
    }
}
