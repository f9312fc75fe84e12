//! Model configuration.

use serde::{Deserialize, Serialize};

/// Settings fixed when a [`Model`](crate::topology::Model) is built.
///
/// Deserializes from partial documents; missing fields take their defaults.
///
/// ```rust
/// use sim_graph::config::ModelConfig;
/// let cfg: ModelConfig = serde_json::from_str(r#"{"reserve_nodes": 4096}"#).unwrap();
/// assert_eq!(cfg.coords_attribute, "xyz");
/// assert_eq!(cfg.reserve_nodes, 4096);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Name of the built-in list attribute holding position coordinates.
    pub coords_attribute: String,
    /// Initial node capacity of the underlying graph.
    pub reserve_nodes: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            coords_attribute: "xyz".to_string(),
            reserve_nodes: 0,
        }
    }
}
