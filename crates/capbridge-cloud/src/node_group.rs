//! Node group trait definition

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Node group abstraction trait
///
/// A node group is a set of nodes with the same shape that the orchestrator
/// can grow and shrink as one unit. Sizes are always expressed in nodes.
#[async_trait]
pub trait NodeGroup: Send + Sync {
    /// Unique identifier of the node group
    fn id(&self) -> &str;

    /// Minimum number of nodes the group may shrink to
    fn min_size(&self) -> usize;

    /// Maximum number of nodes the group may grow to
    fn max_size(&self) -> usize;

    /// Human readable description used in orchestrator logs
    fn debug(&self) -> String;

    /// Whether the group was created by the orchestrator on its own
    fn autoprovisioned(&self) -> bool;

    /// Current target size, in nodes
    async fn target_size(&self) -> Result<usize>;

    /// Grow the group by `delta` nodes. `delta` must be positive.
    async fn increase_size(&self, delta: i64) -> Result<()>;

    /// Shrink the target size without deleting any particular node
    async fn decrease_target_size(&self, delta: i64) -> Result<()>;

    /// Remove the given nodes from the group
    async fn delete_nodes(&self, nodes: &[Node]) -> Result<()>;

    /// Provider ids of the instances that belong to the group
    async fn nodes(&self) -> Result<Vec<String>>;

    /// Template describing what a new node in this group would look like
    async fn template_node_info(&self) -> Result<NodeTemplate>;

    /// Whether the group exists on the provider side
    async fn exist(&self) -> bool;

    /// Create the group on the provider side
    async fn create(&self) -> Result<()>;

    /// Delete the group on the provider side
    async fn delete(&self) -> Result<()>;
}

/// Orchestrator node reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node name as registered with the orchestrator
    pub name: String,

    /// Opaque provider identifier (e.g. `aws:///us-east-1a/i-0abc`)
    pub provider_id: String,

    /// Node labels
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Node {
    pub fn new(name: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider_id: provider_id.into(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Shape of a node that a group would add on scale-up
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTemplate {
    /// Name given to the template node
    pub name: String,

    /// Instance type the node would be launched as
    pub instance_type: Option<String>,

    /// Labels the node would carry
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// Allocatable resources (e.g. "cpu" in millicores, "memory" in bytes)
    #[serde(default)]
    pub capacity: BTreeMap<String, i64>,
}

impl NodeTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = Some(instance_type.into());
        self
    }

    pub fn with_capacity(mut self, resource: impl Into<String>, amount: i64) -> Self {
        self.capacity.insert(resource.into(), amount);
        self
    }
}
