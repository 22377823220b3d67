//! In-memory provider with a fixed set of node groups
//!
//! Stands in for a real cloud provider where only group bounds and node
//! listings are needed (the CLI, tests). It cannot resize anything.

use crate::error::{CloudError, Result};
use crate::node_group::{Node, NodeGroup, NodeTemplate};
use crate::provider::{CloudProvider, PricingModel, ResourceLimiter};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Node group whose bounds and members never change
#[derive(Debug, Clone)]
pub struct StaticNodeGroup {
    id: String,
    min_size: usize,
    max_size: usize,
    nodes: Vec<Node>,
    template: NodeTemplate,
}

impl StaticNodeGroup {
    pub fn new(id: impl Into<String>, min_size: usize, max_size: usize) -> Self {
        let id = id.into();
        Self {
            template: NodeTemplate::new(format!("template-node-for-{}", id)),
            id,
            min_size,
            max_size,
            nodes: Vec::new(),
        }
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_template(mut self, template: NodeTemplate) -> Self {
        self.template = template;
        self
    }

    /// Whether a node with this provider id belongs to the group
    pub fn contains(&self, provider_id: &str) -> bool {
        self.nodes.iter().any(|n| n.provider_id == provider_id)
    }

    fn unsupported(&self, operation: &str) -> CloudError {
        CloudError::NotImplemented(format!("{} on static node group {}", operation, self.id))
    }
}

#[async_trait]
impl NodeGroup for StaticNodeGroup {
    fn id(&self) -> &str {
        &self.id
    }

    fn min_size(&self) -> usize {
        self.min_size
    }

    fn max_size(&self) -> usize {
        self.max_size
    }

    fn debug(&self) -> String {
        format!(
            "{} (min: {}, max: {}, nodes: {})",
            self.id,
            self.min_size,
            self.max_size,
            self.nodes.len()
        )
    }

    fn autoprovisioned(&self) -> bool {
        false
    }

    async fn target_size(&self) -> Result<usize> {
        Ok(self.nodes.len())
    }

    async fn increase_size(&self, _delta: i64) -> Result<()> {
        Err(self.unsupported("increase_size"))
    }

    async fn decrease_target_size(&self, _delta: i64) -> Result<()> {
        Err(self.unsupported("decrease_target_size"))
    }

    async fn delete_nodes(&self, _nodes: &[Node]) -> Result<()> {
        Err(self.unsupported("delete_nodes"))
    }

    async fn nodes(&self) -> Result<Vec<String>> {
        Ok(self.nodes.iter().map(|n| n.provider_id.clone()).collect())
    }

    async fn template_node_info(&self) -> Result<NodeTemplate> {
        Ok(self.template.clone())
    }

    async fn exist(&self) -> bool {
        true
    }

    async fn create(&self) -> Result<()> {
        Err(self.unsupported("create"))
    }

    async fn delete(&self) -> Result<()> {
        Err(self.unsupported("delete"))
    }
}

/// Provider serving a fixed list of [`StaticNodeGroup`]s
#[derive(Debug, Clone, Default)]
pub struct StaticCloudProvider {
    groups: Vec<Arc<StaticNodeGroup>>,
    machine_types: Vec<String>,
    limiter: ResourceLimiter,
}

impl StaticCloudProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: StaticNodeGroup) -> Self {
        self.groups.push(Arc::new(group));
        self
    }

    pub fn with_machine_types(mut self, machine_types: Vec<String>) -> Self {
        self.machine_types = machine_types;
        self
    }

    pub fn with_resource_limiter(mut self, limiter: ResourceLimiter) -> Self {
        self.limiter = limiter;
        self
    }
}

#[async_trait]
impl CloudProvider for StaticCloudProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn node_groups(&self) -> Vec<Arc<dyn NodeGroup>> {
        self.groups
            .iter()
            .map(|g| g.clone() as Arc<dyn NodeGroup>)
            .collect()
    }

    async fn node_group_for_node(&self, node: &Node) -> Result<Option<Arc<dyn NodeGroup>>> {
        Ok(self
            .groups
            .iter()
            .find(|g| g.contains(&node.provider_id))
            .map(|g| g.clone() as Arc<dyn NodeGroup>))
    }

    async fn pricing(&self) -> Result<Arc<dyn PricingModel>> {
        Err(CloudError::NotImplemented(
            "pricing is not available for the static provider".to_string(),
        ))
    }

    async fn available_machine_types(&self) -> Result<Vec<String>> {
        Ok(self.machine_types.clone())
    }

    async fn new_node_group(
        &self,
        machine_type: &str,
        _labels: &BTreeMap<String, String>,
        _extra_resources: &BTreeMap<String, i64>,
    ) -> Result<Arc<dyn NodeGroup>> {
        Err(CloudError::NotImplemented(format!(
            "node group autoprovisioning ({})",
            machine_type
        )))
    }

    async fn resource_limiter(&self) -> Result<ResourceLimiter> {
        Ok(self.limiter.clone())
    }

    async fn cleanup(&self) -> Result<()> {
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        tracing::debug!("Static provider refresh: {} node groups", self.groups.len());
        Ok(())
    }
}
