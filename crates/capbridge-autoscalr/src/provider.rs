//! AutoScalr provider implementation
//!
//! Wraps an underlying cloud provider. The node group named in the bridge
//! configuration is served by a [`CapacityBridge`]; every other group and
//! every provider-level call goes to the underlying provider unchanged.

use crate::catalog::InstanceCatalog;
use crate::client::{CapacityApi, CapacityClient};
use crate::error::Result;
use crate::node_group::{CapacityBridge, PassthroughNodeGroup};
use async_trait::async_trait;
use capbridge_cloud::{CloudProvider, Node, NodeGroup, PricingModel, ResourceLimiter};
use capbridge_config::BridgeConfig;
use std::collections::BTreeMap;
use std::sync::Arc;

/// AutoScalr provider
///
/// A configuration carries a single application definition, so exactly one
/// node group is bridged: the one whose id equals `config.group_id`. Every
/// other discovered group is a [`PassthroughNodeGroup`] and never talks to
/// the AutoScalr API. When no group matches, nothing is bridged.
pub struct BridgeProvider {
    underlying: Arc<dyn CloudProvider>,
    api: Arc<dyn CapacityApi>,
    catalog: Arc<InstanceCatalog>,
    config: Arc<BridgeConfig>,
}

impl BridgeProvider {
    /// Provider talking to the AutoScalr API configured in `config`
    pub fn new(underlying: Arc<dyn CloudProvider>, config: Arc<BridgeConfig>) -> Result<Self> {
        let api = Arc::new(CapacityClient::new(&config)?);
        Ok(Self::with_api(
            underlying,
            api,
            Arc::new(InstanceCatalog::builtin()),
            config,
        ))
    }

    pub fn with_api(
        underlying: Arc<dyn CloudProvider>,
        api: Arc<dyn CapacityApi>,
        catalog: Arc<InstanceCatalog>,
        config: Arc<BridgeConfig>,
    ) -> Self {
        Self {
            underlying,
            api,
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The bridge for the configured group, if the underlying provider has it
    pub fn bridge(&self) -> Option<CapacityBridge> {
        self.underlying
            .node_groups()
            .into_iter()
            .find(|g| g.id() == self.config.group_id)
            .map(|g| self.bridge_for(g))
    }

    fn bridge_for(&self, group: Arc<dyn NodeGroup>) -> CapacityBridge {
        CapacityBridge::new(
            group,
            self.api.clone(),
            self.catalog.clone(),
            self.config.clone(),
        )
    }

    fn wrap(&self, group: Arc<dyn NodeGroup>) -> Arc<dyn NodeGroup> {
        if group.id() == self.config.group_id {
            Arc::new(self.bridge_for(group))
        } else {
            Arc::new(PassthroughNodeGroup::new(group))
        }
    }
}

#[async_trait]
impl CloudProvider for BridgeProvider {
    fn name(&self) -> &str {
        "autoscalr"
    }

    fn node_groups(&self) -> Vec<Arc<dyn NodeGroup>> {
        self.underlying
            .node_groups()
            .into_iter()
            .map(|g| self.wrap(g))
            .collect()
    }

    async fn node_group_for_node(
        &self,
        node: &Node,
    ) -> capbridge_cloud::Result<Option<Arc<dyn NodeGroup>>> {
        Ok(self
            .underlying
            .node_group_for_node(node)
            .await?
            .map(|g| self.wrap(g)))
    }

    async fn pricing(&self) -> capbridge_cloud::Result<Arc<dyn PricingModel>> {
        self.underlying.pricing().await
    }

    async fn available_machine_types(&self) -> capbridge_cloud::Result<Vec<String>> {
        self.underlying.available_machine_types().await
    }

    async fn new_node_group(
        &self,
        machine_type: &str,
        labels: &BTreeMap<String, String>,
        extra_resources: &BTreeMap<String, i64>,
    ) -> capbridge_cloud::Result<Arc<dyn NodeGroup>> {
        let group = self
            .underlying
            .new_node_group(machine_type, labels, extra_resources)
            .await?;
        Ok(self.wrap(group))
    }

    async fn resource_limiter(&self) -> capbridge_cloud::Result<ResourceLimiter> {
        self.underlying.resource_limiter().await
    }

    async fn cleanup(&self) -> capbridge_cloud::Result<()> {
        self.underlying.cleanup().await
    }

    async fn refresh(&self) -> capbridge_cloud::Result<()> {
        self.underlying.refresh().await
    }
}
