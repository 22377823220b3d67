//! Cloud provider trait definition

use crate::error::Result;
use crate::node_group::{Node, NodeGroup};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Cloud provider abstraction trait
///
/// The orchestrator talks to a provider to discover node groups, map nodes
/// back to their group, and query provider-wide limits.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "autoscalr", "static")
    fn name(&self) -> &str;

    /// All node groups currently known to the provider
    fn node_groups(&self) -> Vec<Arc<dyn NodeGroup>>;

    /// The node group a node belongs to, or `None` if it is not managed
    async fn node_group_for_node(&self, node: &Node) -> Result<Option<Arc<dyn NodeGroup>>>;

    /// Pricing model for this provider
    async fn pricing(&self) -> Result<Arc<dyn PricingModel>>;

    /// Machine types that can be requested from the provider
    async fn available_machine_types(&self) -> Result<Vec<String>>;

    /// Build a theoretical node group for the given machine shape.
    ///
    /// The group is not created on the provider side until `create()` is called.
    async fn new_node_group(
        &self,
        machine_type: &str,
        labels: &BTreeMap<String, String>,
        extra_resources: &BTreeMap<String, i64>,
    ) -> Result<Arc<dyn NodeGroup>>;

    /// Resource limits (cores, memory, ...) across the whole cluster
    async fn resource_limiter(&self) -> Result<ResourceLimiter>;

    /// Release anything the provider holds before shutdown
    async fn cleanup(&self) -> Result<()>;

    /// Called before every orchestrator loop; may change `node_groups()`
    async fn refresh(&self) -> Result<()>;
}

/// Price estimation for nodes and pods
pub trait PricingModel: Send + Sync {
    /// Price of running `node` between `start` and `end`
    fn node_price(&self, node: &Node, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<f64>;

    /// Price of running a pod with the given resource requests
    fn pod_price(
        &self,
        requests: &BTreeMap<String, i64>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64>;
}

/// Min/max limits per resource (e.g. "cpu", "memory")
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimiter {
    pub min_limits: HashMap<String, i64>,
    pub max_limits: HashMap<String, i64>,
}

impl ResourceLimiter {
    pub fn new(min_limits: HashMap<String, i64>, max_limits: HashMap<String, i64>) -> Self {
        Self {
            min_limits,
            max_limits,
        }
    }

    /// Lower bound for a resource, 0 when unset
    pub fn min(&self, resource: &str) -> i64 {
        self.min_limits.get(resource).copied().unwrap_or(0)
    }

    /// Upper bound for a resource, unbounded when unset
    pub fn max(&self, resource: &str) -> i64 {
        self.max_limits.get(resource).copied().unwrap_or(i64::MAX)
    }

    /// Resources that have at least one limit configured
    pub fn resources(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .min_limits
            .keys()
            .chain(self.max_limits.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
