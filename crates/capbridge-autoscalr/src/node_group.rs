//! Node group variants exposed by the AutoScalr provider
//!
//! [`CapacityBridge`] answers sizing and lifecycle calls from the remote
//! application definition, which stores capacity in vCPUs. Bounds, node
//! listing and templates still come from the underlying group.
//! [`PassthroughNodeGroup`] forwards everything to the underlying group.

use crate::api::{
    APP_TYPE_K8S, ApplicationDefinition, INSTANCE_SPIN_UP_SECONDS, SCALE_MODE_FIXED,
};
use crate::catalog::InstanceCatalog;
use crate::client::CapacityApi;
use crate::error::{BridgeError, Result};
use crate::identity::remote_instance_ids;
use async_trait::async_trait;
use capbridge_cloud::{CloudError, Node, NodeGroup, NodeTemplate};
use capbridge_config::BridgeConfig;
use std::sync::Arc;

/// vCPU delta sent with every DeleteAppNodes request, whatever the batch size
pub const DELETE_NODES_DELTA_VCPU: u32 = 1;

/// Result of reading the remote application definition
#[derive(Debug)]
pub enum Lookup {
    Present(ApplicationDefinition),
    Absent,
    ReadFailed(BridgeError),
}

impl Lookup {
    pub fn is_present(&self) -> bool {
        matches!(self, Lookup::Present(_))
    }
}

/// Node group whose size lives in an AutoScalr application definition
pub struct CapacityBridge {
    delegate: Arc<dyn NodeGroup>,
    api: Arc<dyn CapacityApi>,
    catalog: Arc<InstanceCatalog>,
    config: Arc<BridgeConfig>,
}

impl CapacityBridge {
    pub fn new(
        delegate: Arc<dyn NodeGroup>,
        api: Arc<dyn CapacityApi>,
        catalog: Arc<InstanceCatalog>,
        config: Arc<BridgeConfig>,
    ) -> Self {
        Self {
            delegate,
            api,
            catalog,
            config,
        }
    }

    /// Read the remote definition, keeping "absent" and "read failed" apart
    pub async fn lookup(&self) -> Lookup {
        match self.api.get().await {
            Ok(Some(definition)) => Lookup::Present(definition),
            Ok(None) => Lookup::Absent,
            Err(e) => Lookup::ReadFailed(e),
        }
    }

    /// vCPUs of the base (first configured) instance type
    pub fn base_vcpus(&self) -> Result<u32> {
        self.catalog.vcpus_of(self.config.base_instance_type())
    }

    /// Current target in nodes; 0 when no definition exists.
    ///
    /// Integer division: a vCPU target that is not a multiple of the base
    /// type's vCPUs under-reports.
    pub async fn target_nodes(&self) -> Result<usize> {
        match self.api.get().await? {
            Some(definition) => {
                let base = self.base_vcpus()?;
                Ok((definition.target_capacity / base) as usize)
            }
            None => Ok(0),
        }
    }

    /// Read the current target and write back `(current + delta) * base` vCPUs
    pub async fn increase_by(&self, delta: i64) -> Result<()> {
        if delta <= 0 {
            return Err(BridgeError::InvalidDelta(delta));
        }

        let current = self.target_nodes().await?;
        let base = self.base_vcpus()?;
        let target = (current as u64)
            .checked_add(delta as u64)
            .and_then(|nodes| nodes.checked_mul(u64::from(base)))
            .and_then(|vcpus| u32::try_from(vcpus).ok())
            .ok_or_else(|| {
                BridgeError::Cloud(CloudError::InvalidSize(format!(
                    "{} + {} nodes of {} vCPUs overflows the target capacity",
                    current, delta, base
                )))
            })?;

        tracing::info!(
            "Increasing {} from {} to {} nodes ({} vCPUs)",
            self.config.group_id,
            current,
            current as u64 + delta as u64,
            target
        );
        self.api.update(target).await
    }

    /// Remove specific nodes in one DeleteAppNodes request
    pub async fn remove_nodes(&self, nodes: &[Node]) -> Result<()> {
        if nodes.is_empty() {
            return Ok(());
        }

        let instance_ids = remote_instance_ids(nodes.iter().map(|n| n.provider_id.as_str()))?;

        tracing::info!(
            "Deleting {} nodes from {}: {}",
            instance_ids.len(),
            self.config.group_id,
            instance_ids.join(", ")
        );
        self.api
            .delete_nodes(DELETE_NODES_DELTA_VCPU, instance_ids)
            .await
    }

    /// Create the remote definition from configuration
    pub async fn provision(&self) -> Result<()> {
        let definition = self.definition_from_config()?;
        tracing::info!(
            "Creating AutoScalr app for {} in {} (target {} vCPUs)",
            definition.group_id,
            definition.region,
            definition.target_capacity
        );
        self.api.create(&definition).await
    }

    pub async fn teardown(&self) -> Result<()> {
        tracing::info!("Deleting AutoScalr app for {}", self.config.group_id);
        self.api.delete().await
    }

    /// Full definition sent on Create
    pub fn definition_from_config(&self) -> Result<ApplicationDefinition> {
        let config = &self.config;
        let target_capacity = if config.target_capacity_vcpus != 0 {
            config.target_capacity_vcpus
        } else if config.target_capacity_instances != 0 {
            config
                .target_capacity_instances
                .saturating_mul(self.base_vcpus()?)
        } else {
            0
        };

        Ok(ApplicationDefinition {
            group_id: config.group_id.clone(),
            region: config.region.clone(),
            app_type: APP_TYPE_K8S.to_string(),
            instance_types: config.instance_types.clone(),
            scale_mode: SCALE_MODE_FIXED.to_string(),
            max_spot_percent_total: config.max_spot_percent_total,
            max_spot_percent_one_market: config.max_spot_percent_one_market,
            target_spare_cpu_percent: config.target_spare_cpu_percent,
            cluster_name: String::new(),
            target_spare_memory_percent: config.target_spare_memory_percent,
            queue_name: String::new(),
            target_queue_size: 0,
            instance_spin_up_seconds: INSTANCE_SPIN_UP_SECONDS,
            max_minutes_to_target_queue_size: 0,
            display_name: config.display_name.clone(),
            detailed_monitoring_enabled: config.detailed_monitoring,
            autoscalr_enabled: true,
            os_family: config.os_family.clone(),
            max_hours_instance_age: config.max_hours_instance_age,
            target_capacity,
        })
    }
}

#[async_trait]
impl NodeGroup for CapacityBridge {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn min_size(&self) -> usize {
        self.delegate.min_size()
    }

    fn max_size(&self) -> usize {
        self.delegate.max_size()
    }

    fn debug(&self) -> String {
        self.delegate.debug()
    }

    fn autoprovisioned(&self) -> bool {
        false
    }

    async fn target_size(&self) -> capbridge_cloud::Result<usize> {
        Ok(self.target_nodes().await?)
    }

    async fn increase_size(&self, delta: i64) -> capbridge_cloud::Result<()> {
        Ok(self.increase_by(delta).await?)
    }

    async fn decrease_target_size(&self, delta: i64) -> capbridge_cloud::Result<()> {
        // Shrinking goes through delete_nodes only
        tracing::debug!(
            "Ignoring decrease_target_size({}) for {}",
            delta,
            self.config.group_id
        );
        Ok(())
    }

    async fn delete_nodes(&self, nodes: &[Node]) -> capbridge_cloud::Result<()> {
        Ok(self.remove_nodes(nodes).await?)
    }

    async fn nodes(&self) -> capbridge_cloud::Result<Vec<String>> {
        self.delegate.nodes().await
    }

    async fn template_node_info(&self) -> capbridge_cloud::Result<NodeTemplate> {
        self.delegate.template_node_info().await
    }

    async fn exist(&self) -> bool {
        match self.lookup().await {
            Lookup::Present(_) => true,
            Lookup::Absent => false,
            Lookup::ReadFailed(e) => {
                tracing::warn!(
                    "Treating {} as absent, AutoScalr read failed: {}",
                    self.config.group_id,
                    e
                );
                false
            }
        }
    }

    async fn create(&self) -> capbridge_cloud::Result<()> {
        Ok(self.provision().await?)
    }

    async fn delete(&self) -> capbridge_cloud::Result<()> {
        Ok(self.teardown().await?)
    }
}

/// Node group that forwards every call to the underlying provider's group
pub struct PassthroughNodeGroup {
    delegate: Arc<dyn NodeGroup>,
}

impl PassthroughNodeGroup {
    pub fn new(delegate: Arc<dyn NodeGroup>) -> Self {
        Self { delegate }
    }
}

#[async_trait]
impl NodeGroup for PassthroughNodeGroup {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn min_size(&self) -> usize {
        self.delegate.min_size()
    }

    fn max_size(&self) -> usize {
        self.delegate.max_size()
    }

    fn debug(&self) -> String {
        self.delegate.debug()
    }

    fn autoprovisioned(&self) -> bool {
        self.delegate.autoprovisioned()
    }

    async fn target_size(&self) -> capbridge_cloud::Result<usize> {
        self.delegate.target_size().await
    }

    async fn increase_size(&self, delta: i64) -> capbridge_cloud::Result<()> {
        self.delegate.increase_size(delta).await
    }

    async fn decrease_target_size(&self, delta: i64) -> capbridge_cloud::Result<()> {
        self.delegate.decrease_target_size(delta).await
    }

    async fn delete_nodes(&self, nodes: &[Node]) -> capbridge_cloud::Result<()> {
        self.delegate.delete_nodes(nodes).await
    }

    async fn nodes(&self) -> capbridge_cloud::Result<Vec<String>> {
        self.delegate.nodes().await
    }

    async fn template_node_info(&self) -> capbridge_cloud::Result<NodeTemplate> {
        self.delegate.template_node_info().await
    }

    async fn exist(&self) -> bool {
        self.delegate.exist().await
    }

    async fn create(&self) -> capbridge_cloud::Result<()> {
        self.delegate.create().await
    }

    async fn delete(&self) -> capbridge_cloud::Result<()> {
        self.delegate.delete().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capbridge_cloud::StaticNodeGroup;

    struct NoRemote;

    #[async_trait]
    impl CapacityApi for NoRemote {
        async fn create(&self, _definition: &ApplicationDefinition) -> Result<()> {
            panic!("unexpected remote call")
        }
        async fn get(&self) -> Result<Option<ApplicationDefinition>> {
            panic!("unexpected remote call")
        }
        async fn update(&self, _target_vcpus: u32) -> Result<()> {
            panic!("unexpected remote call")
        }
        async fn delete_nodes(&self, _delta_vcpu: u32, _ids: Vec<String>) -> Result<()> {
            panic!("unexpected remote call")
        }
        async fn delete(&self) -> Result<()> {
            panic!("unexpected remote call")
        }
    }

    fn config() -> BridgeConfig {
        BridgeConfig::from_lookup(|key| match key {
            "AUTOSCALING_GROUP_NAME" => Some("testASG".to_string()),
            "AWS_REGION" => Some("us-east-1".to_string()),
            "AUTOSCALR_API_KEY" => Some("myApiKey".to_string()),
            "INSTANCE_TYPES" => Some("c3.xlarge,c4.xlarge".to_string()),
            "TARGET_CAPACITY_INSTANCES" => Some("3".to_string()),
            "MAX_SPOT_PERCENT_TOTAL" => Some("80".to_string()),
            "MAX_SPOT_PERCENT_ONE_MARKET" => Some("25".to_string()),
            "DETAILED_MONITORING_ENABLED" => Some("true".to_string()),
            "MAX_HOURS_INSTANCE_AGE" => Some("72".to_string()),
            "OS_FAMILY" => Some("Linux".to_string()),
            "TARGET_SPARE_CPU_PERCENT" => Some("15".to_string()),
            "TARGET_SPARE_MEMORY_PERCENT" => Some("20".to_string()),
            "DISPLAY_NAME" => Some("prod cluster".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn bridge(config: BridgeConfig) -> CapacityBridge {
        CapacityBridge::new(
            Arc::new(StaticNodeGroup::new("testASG", 1, 10)),
            Arc::new(NoRemote),
            Arc::new(InstanceCatalog::builtin()),
            Arc::new(config),
        )
    }

    #[test]
    fn test_definition_from_instance_count() {
        let def = bridge(config()).definition_from_config().unwrap();
        assert_eq!(def.group_id, "testASG");
        assert_eq!(def.region, "us-east-1");
        assert_eq!(def.app_type, "k8s");
        assert_eq!(def.scale_mode, "fixed");
        assert_eq!(def.instance_spin_up_seconds, 15);
        assert!(def.autoscalr_enabled);
        assert_eq!(def.max_spot_percent_total, 80);
        assert_eq!(def.max_spot_percent_one_market, 25);
        assert!(def.detailed_monitoring_enabled);
        assert_eq!(def.max_hours_instance_age, 72);
        assert_eq!(def.os_family, "Linux");
        assert_eq!(def.target_spare_cpu_percent, 15);
        assert_eq!(def.target_spare_memory_percent, 20);
        assert_eq!(def.display_name, "prod cluster");
        assert_eq!(def.cluster_name, "");
        assert_eq!(def.queue_name, "");
        assert_eq!(def.target_queue_size, 0);
        assert_eq!(def.max_minutes_to_target_queue_size, 0);
        assert_eq!(def.instance_types, vec!["c3.xlarge", "c4.xlarge"]);
        // 3 instances of c3.xlarge (4 vCPUs)
        assert_eq!(def.target_capacity, 12);
    }

    #[test]
    fn test_definition_prefers_vcpu_target() {
        let mut config = config();
        config.target_capacity_vcpus = 10;
        let def = bridge(config).definition_from_config().unwrap();
        assert_eq!(def.target_capacity, 10);
    }

    #[test]
    fn test_unknown_base_type() {
        let mut config = config();
        config.instance_types = vec!["z9.mega".to_string()];
        let err = bridge(config).definition_from_config().unwrap_err();
        assert!(matches!(err, BridgeError::UnknownInstanceType(_)));
    }

    #[tokio::test]
    async fn test_local_rejections_skip_remote() {
        let bridge = bridge(config());
        assert!(matches!(
            bridge.increase_by(0).await,
            Err(BridgeError::InvalidDelta(0))
        ));
        assert!(bridge.remove_nodes(&[]).await.is_ok());
        assert!(bridge.decrease_target_size(5).await.is_ok());
        assert!(!bridge.autoprovisioned());
        assert_eq!(bridge.max_size(), 10);
    }
}
