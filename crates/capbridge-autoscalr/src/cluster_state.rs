//! Cluster state snapshot push
//!
//! Best-effort reporting path: the whole cluster's deployments and nodes are
//! posted to a separate endpoint. Failures are returned but callers are
//! expected to log and carry on.

use crate::client::{http_client, post_and_classify};
use crate::error::{BridgeError, Result};
use capbridge_config::BridgeConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot body accepted by the cluster state endpoint
#[derive(Clone, Serialize)]
pub struct ClusterState {
    pub api_key: String,
    #[serde(rename = "AwsRegion")]
    pub region: String,
    #[serde(rename = "AutoScalingGroupName")]
    pub group_id: String,
    pub deployments: Vec<serde_json::Value>,
    pub nodes: Vec<serde_json::Value>,
}

/// Deployments and nodes as exported from the orchestrator
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterSnapshot {
    #[serde(default)]
    pub deployments: Vec<serde_json::Value>,
    #[serde(default)]
    pub nodes: Vec<serde_json::Value>,
}

impl ClusterState {
    pub fn new(config: &BridgeConfig, snapshot: ClusterSnapshot) -> Self {
        Self {
            api_key: config.api_key.clone(),
            region: config.region.clone(),
            group_id: config.group_id.clone(),
            deployments: snapshot.deployments,
            nodes: snapshot.nodes,
        }
    }
}

impl fmt::Debug for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterState")
            .field("api_key", &"<redacted>")
            .field("region", &self.region)
            .field("group_id", &self.group_id)
            .field("deployments", &self.deployments)
            .field("nodes", &self.nodes)
            .finish()
    }
}

/// Posts [`ClusterState`] snapshots
pub struct ClusterStateReporter {
    client: reqwest::Client,
    endpoint: String,
}

impl ClusterStateReporter {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            endpoint: config.cluster_state_endpoint.clone(),
        })
    }

    /// Push one snapshot; returns the HTTP status on success
    pub async fn report(&self, state: &ClusterState) -> Result<u16> {
        tracing::debug!(
            "Pushing cluster state: {} deployments, {} nodes",
            state.deployments.len(),
            state.nodes.len()
        );

        // The endpoint acknowledges with an arbitrary body; only the error
        // envelope matters.
        match post_and_classify::<_, serde_json::Value>(&self.client, &self.endpoint, state).await
        {
            Ok(_) => Ok(200),
            Err(BridgeError::HttpStatus { status, .. }) => Err(BridgeError::HttpStatus {
                status,
                message: format!("k8sClusterStateAPI returned: {}", status),
            }),
            Err(e) => Err(e),
        }
    }
}
