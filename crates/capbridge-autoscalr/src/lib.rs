//! AutoScalr provider for capbridge
//!
//! This crate implements the CloudProvider and NodeGroup traits on top of
//! the AutoScalr application definition API. The orchestrator thinks in
//! nodes; AutoScalr stores a target capacity in vCPUs. The bridge converts
//! between the two with the vCPU count of the base (first configured)
//! instance type.
//!
//! # Features
//!
//! - Node count <-> vCPU conversion from a built-in instance type catalog
//! - Application definition lifecycle (Create, Get, Update, DeleteAppNodes, Delete)
//! - Error envelopes inside HTTP 200 responses surfaced as errors
//! - Best-effort cluster state push
//!
//! # Example
//!
//! ```ignore
//! use capbridge_autoscalr::BridgeProvider;
//! use capbridge_cloud::{CloudProvider, StaticCloudProvider, StaticNodeGroup};
//! use capbridge_config::BridgeConfig;
//! use std::sync::Arc;
//!
//! let config = Arc::new(BridgeConfig::from_env()?);
//! let underlying = StaticCloudProvider::new()
//!     .with_group(StaticNodeGroup::new(config.group_id.clone(), 1, 10));
//! let provider = BridgeProvider::new(Arc::new(underlying), config)?;
//!
//! for group in provider.node_groups() {
//!     println!("{}: {} nodes", group.id(), group.target_size().await?);
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod client;
pub mod cluster_state;
pub mod error;
pub mod identity;
pub mod node_group;
pub mod provider;

pub use api::{ApplicationDefinition, RequestType};
pub use catalog::{InstanceCatalog, InstanceTypeRecord};
pub use client::{CapacityApi, CapacityClient};
pub use cluster_state::{ClusterSnapshot, ClusterState, ClusterStateReporter};
pub use error::{BridgeError, Result};
pub use identity::remote_instance_id;
pub use node_group::{CapacityBridge, Lookup, PassthroughNodeGroup};
pub use provider::BridgeProvider;
