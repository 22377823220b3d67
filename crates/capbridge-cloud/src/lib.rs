//! capbridge cloud contract
//!
//! This crate defines the contract an autoscaling orchestrator expects from
//! a cloud provider and its node groups. Concrete providers (the AutoScalr
//! capacity bridge, the in-memory static provider) implement these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            orchestrator autoscaling loop         │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                capbridge-cloud                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait CloudProvider { node_groups ... } │   │
//! │  │  trait NodeGroup { target_size ... }     │   │
//! │  └──────────────────────────────────────────┘   │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │   autoscalr   │ │    static     │
//! │    bridge     │ │   provider    │
//! └───────────────┘ └───────────────┘
//! ```

pub mod error;
pub mod node_group;
pub mod provider;
pub mod static_provider;

// Re-exports
pub use error::{CloudError, Result};
pub use node_group::{Node, NodeGroup, NodeTemplate};
pub use provider::{CloudProvider, PricingModel, ResourceLimiter};
pub use static_provider::{StaticCloudProvider, StaticNodeGroup};
