//! Instance type catalog
//!
//! Static table of EC2 instance types and their vCPU counts. The bridge
//! converts between node counts and vCPUs with the base type's entry.

use crate::error::{BridgeError, Result};
use std::collections::HashMap;

/// A single catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceTypeRecord {
    pub name: &'static str,
    pub vcpus: u32,
}

const BUILTIN_TYPES: &[(&str, u32)] = &[
    ("t1.micro", 1),
    ("t2.nano", 1),
    ("t2.micro", 1),
    ("t2.small", 1),
    ("t2.medium", 2),
    ("t2.large", 2),
    ("t2.xlarge", 4),
    ("t2.2xlarge", 8),
    ("t3.nano", 2),
    ("t3.micro", 2),
    ("t3.small", 2),
    ("t3.medium", 2),
    ("t3.large", 2),
    ("t3.xlarge", 4),
    ("t3.2xlarge", 8),
    ("m1.small", 1),
    ("m1.medium", 1),
    ("m1.large", 2),
    ("m1.xlarge", 4),
    ("m2.xlarge", 2),
    ("m2.2xlarge", 4),
    ("m2.4xlarge", 8),
    ("m3.medium", 1),
    ("m3.large", 2),
    ("m3.xlarge", 4),
    ("m3.2xlarge", 8),
    ("m4.large", 2),
    ("m4.xlarge", 4),
    ("m4.2xlarge", 8),
    ("m4.4xlarge", 16),
    ("m4.10xlarge", 40),
    ("m4.16xlarge", 64),
    ("m5.large", 2),
    ("m5.xlarge", 4),
    ("m5.2xlarge", 8),
    ("m5.4xlarge", 16),
    ("m5.12xlarge", 48),
    ("m5.24xlarge", 96),
    ("c1.medium", 2),
    ("c1.xlarge", 8),
    ("c3.large", 2),
    ("c3.xlarge", 4),
    ("c3.2xlarge", 8),
    ("c3.4xlarge", 16),
    ("c3.8xlarge", 32),
    ("c4.large", 2),
    ("c4.xlarge", 4),
    ("c4.2xlarge", 8),
    ("c4.4xlarge", 16),
    ("c4.8xlarge", 36),
    ("c5.large", 2),
    ("c5.xlarge", 4),
    ("c5.2xlarge", 8),
    ("c5.4xlarge", 16),
    ("c5.9xlarge", 36),
    ("c5.18xlarge", 72),
    ("r3.large", 2),
    ("r3.xlarge", 4),
    ("r3.2xlarge", 8),
    ("r3.4xlarge", 16),
    ("r3.8xlarge", 32),
    ("r4.large", 2),
    ("r4.xlarge", 4),
    ("r4.2xlarge", 8),
    ("r4.4xlarge", 16),
    ("r4.8xlarge", 32),
    ("r4.16xlarge", 64),
    ("r5.large", 2),
    ("r5.xlarge", 4),
    ("r5.2xlarge", 8),
    ("r5.4xlarge", 16),
    ("r5.12xlarge", 48),
    ("r5.24xlarge", 96),
    ("i2.xlarge", 4),
    ("i2.2xlarge", 8),
    ("i2.4xlarge", 16),
    ("i2.8xlarge", 32),
    ("i3.large", 2),
    ("i3.xlarge", 4),
    ("i3.2xlarge", 8),
    ("i3.4xlarge", 16),
    ("i3.8xlarge", 32),
    ("i3.16xlarge", 64),
    ("d2.xlarge", 4),
    ("d2.2xlarge", 8),
    ("d2.4xlarge", 16),
    ("d2.8xlarge", 36),
    ("x1.16xlarge", 64),
    ("x1.32xlarge", 128),
    ("p2.xlarge", 4),
    ("p2.8xlarge", 32),
    ("p2.16xlarge", 64),
    ("p3.2xlarge", 8),
    ("p3.8xlarge", 32),
    ("p3.16xlarge", 64),
    ("g2.2xlarge", 8),
    ("g2.8xlarge", 32),
    ("g3.4xlarge", 16),
    ("g3.8xlarge", 32),
    ("g3.16xlarge", 64),
];

/// Lookup from instance type name to vCPU count
#[derive(Debug, Clone)]
pub struct InstanceCatalog {
    types: HashMap<&'static str, InstanceTypeRecord>,
}

impl InstanceCatalog {
    /// Catalog built from the hard-coded EC2 table
    pub fn builtin() -> Self {
        Self::from_records(
            BUILTIN_TYPES
                .iter()
                .map(|&(name, vcpus)| InstanceTypeRecord { name, vcpus }),
        )
    }

    /// Records with zero vCPUs are dropped, so every listed type divides a
    /// vCPU target.
    pub fn from_records(records: impl IntoIterator<Item = InstanceTypeRecord>) -> Self {
        Self {
            types: records
                .into_iter()
                .filter(|r| {
                    if r.vcpus == 0 {
                        tracing::warn!("Ignoring instance type {} with 0 vCPUs", r.name);
                    }
                    r.vcpus > 0
                })
                .map(|r| (r.name, r))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&InstanceTypeRecord> {
        self.types.get(name)
    }

    /// vCPU count of `name`, `UnknownInstanceType` if it is not listed
    pub fn vcpus_of(&self, name: &str) -> Result<u32> {
        self.get(name)
            .map(|r| r.vcpus)
            .ok_or_else(|| BridgeError::UnknownInstanceType(name.to_string()))
    }

    /// All entries, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &InstanceTypeRecord> {
        let mut records: Vec<&InstanceTypeRecord> = self.types.values().collect();
        records.sort_by_key(|r| r.name);
        records.into_iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for InstanceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
