//! Version-qualified cache partition names
//!
//! A partition is named `{prefix}-{kind}-v{version}`. Deploying a new version
//! creates partitions under new names; anything not matching the current
//! names is garbage once the new version activates.

use crate::error::{RecymError, RecymResult};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two partitions a name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionKind {
    /// Build-time assets, populated on install
    Static,
    /// Resources observed at runtime
    Dynamic,
}

impl PartitionKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "static" => Some(Self::Static),
            "dynamic" => Some(Self::Dynamic),
            _ => None,
        }
    }
}

impl fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// The partition names that are current for one deployed version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNames {
    prefix: String,
    version: Version,
}

impl PartitionNames {
    pub fn new(prefix: impl Into<String>, version: Version) -> Self {
        Self {
            prefix: prefix.into(),
            version,
        }
    }

    /// Build from a configured prefix and version string
    pub fn parse(prefix: &str, version: &str) -> RecymResult<Self> {
        let version = Version::parse(version.trim_start_matches('v')).map_err(|e| {
            RecymError::InvalidVersion {
                version: version.to_string(),
                reason: e.to_string(),
            }
        })?;
        if prefix.is_empty() || prefix.contains(['/', '\\']) {
            return Err(RecymError::PartitionName(prefix.to_string()));
        }
        Ok(Self::new(prefix, version))
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Name of the partition of `kind` for this version
    pub fn name(&self, kind: PartitionKind) -> String {
        format!("{}-{}-v{}", self.prefix, kind, self.version)
    }

    pub fn static_name(&self) -> String {
        self.name(PartitionKind::Static)
    }

    pub fn dynamic_name(&self) -> String {
        self.name(PartitionKind::Dynamic)
    }

    /// Whether `name` is one of the two current partitions
    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_name() || name == self.dynamic_name()
    }

    /// Parse a partition name created under this prefix
    pub fn describe(&self, name: &str) -> Option<PartitionInfo> {
        let rest = name.strip_prefix(&self.prefix)?.strip_prefix('-')?;
        let (kind, version) = rest.split_once("-v")?;
        let kind = PartitionKind::parse(kind)?;
        let version = Version::parse(version).ok()?;
        Some(PartitionInfo {
            name: name.to_string(),
            kind,
            version,
        })
    }
}

/// Parsed components of a partition name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInfo {
    pub name: String,
    pub kind: PartitionKind,
    pub version: Version,
}
