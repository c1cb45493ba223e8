//! Worker lifecycle state and the reports produced by install and activate

use serde::Serialize;
use std::fmt;

/// Lifecycle phase. Transitions are driven by the host, strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Registered, install not yet run
    Parsed,
    Installing,
    Installed,
    Activating,
    /// Activated and intercepting requests
    Running,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Running => "running",
        };
        write!(f, "{}", name)
    }
}

/// Mutable lifecycle state of one worker
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleState {
    pub phase: Phase,
    /// Take over without waiting for clients of the previous worker to close
    pub skip_waiting: bool,
    /// Clients claimed during the last activation
    pub clients_claimed: usize,
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self {
            phase: Phase::Parsed,
            skip_waiting: false,
            clients_claimed: 0,
        }
    }
}

/// A static set entry that could not be cached during install
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallFailure {
    pub url: String,
    pub reason: String,
}

/// Outcome of install
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    pub partition: String,
    pub cached: Vec<String>,
    pub failed: Vec<InstallFailure>,
}

impl InstallReport {
    /// Every static set entry was cached
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of activate
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
    pub retained: Vec<String>,
    pub clients_claimed: usize,
}
