//! Core types for dns-groups

use serde::{Deserialize, Serialize};
use std::fmt;

/// One instance-group health entry as reported by the DNS health API.
///
/// Records are decoded one at a time from the `/groups` response and are
/// never modified afterwards. Fields the API does not send fall back to
/// their empty value; fields this crate does not know are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupRecord {
    /// Name of the job the group belongs to
    pub job_name: String,

    /// Name of the link the group was formed for
    pub link_name: String,

    /// Link type (e.g. "provides", "consumes")
    pub link_type: String,

    /// Numeric group identifier
    pub group_id: i64,

    /// Aggregate health as reported by the API, passed through verbatim
    pub health_state: String,
}

impl GroupRecord {
    /// Classified view of [`GroupRecord::health_state`]
    pub fn health(&self) -> HealthState {
        HealthState::parse(&self.health_state)
    }
}

/// Known health states, with a catch-all for anything the API adds later
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HealthState {
    /// All instances in the group are healthy
    Running,
    /// At least one instance is failing its health check
    Unhealthy,
    /// The API has no health information for the group
    Unknown,
    /// A state this crate does not recognize
    Other(String),
}

impl HealthState {
    /// Classify a raw health string. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "running" => HealthState::Running,
            "unhealthy" => HealthState::Unhealthy,
            "unknown" => HealthState::Unknown,
            other => HealthState::Other(other.to_string()),
        }
    }

    /// Get the wire representation
    pub fn as_str(&self) -> &str {
        match self {
            HealthState::Running => "running",
            HealthState::Unhealthy => "unhealthy",
            HealthState::Unknown => "unknown",
            HealthState::Other(raw) => raw,
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
