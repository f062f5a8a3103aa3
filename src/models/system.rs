use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw host information as returned by a system-info provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HostInfo {
    pub hostname: String,
    pub os: String,
    /// Percent, 0-100.
    pub cpu_usage: f64,
    /// Bytes.
    pub memory_used: u64,
    /// Bytes.
    pub memory_total: u64,
    pub uptime_secs: u64,
}

/// Host information captured at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemSnapshot {
    #[serde(flatten)]
    pub info: HostInfo,
    pub captured_at: DateTime<Utc>,
}

impl SystemSnapshot {
    /// Memory use in percent, 0 when the total is unknown.
    pub fn memory_usage(&self) -> f64 {
        if self.info.memory_total == 0 {
            0.0
        } else {
            self.info.memory_used as f64 * 100.0 / self.info.memory_total as f64
        }
    }
}
