use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A monitored network host.
///
/// sysdeck does not probe hosts itself; an external prober reports results via
/// [`ProbeResultInput`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkHost {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub status: HostStatus,
    pub latency_ms: Option<u64>,
    pub last_checked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Reachability of a host.
///
/// - `Unknown`: Never probed
/// - `Up`: Last probe answered
/// - `Down`: Last probe got no answer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HostStatus {
    Unknown,
    Up,
    Down,
}

impl HostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddHostInput {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResultInput {
    pub reachable: bool,
    pub latency_ms: Option<u64>,
}
