use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A connected sensor or actuator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IotDevice {
    pub id: Uuid,
    pub name: String,
    /// e.g. "thermostat", "camera".
    pub device_type: String,
    pub status: DeviceStatus,
    pub last_reading: Option<f64>,
    pub unit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Online,
    Offline,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

/// Input for registering a device. New devices start offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDeviceInput {
    pub name: String,
    pub device_type: String,
    pub unit: Option<String>,
}

/// Status and/or reading reported by a device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDeviceInput {
    pub status: Option<DeviceStatus>,
    pub last_reading: Option<f64>,
}
