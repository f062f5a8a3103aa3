use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A piece of equipment tracked on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    /// Free-form grouping such as "laptop" or "network".
    pub category: String,
    /// Current value in the dashboard's currency.
    pub value: f64,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssetInput {
    pub name: String,
    pub category: String,
    pub value: f64,
    pub location: Option<String>,
}

/// Input for updating an asset. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAssetInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub value: Option<f64>,
    pub location: Option<String>,
}
