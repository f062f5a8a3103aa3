use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One summary tile on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardCard {
    pub title: String,
    pub value: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub cards: Vec<DashboardCard>,
    pub generated_at: DateTime<Utc>,
}
