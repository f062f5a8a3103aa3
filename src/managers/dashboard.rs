use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sysdeck_core::{Lifecycle, LogSink, ManagedComponent, MemoryLogSink, ProgressTracker};

use super::{
    AssetManager, FileManager, FinanceManager, IotManager, NetworkManager, Result,
    ScheduleManager, SystemManager,
};
use crate::models::*;

pub const DASHBOARD_MANAGER: &str = "DashboardManager";

/// Everything the dashboard summarizes.
#[derive(Clone)]
pub struct DashboardSources {
    pub log: Arc<MemoryLogSink>,
    pub progress: Arc<dyn ProgressTracker>,
    pub assets: Arc<AssetManager>,
    pub files: Arc<FileManager>,
    pub finance: Arc<FinanceManager>,
    pub iot: Arc<IotManager>,
    pub network: Arc<NetworkManager>,
    pub schedule: Arc<ScheduleManager>,
    pub system: Arc<SystemManager>,
}

/// Builds summary cards from the other managers. Holds no records of its own.
pub struct DashboardManager {
    lifecycle: Lifecycle,
    sources: DashboardSources,
}

impl DashboardManager {
    pub fn new(log: Arc<dyn LogSink>, sources: DashboardSources) -> Self {
        Self {
            lifecycle: Lifecycle::new(DASHBOARD_MANAGER, log),
            sources,
        }
    }

    /// One card per source. A source that cannot answer (e.g. not initialized)
    /// shows as "unavailable" instead of failing the whole dashboard.
    pub fn build(&self) -> Result<Dashboard> {
        self.lifecycle.check_initialized()?;
        let s = &self.sources;
        let now = Utc::now();

        let cards = vec![
            card("Assets", s.assets.total_value(), |total| {
                (format!("{:.2}", total), None)
            }),
            card("Files", s.files.usage(), |(count, bytes)| {
                (count.to_string(), Some(format!("{} bytes", bytes)))
            }),
            card("Balance", s.finance.summary(), |summary| {
                (
                    format!("{:.2}", summary.balance),
                    Some(format!(
                        "income {:.2} / expenses {:.2}",
                        summary.income, summary.expenses
                    )),
                )
            }),
            card("Devices online", s.iot.online_count(), |online| {
                (online.to_string(), None)
            }),
            card("Hosts up", s.network.availability(), |(up, total)| {
                (format!("{}/{}", up, total), None)
            }),
            card("Upcoming events", s.schedule.upcoming(now), |events| {
                let next = events.first().map(|e| format!("next: {}", e.title));
                (events.len().to_string(), next)
            }),
            card("System", s.system.latest(), |snapshot| match snapshot {
                Some(snapshot) => (
                    format!("{:.1}% CPU", snapshot.info.cpu_usage),
                    Some(format!(
                        "{} ({}), memory {:.1}%",
                        snapshot.info.hostname,
                        snapshot.info.os,
                        snapshot.memory_usage()
                    )),
                ),
                None => ("no data".to_string(), None),
            }),
            DashboardCard {
                title: "Running tasks".to_string(),
                value: s.progress.get_running_tasks().len().to_string(),
                detail: None,
            },
            {
                let stats = s.log.get_stats();
                DashboardCard {
                    title: "Log".to_string(),
                    value: stats.total.to_string(),
                    detail: Some(format!(
                        "{} warnings, {} errors",
                        stats.by_level.warn, stats.by_level.error
                    )),
                }
            },
        ];

        Ok(Dashboard {
            cards,
            generated_at: now,
        })
    }
}

fn card<T>(
    title: &str,
    result: Result<T>,
    render: impl FnOnce(T) -> (String, Option<String>),
) -> DashboardCard {
    let (value, detail) = match result {
        Ok(value) => render(value),
        Err(e) => ("unavailable".to_string(), Some(e.to_string())),
    };
    DashboardCard {
        title: title.to_string(),
        value,
        detail,
    }
}

#[async_trait]
impl ManagedComponent for DashboardManager {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}
