use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sysdeck_core::{Lifecycle, LogSink, ManagedComponent, ProgressTracker, TaskRunner};

use super::{ManagerError, Result};
use crate::models::*;

pub const SYSTEM_MANAGER: &str = "SystemManager";

/// External source of host information (CPU, memory, uptime, ...).
#[async_trait]
pub trait HostInfoProvider: Send + Sync {
    async fn host_info(&self) -> anyhow::Result<HostInfo>;
}

/// Provider returning fixed values. Used when no real collector is wired in.
#[derive(Debug, Clone)]
pub struct StaticHostInfo {
    info: HostInfo,
}

impl StaticHostInfo {
    pub fn new(info: HostInfo) -> Self {
        Self { info }
    }

    /// Hostname and OS from the environment, zeroed metrics.
    pub fn from_env() -> Self {
        let hostname = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .unwrap_or_else(|_| "localhost".to_string());
        Self::new(HostInfo {
            hostname,
            os: std::env::consts::OS.to_string(),
            ..HostInfo::default()
        })
    }
}

#[async_trait]
impl HostInfoProvider for StaticHostInfo {
    async fn host_info(&self) -> anyhow::Result<HostInfo> {
        Ok(self.info.clone())
    }
}

/// Caches snapshots from a [`HostInfoProvider`].
///
/// Initialization takes a first snapshot, so a provider that is down at
/// startup makes `initialize` fail.
pub struct SystemManager {
    lifecycle: Lifecycle,
    runner: TaskRunner,
    provider: Arc<dyn HostInfoProvider>,
    latest: Mutex<Option<SystemSnapshot>>,
}

impl SystemManager {
    pub fn new(
        log: Arc<dyn LogSink>,
        progress: Arc<dyn ProgressTracker>,
        provider: Arc<dyn HostInfoProvider>,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::new(SYSTEM_MANAGER, log.clone()),
            runner: TaskRunner::new(SYSTEM_MANAGER, log, progress),
            provider,
            latest: Mutex::new(None),
        }
    }

    pub fn latest(&self) -> Result<Option<SystemSnapshot>> {
        self.lifecycle.check_initialized()?;
        Ok(self.lock().clone())
    }

    /// Query the provider and replace the cached snapshot.
    pub async fn refresh(&self) -> Result<SystemSnapshot> {
        self.lifecycle.check_initialized()?;
        self.capture().await
    }

    async fn capture(&self) -> Result<SystemSnapshot> {
        self.runner
            .execute_task_with_progress(
                "Refresh system info",
                |progress| async move {
                    progress.update(10.0)?;
                    let info = self
                        .provider
                        .host_info()
                        .await
                        .map_err(|e| ManagerError::HostInfo(format!("{:#}", e)))?;
                    progress.update(90.0)?;

                    let snapshot = SystemSnapshot {
                        info,
                        captured_at: Utc::now(),
                    };
                    *self.lock() = Some(snapshot.clone());
                    Ok::<_, ManagerError>(snapshot)
                },
                Some(1_000),
            )
            .await
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SystemSnapshot>> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ManagedComponent for SystemManager {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    async fn on_initialize(&self) -> anyhow::Result<()> {
        self.capture().await?;
        Ok(())
    }

    async fn on_shutdown(&self) -> anyhow::Result<()> {
        self.lock().take();
        Ok(())
    }
}
