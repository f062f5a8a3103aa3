//! Composition root: builds the shared log sink and progress ledger once and
//! hands them to every manager.

use std::sync::Arc;

use sysdeck_core::{
    CoreError, LogSink, ManagedComponent, MemoryLogSink, MemoryProgressLedger, ProgressTracker,
};

use crate::config::AppConfig;
use crate::managers::*;

#[derive(Clone)]
pub struct Services {
    pub log: Arc<MemoryLogSink>,
    pub progress: Arc<MemoryProgressLedger>,
    pub assets: Arc<AssetManager>,
    pub files: Arc<FileManager>,
    pub finance: Arc<FinanceManager>,
    pub iot: Arc<IotManager>,
    pub network: Arc<NetworkManager>,
    pub schedule: Arc<ScheduleManager>,
    pub system: Arc<SystemManager>,
    pub dashboard: Arc<DashboardManager>,
}

impl Services {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_host_info(config, Arc::new(StaticHostInfo::from_env()))
    }

    pub fn with_host_info(config: &AppConfig, host_info: Arc<dyn HostInfoProvider>) -> Self {
        let log = Arc::new(MemoryLogSink::with_max_size(config.log_max_size));
        let progress = Arc::new(MemoryProgressLedger::new(log.clone()));

        let sink: Arc<dyn LogSink> = log.clone();
        let tracker: Arc<dyn ProgressTracker> = progress.clone();

        let assets = Arc::new(AssetManager::new(sink.clone(), tracker.clone()));
        let files = Arc::new(FileManager::new(sink.clone(), tracker.clone()));
        let finance = Arc::new(FinanceManager::new(sink.clone(), tracker.clone()));
        let iot = Arc::new(IotManager::new(sink.clone(), tracker.clone()));
        let network = Arc::new(NetworkManager::new(sink.clone(), tracker.clone()));
        let schedule = Arc::new(ScheduleManager::new(sink.clone(), tracker.clone()));
        let system = Arc::new(SystemManager::new(sink.clone(), tracker.clone(), host_info));
        let dashboard = Arc::new(DashboardManager::new(
            sink,
            DashboardSources {
                log: log.clone(),
                progress: tracker,
                assets: assets.clone(),
                files: files.clone(),
                finance: finance.clone(),
                iot: iot.clone(),
                network: network.clone(),
                schedule: schedule.clone(),
                system: system.clone(),
            },
        ));

        Self {
            log,
            progress,
            assets,
            files,
            finance,
            iot,
            network,
            schedule,
            system,
            dashboard,
        }
    }

    /// Components in initialization order. The ledger comes first because every
    /// manager records progress through it.
    pub fn components(&self) -> Vec<Arc<dyn ManagedComponent>> {
        vec![
            self.progress.clone() as Arc<dyn ManagedComponent>,
            self.assets.clone(),
            self.files.clone(),
            self.finance.clone(),
            self.iot.clone(),
            self.network.clone(),
            self.schedule.clone(),
            self.system.clone(),
            self.dashboard.clone(),
        ]
    }

    /// Initialize every component in order, stopping at the first failure.
    pub async fn initialize_all(&self) -> Result<(), CoreError> {
        for component in self.components() {
            component.initialize().await?;
        }
        tracing::info!("All services initialized");
        Ok(())
    }

    /// Shut down every component in reverse order. All components are
    /// attempted; the first error is returned.
    pub async fn shutdown_all(&self) -> Result<(), CoreError> {
        let mut first_error = None;
        for component in self.components().into_iter().rev() {
            if let Err(e) = component.shutdown().await {
                tracing::error!("Shutdown of {} failed: {}", component.name(), e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
