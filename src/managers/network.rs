use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use sysdeck_core::{Lifecycle, LogSink, ManagedComponent, Metadata, ProgressTracker, TaskRunner};
use uuid::Uuid;

use super::{require_name, ManagerError, Registry, Result};
use crate::models::*;

pub const NETWORK_MANAGER: &str = "NetworkManager";

/// Inventory of monitored hosts and their last reported reachability.
pub struct NetworkManager {
    lifecycle: Lifecycle,
    runner: TaskRunner,
    hosts: Registry<NetworkHost>,
}

impl NetworkManager {
    pub fn new(log: Arc<dyn LogSink>, progress: Arc<dyn ProgressTracker>) -> Self {
        Self {
            lifecycle: Lifecycle::new(NETWORK_MANAGER, log.clone()),
            runner: TaskRunner::new(NETWORK_MANAGER, log, progress),
            hosts: Registry::new(),
        }
    }

    pub fn list(&self) -> Result<Vec<NetworkHost>> {
        self.lifecycle.check_initialized()?;
        Ok(self.hosts.list())
    }

    pub async fn add(&self, input: AddHostInput) -> Result<NetworkHost> {
        self.lifecycle.check_initialized()?;
        let title = format!("Add host {}", input.name);
        self.runner
            .execute_task(
                &title,
                move || async move {
                    require_name("name", &input.name)?;
                    require_name("address", &input.address)?;

                    let host = NetworkHost {
                        id: Uuid::new_v4(),
                        name: input.name,
                        address: input.address,
                        status: HostStatus::Unknown,
                        latency_ms: None,
                        last_checked: None,
                        created_at: Utc::now(),
                    };
                    self.hosts.insert(host.clone());
                    Ok::<_, ManagerError>(host)
                },
                None,
            )
            .await
    }

    /// Store the outcome of an external probe. Hosts going down are logged as warnings.
    pub async fn record_probe(&self, id: Uuid, input: ProbeResultInput) -> Result<NetworkHost> {
        self.lifecycle.check_initialized()?;
        let host = self
            .runner
            .execute_task(
                &format!("Record probe for host {}", id),
                move || async move {
                    self.hosts
                        .update(id, |host| {
                            host.status = if input.reachable {
                                HostStatus::Up
                            } else {
                                HostStatus::Down
                            };
                            host.latency_ms = if input.reachable { input.latency_ms } else { None };
                            host.last_checked = Some(Utc::now());
                        })
                        .ok_or_else(|| ManagerError::not_found("Host", id))
                },
                None,
            )
            .await?;

        if host.status == HostStatus::Down {
            let mut metadata = Metadata::new();
            metadata.insert("host_id".to_string(), json!(host.id.to_string()));
            metadata.insert("address".to_string(), json!(&host.address));
            self.runner.log().warn(
                NETWORK_MANAGER,
                &format!("Host {} is unreachable", host.name),
                Some(metadata),
            );
        }
        Ok(host)
    }

    pub async fn remove(&self, id: Uuid) -> Result<NetworkHost> {
        self.lifecycle.check_initialized()?;
        self.runner
            .execute_task(
                &format!("Remove host {}", id),
                move || async move {
                    self.hosts
                        .remove(id)
                        .ok_or_else(|| ManagerError::not_found("Host", id))
                },
                None,
            )
            .await
    }

    /// `(up, total)` host counts.
    pub fn availability(&self) -> Result<(usize, usize)> {
        self.lifecycle.check_initialized()?;
        let hosts = self.hosts.list();
        let up = hosts.iter().filter(|h| h.status == HostStatus::Up).count();
        Ok((up, hosts.len()))
    }
}

#[async_trait]
impl ManagedComponent for NetworkManager {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}
