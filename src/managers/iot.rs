use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sysdeck_core::{Lifecycle, LogSink, ManagedComponent, ProgressTracker, TaskRunner};
use uuid::Uuid;

use super::{require_finite, require_name, ManagerError, Registry, Result};
use crate::models::*;

pub const IOT_MANAGER: &str = "IoTManager";

pub struct IotManager {
    lifecycle: Lifecycle,
    runner: TaskRunner,
    devices: Registry<IotDevice>,
}

impl IotManager {
    pub fn new(log: Arc<dyn LogSink>, progress: Arc<dyn ProgressTracker>) -> Self {
        Self {
            lifecycle: Lifecycle::new(IOT_MANAGER, log.clone()),
            runner: TaskRunner::new(IOT_MANAGER, log, progress),
            devices: Registry::new(),
        }
    }

    pub fn list(&self) -> Result<Vec<IotDevice>> {
        self.lifecycle.check_initialized()?;
        Ok(self.devices.list())
    }

    pub async fn register(&self, input: RegisterDeviceInput) -> Result<IotDevice> {
        self.lifecycle.check_initialized()?;
        let title = format!("Register device {}", input.name);
        self.runner
            .execute_task(
                &title,
                move || async move {
                    require_name("name", &input.name)?;
                    require_name("device_type", &input.device_type)?;

                    let now = Utc::now();
                    let device = IotDevice {
                        id: Uuid::new_v4(),
                        name: input.name,
                        device_type: input.device_type,
                        status: DeviceStatus::Offline,
                        last_reading: None,
                        unit: input.unit,
                        created_at: now,
                        updated_at: now,
                    };
                    self.devices.insert(device.clone());
                    Ok::<_, ManagerError>(device)
                },
                None,
            )
            .await
    }

    pub async fn update(&self, id: Uuid, input: UpdateDeviceInput) -> Result<IotDevice> {
        self.lifecycle.check_initialized()?;
        self.runner
            .execute_task(
                &format!("Update device {}", id),
                move || async move {
                    if let Some(reading) = input.last_reading {
                        require_finite("last_reading", reading)?;
                    }

                    self.devices
                        .update(id, |device| {
                            if let Some(status) = input.status {
                                device.status = status;
                            }
                            if input.last_reading.is_some() {
                                device.last_reading = input.last_reading;
                            }
                            device.updated_at = Utc::now();
                        })
                        .ok_or_else(|| ManagerError::not_found("Device", id))
                },
                None,
            )
            .await
    }

    pub async fn remove(&self, id: Uuid) -> Result<IotDevice> {
        self.lifecycle.check_initialized()?;
        self.runner
            .execute_task(
                &format!("Remove device {}", id),
                move || async move {
                    self.devices
                        .remove(id)
                        .ok_or_else(|| ManagerError::not_found("Device", id))
                },
                None,
            )
            .await
    }

    pub fn online_count(&self) -> Result<usize> {
        self.lifecycle.check_initialized()?;
        Ok(self
            .devices
            .list()
            .iter()
            .filter(|d| d.status == DeviceStatus::Online)
            .count())
    }
}

#[async_trait]
impl ManagedComponent for IotManager {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}
