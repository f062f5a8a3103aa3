use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sysdeck_core::{Lifecycle, LogSink, ManagedComponent, ProgressTracker, TaskRunner};
use uuid::Uuid;

use super::{require_finite, require_name, ManagerError, Registry, Result};
use crate::models::*;

pub const ASSET_MANAGER: &str = "AssetManager";

pub struct AssetManager {
    lifecycle: Lifecycle,
    runner: TaskRunner,
    assets: Registry<Asset>,
}

impl AssetManager {
    pub fn new(log: Arc<dyn LogSink>, progress: Arc<dyn ProgressTracker>) -> Self {
        Self {
            lifecycle: Lifecycle::new(ASSET_MANAGER, log.clone()),
            runner: TaskRunner::new(ASSET_MANAGER, log, progress),
            assets: Registry::new(),
        }
    }

    pub fn list(&self) -> Result<Vec<Asset>> {
        self.lifecycle.check_initialized()?;
        Ok(self.assets.list())
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Asset>> {
        self.lifecycle.check_initialized()?;
        Ok(self.assets.get(id))
    }

    pub async fn create(&self, input: CreateAssetInput) -> Result<Asset> {
        self.lifecycle.check_initialized()?;
        let title = format!("Create asset {}", input.name);
        self.runner
            .execute_task(
                &title,
                move || async move {
                    require_name("name", &input.name)?;
                    require_finite("value", input.value)?;

                    let now = Utc::now();
                    let asset = Asset {
                        id: Uuid::new_v4(),
                        name: input.name,
                        category: input.category,
                        value: input.value,
                        location: input.location,
                        created_at: now,
                        updated_at: now,
                    };
                    self.assets.insert(asset.clone());
                    Ok::<_, ManagerError>(asset)
                },
                None,
            )
            .await
    }

    pub async fn update(&self, id: Uuid, input: UpdateAssetInput) -> Result<Asset> {
        self.lifecycle.check_initialized()?;
        self.runner
            .execute_task(
                &format!("Update asset {}", id),
                move || async move {
                    if let Some(name) = &input.name {
                        require_name("name", name)?;
                    }
                    if let Some(value) = input.value {
                        require_finite("value", value)?;
                    }

                    self.assets
                        .update(id, |asset| {
                            if let Some(name) = input.name {
                                asset.name = name;
                            }
                            if let Some(category) = input.category {
                                asset.category = category;
                            }
                            if let Some(value) = input.value {
                                asset.value = value;
                            }
                            if input.location.is_some() {
                                asset.location = input.location;
                            }
                            asset.updated_at = Utc::now();
                        })
                        .ok_or_else(|| ManagerError::not_found("Asset", id))
                },
                None,
            )
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<Asset> {
        self.lifecycle.check_initialized()?;
        self.runner
            .execute_task(
                &format!("Delete asset {}", id),
                move || async move {
                    self.assets
                        .remove(id)
                        .ok_or_else(|| ManagerError::not_found("Asset", id))
                },
                None,
            )
            .await
    }

    pub fn total_value(&self) -> Result<f64> {
        self.lifecycle.check_initialized()?;
        Ok(self.assets.list().iter().map(|a| a.value).sum())
    }
}

#[async_trait]
impl ManagedComponent for AssetManager {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}
