use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sysdeck_core::{Lifecycle, LogSink, ManagedComponent, ProgressTracker, TaskRunner};
use uuid::Uuid;

use super::{require_name, ManagerError, Registry, Result};
use crate::models::*;

pub const FILE_MANAGER: &str = "FileManager";

pub struct FileManager {
    lifecycle: Lifecycle,
    runner: TaskRunner,
    files: Registry<FileRecord>,
}

impl FileManager {
    pub fn new(log: Arc<dyn LogSink>, progress: Arc<dyn ProgressTracker>) -> Self {
        Self {
            lifecycle: Lifecycle::new(FILE_MANAGER, log.clone()),
            runner: TaskRunner::new(FILE_MANAGER, log, progress),
            files: Registry::new(),
        }
    }

    pub fn list(&self) -> Result<Vec<FileRecord>> {
        self.lifecycle.check_initialized()?;
        Ok(self.files.list())
    }

    pub fn get(&self, id: Uuid) -> Result<Option<FileRecord>> {
        self.lifecycle.check_initialized()?;
        Ok(self.files.get(id))
    }

    /// Track a new file. Paths are unique across the manager.
    pub async fn add(&self, input: AddFileInput) -> Result<FileRecord> {
        self.lifecycle.check_initialized()?;
        let title = format!("Add file {}", input.name);
        self.runner
            .execute_task(
                &title,
                move || async move {
                    require_name("name", &input.name)?;
                    require_name("path", &input.path)?;
                    self.require_unused_path(&input.path, None)?;

                    let now = Utc::now();
                    let file = FileRecord {
                        id: Uuid::new_v4(),
                        kind: input.kind.unwrap_or_else(|| FileKind::from_path(&input.path)),
                        name: input.name,
                        path: input.path,
                        size_bytes: input.size_bytes,
                        created_at: now,
                        updated_at: now,
                    };
                    self.files.insert(file.clone());
                    Ok::<_, ManagerError>(file)
                },
                None,
            )
            .await
    }

    /// Rename, move or resize a file. Moving without an explicit kind
    /// re-infers it from the new path.
    pub async fn update(&self, id: Uuid, input: UpdateFileInput) -> Result<FileRecord> {
        self.lifecycle.check_initialized()?;
        self.runner
            .execute_task(
                &format!("Update file {}", id),
                move || async move {
                    if let Some(name) = &input.name {
                        require_name("name", name)?;
                    }
                    if let Some(path) = &input.path {
                        require_name("path", path)?;
                        self.require_unused_path(path, Some(id))?;
                    }

                    self.files
                        .update(id, |file| {
                            if let Some(name) = input.name {
                                file.name = name;
                            }
                            if let Some(path) = input.path {
                                if input.kind.is_none() {
                                    file.kind = FileKind::from_path(&path);
                                }
                                file.path = path;
                            }
                            if let Some(size) = input.size_bytes {
                                file.size_bytes = size;
                            }
                            if let Some(kind) = input.kind {
                                file.kind = kind;
                            }
                            file.updated_at = Utc::now();
                        })
                        .ok_or_else(|| ManagerError::not_found("File", id))
                },
                None,
            )
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<FileRecord> {
        self.lifecycle.check_initialized()?;
        self.runner
            .execute_task(
                &format!("Delete file {}", id),
                move || async move {
                    self.files
                        .remove(id)
                        .ok_or_else(|| ManagerError::not_found("File", id))
                },
                None,
            )
            .await
    }

    /// Number of files and their combined size in bytes.
    pub fn usage(&self) -> Result<(usize, u64)> {
        self.lifecycle.check_initialized()?;
        let files = self.files.list();
        Ok((files.len(), files.iter().map(|f| f.size_bytes).sum()))
    }

    fn require_unused_path(&self, path: &str, except: Option<Uuid>) -> Result<()> {
        let taken = self
            .files
            .list()
            .iter()
            .any(|f| f.path == path && Some(f.id) != except);
        if taken {
            return Err(ManagerError::Invalid(format!("path already tracked: {}", path)));
        }
        Ok(())
    }
}

#[async_trait]
impl ManagedComponent for FileManager {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}
