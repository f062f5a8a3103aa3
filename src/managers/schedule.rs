use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sysdeck_core::{Lifecycle, LogSink, ManagedComponent, ProgressTracker, TaskRunner};
use uuid::Uuid;

use super::{require_name, ManagerError, Registry, Result};
use crate::models::*;

pub const SCHEDULE_MANAGER: &str = "ScheduleManager";

pub struct ScheduleManager {
    lifecycle: Lifecycle,
    runner: TaskRunner,
    events: Registry<ScheduleEvent>,
}

impl ScheduleManager {
    pub fn new(log: Arc<dyn LogSink>, progress: Arc<dyn ProgressTracker>) -> Self {
        Self {
            lifecycle: Lifecycle::new(SCHEDULE_MANAGER, log.clone()),
            runner: TaskRunner::new(SCHEDULE_MANAGER, log, progress),
            events: Registry::new(),
        }
    }

    /// All events ordered by start time.
    pub fn list(&self) -> Result<Vec<ScheduleEvent>> {
        self.lifecycle.check_initialized()?;
        let mut events = self.events.list();
        events.sort_by_key(|e| e.starts_at);
        Ok(events)
    }

    /// Incomplete events starting at or after `now`, soonest first.
    pub fn upcoming(&self, now: DateTime<Utc>) -> Result<Vec<ScheduleEvent>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|e| !e.completed && e.starts_at >= now)
            .collect())
    }

    pub async fn create(&self, input: CreateEventInput) -> Result<ScheduleEvent> {
        self.lifecycle.check_initialized()?;
        let title = format!("Create event {}", input.title);
        self.runner
            .execute_task(
                &title,
                move || async move {
                    require_name("title", &input.title)?;
                    if input.ends_at < input.starts_at {
                        return Err(ManagerError::Invalid(
                            "ends_at must not be before starts_at".to_string(),
                        ));
                    }

                    let event = ScheduleEvent {
                        id: Uuid::new_v4(),
                        title: input.title,
                        description: input.description,
                        starts_at: input.starts_at,
                        ends_at: input.ends_at,
                        completed: false,
                        created_at: Utc::now(),
                    };
                    self.events.insert(event.clone());
                    Ok(event)
                },
                None,
            )
            .await
    }

    pub async fn complete(&self, id: Uuid) -> Result<ScheduleEvent> {
        self.lifecycle.check_initialized()?;
        self.runner
            .execute_task(
                &format!("Complete event {}", id),
                move || async move {
                    self.events
                        .update(id, |event| event.completed = true)
                        .ok_or_else(|| ManagerError::not_found("Event", id))
                },
                None,
            )
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<ScheduleEvent> {
        self.lifecycle.check_initialized()?;
        self.runner
            .execute_task(
                &format!("Delete event {}", id),
                move || async move {
                    self.events
                        .remove(id)
                        .ok_or_else(|| ManagerError::not_found("Event", id))
                },
                None,
            )
            .await
    }
}

#[async_trait]
impl ManagedComponent for ScheduleManager {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}
