use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{millis_between, Clock, SystemClock};
use crate::error::CoreError;
use crate::lifecycle::{Lifecycle, ManagedComponent};
use crate::log::{LogSink, NullLogSink};

/// Component name the ledger logs under.
pub const PROGRESS_LEDGER_NAME: &str = "ProgressManager";

/// A tracked unit of work.
///
/// Times are in milliseconds. `elapsed_time` and `remaining_time` are
/// recomputed on every update, not continuously.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressTask {
    pub id: Uuid,
    pub title: String,
    /// Always within `0.0..=100.0`.
    pub percentage: f64,
    pub status: ProgressStatus,
    pub started_at: DateTime<Utc>,
    pub elapsed_time: u64,
    pub remaining_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Where a progress task is in its lifecycle.
///
/// - `Running`: Initial state
/// - `Success`: Finished; reached 100% or completed explicitly
/// - `Error`: Failed with a message
///
/// `Success` and `Error` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Running,
    Success,
    Error,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger of progress tasks shared by every manager.
///
/// Mutations fail with [`CoreError::TaskNotFound`] for unknown ids. Queries
/// never fail.
pub trait ProgressTracker: Send + Sync {
    /// Register a new running task and return its id.
    fn start_task(&self, title: &str, estimated_time: Option<u64>) -> Result<Uuid, CoreError>;

    /// Set the percentage (clamped to 0..=100) and re-estimate the remaining
    /// time. Reaching 100 completes the task. Terminal tasks reject updates with
    /// [`CoreError::TaskFinished`].
    fn update_progress(&self, id: Uuid, percentage: f64) -> Result<(), CoreError>;

    /// Like [`update_progress`](Self::update_progress), but the task stays
    /// `Running` at 100% until it is completed or failed explicitly.
    fn record_progress(&self, id: Uuid, percentage: f64) -> Result<(), CoreError>;

    /// Mark a task successful. A task that already finished keeps its state.
    fn complete_task(&self, id: Uuid) -> Result<(), CoreError>;

    /// Mark a task failed. A task that already finished keeps its state.
    fn error_task(&self, id: Uuid, message: &str) -> Result<(), CoreError>;

    fn get_task(&self, id: Uuid) -> Option<ProgressTask>;

    /// All tasks in the order they were started.
    fn get_tasks(&self) -> Vec<ProgressTask>;

    fn get_running_tasks(&self) -> Vec<ProgressTask> {
        self.get_tasks()
            .into_iter()
            .filter(|t| t.status == ProgressStatus::Running)
            .collect()
    }

    /// Remove a finished task. Running and unknown tasks are left alone and
    /// `false` is returned.
    fn remove_task(&self, id: Uuid) -> Result<bool, CoreError>;

    /// Remove every finished task and return how many were removed.
    fn cleanup(&self) -> Result<usize, CoreError>;
}

/// Ledger that remembers nothing. `start_task` still hands out fresh ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressLedger;

impl ProgressTracker for NullProgressLedger {
    fn start_task(&self, _title: &str, _estimated_time: Option<u64>) -> Result<Uuid, CoreError> {
        Ok(Uuid::new_v4())
    }

    fn update_progress(&self, _id: Uuid, _percentage: f64) -> Result<(), CoreError> {
        Ok(())
    }

    fn record_progress(&self, _id: Uuid, _percentage: f64) -> Result<(), CoreError> {
        Ok(())
    }

    fn complete_task(&self, _id: Uuid) -> Result<(), CoreError> {
        Ok(())
    }

    fn error_task(&self, _id: Uuid, _message: &str) -> Result<(), CoreError> {
        Ok(())
    }

    fn get_task(&self, _id: Uuid) -> Option<ProgressTask> {
        None
    }

    fn get_tasks(&self) -> Vec<ProgressTask> {
        Vec::new()
    }

    fn remove_task(&self, _id: Uuid) -> Result<bool, CoreError> {
        Ok(false)
    }

    fn cleanup(&self) -> Result<usize, CoreError> {
        Ok(0)
    }
}

/// In-memory progress ledger.
///
/// The ledger is itself a [`ManagedComponent`]: mutations are rejected until it
/// has been initialized.
pub struct MemoryProgressLedger {
    lifecycle: Lifecycle,
    tasks: Mutex<Vec<ProgressTask>>,
    clock: Arc<dyn Clock>,
}

impl MemoryProgressLedger {
    /// Ledger whose lifecycle messages go to `log`.
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self::with_clock(log, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(log: Arc<dyn LogSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            lifecycle: Lifecycle::new(PROGRESS_LEDGER_NAME, log),
            tasks: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// Ledger that logs nowhere.
    pub fn detached() -> Self {
        Self::new(Arc::new(NullLogSink))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ProgressTask>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn with_task<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut ProgressTask, DateTime<Utc>) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        self.lifecycle.check_initialized()?;
        let now = self.clock.now();
        let mut tasks = self.lock();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(CoreError::TaskNotFound(id))?;
        f(task, now)
    }

    fn set_progress(
        &self,
        id: Uuid,
        percentage: f64,
        finish_at_full: bool,
    ) -> Result<(), CoreError> {
        self.with_task(id, |task, now| {
            if task.status.is_terminal() {
                return Err(CoreError::TaskFinished {
                    id,
                    status: task.status,
                });
            }

            task.percentage = clamp_percentage(percentage);
            task.elapsed_time = millis_between(task.started_at, now);
            if let Some(remaining) = estimate_remaining(task.elapsed_time, task.percentage) {
                task.remaining_time = remaining;
            }
            if task.percentage >= 100.0 {
                task.remaining_time = 0;
                if finish_at_full {
                    task.status = ProgressStatus::Success;
                }
            }
            Ok(())
        })
    }
}

/// Linear extrapolation of the time left, assuming constant throughput.
pub fn estimate_remaining(elapsed: u64, percentage: f64) -> Option<u64> {
    if percentage <= 0.0 {
        return None;
    }
    let elapsed = elapsed as f64;
    let total = elapsed * 100.0 / percentage;
    Some((total - elapsed).max(0.0).round() as u64)
}

fn clamp_percentage(percentage: f64) -> f64 {
    if percentage.is_nan() {
        0.0
    } else {
        percentage.clamp(0.0, 100.0)
    }
}

impl ProgressTracker for MemoryProgressLedger {
    fn start_task(&self, title: &str, estimated_time: Option<u64>) -> Result<Uuid, CoreError> {
        self.lifecycle.check_initialized()?;
        let task = ProgressTask {
            id: Uuid::new_v4(),
            title: title.to_string(),
            percentage: 0.0,
            status: ProgressStatus::Running,
            started_at: self.clock.now(),
            elapsed_time: 0,
            remaining_time: estimated_time.unwrap_or(0),
            error_message: None,
        };
        let id = task.id;
        self.lock().push(task);
        tracing::debug!(task_id = %id, title, "Progress task started");
        Ok(id)
    }

    fn update_progress(&self, id: Uuid, percentage: f64) -> Result<(), CoreError> {
        self.set_progress(id, percentage, true)
    }

    fn record_progress(&self, id: Uuid, percentage: f64) -> Result<(), CoreError> {
        self.set_progress(id, percentage, false)
    }

    fn complete_task(&self, id: Uuid) -> Result<(), CoreError> {
        self.with_task(id, |task, now| {
            if task.status.is_terminal() {
                tracing::debug!(task_id = %id, status = %task.status, "Task already finished");
                return Ok(());
            }
            task.percentage = 100.0;
            task.status = ProgressStatus::Success;
            task.elapsed_time = millis_between(task.started_at, now);
            task.remaining_time = 0;
            Ok(())
        })
    }

    fn error_task(&self, id: Uuid, message: &str) -> Result<(), CoreError> {
        self.with_task(id, |task, now| {
            if task.status.is_terminal() {
                tracing::debug!(task_id = %id, status = %task.status, "Task already finished");
                return Ok(());
            }
            task.status = ProgressStatus::Error;
            task.elapsed_time = millis_between(task.started_at, now);
            task.error_message = Some(message.to_string());
            Ok(())
        })
    }

    fn get_task(&self, id: Uuid) -> Option<ProgressTask> {
        self.lock().iter().find(|t| t.id == id).cloned()
    }

    fn get_tasks(&self) -> Vec<ProgressTask> {
        self.lock().clone()
    }

    fn remove_task(&self, id: Uuid) -> Result<bool, CoreError> {
        self.lifecycle.check_initialized()?;
        let mut tasks = self.lock();
        match tasks.iter().position(|t| t.id == id) {
            Some(index) if tasks[index].status.is_terminal() => {
                tasks.remove(index);
                Ok(true)
            }
            Some(_) => {
                tracing::debug!(task_id = %id, "Skipping removal of running task");
                Ok(false)
            }
            None => Ok(false),
        }
    }

    fn cleanup(&self) -> Result<usize, CoreError> {
        self.lifecycle.check_initialized()?;
        let removed = {
            let mut tasks = self.lock();
            let before = tasks.len();
            tasks.retain(|t| t.status == ProgressStatus::Running);
            before - tasks.len()
        };
        tracing::info!(removed, "Cleaned up finished progress tasks");
        Ok(removed)
    }
}

#[async_trait]
impl ManagedComponent for MemoryProgressLedger {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}
