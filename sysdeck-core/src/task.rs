use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::error::CoreError;
use crate::log::{LogSink, Metadata};
use crate::progress::ProgressTracker;

/// Runs units of work with log and progress bookkeeping around them.
///
/// Each call produces one "started" entry, one "completed" or "failed" entry, and
/// one progress task that ends in a terminal state. The work's own error is
/// returned unchanged; bookkeeping failures are traced and otherwise ignored.
/// Errors are rendered with `{:#}` so an `anyhow` cause chain is kept.
#[derive(Clone)]
pub struct TaskRunner {
    source: String,
    log: Arc<dyn LogSink>,
    progress: Arc<dyn ProgressTracker>,
}

/// Handed to progress-aware work so it can report intermediate percentages.
#[derive(Clone)]
pub struct ProgressHandle {
    task_id: Option<Uuid>,
    progress: Arc<dyn ProgressTracker>,
}

impl ProgressHandle {
    /// `None` when the ledger refused to start the task.
    pub fn task_id(&self) -> Option<Uuid> {
        self.task_id
    }

    /// Report progress on the runner's task. Reaching 100% does not finish it;
    /// the runner does that once the work returns.
    pub fn update(&self, percentage: f64) -> Result<(), CoreError> {
        match self.task_id {
            Some(id) => self.progress.record_progress(id, percentage),
            None => Ok(()),
        }
    }
}

impl TaskRunner {
    pub fn new(
        source: impl Into<String>,
        log: Arc<dyn LogSink>,
        progress: Arc<dyn ProgressTracker>,
    ) -> Self {
        Self {
            source: source.into(),
            log,
            progress,
        }
    }

    pub fn log(&self) -> &Arc<dyn LogSink> {
        &self.log
    }

    pub async fn execute_task<T, E, F, Fut>(
        &self,
        title: &str,
        work: F,
        estimated_time: Option<u64>,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.execute_task_with_progress(title, |_| work(), estimated_time)
            .await
    }

    pub async fn execute_task_with_progress<T, E, F, Fut>(
        &self,
        title: &str,
        work: F,
        estimated_time: Option<u64>,
    ) -> Result<T, E>
    where
        F: FnOnce(ProgressHandle) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let task_id = self.begin(title, estimated_time);
        let handle = ProgressHandle {
            task_id,
            progress: self.progress.clone(),
        };

        match work(handle).await {
            Ok(value) => {
                self.finish(title, task_id);
                Ok(value)
            }
            Err(e) => {
                self.fail(title, task_id, &format!("{:#}", e));
                Err(e)
            }
        }
    }

    fn begin(&self, title: &str, estimated_time: Option<u64>) -> Option<Uuid> {
        let task_id = match self.progress.start_task(title, estimated_time) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(source = %self.source, title, error = %e, "Could not track task progress");
                None
            }
        };
        self.log.info(
            &self.source,
            &format!("Task started: {}", title),
            task_metadata(task_id),
        );
        task_id
    }

    fn finish(&self, title: &str, task_id: Option<Uuid>) {
        if let Some(id) = task_id {
            if let Err(e) = self.progress.complete_task(id) {
                tracing::warn!(source = %self.source, task_id = %id, error = %e, "Could not complete progress task");
            }
        }
        self.log.info(
            &self.source,
            &format!("Task completed: {}", title),
            task_metadata(task_id),
        );
    }

    fn fail(&self, title: &str, task_id: Option<Uuid>, message: &str) {
        if let Some(id) = task_id {
            if let Err(e) = self.progress.error_task(id, message) {
                tracing::warn!(source = %self.source, task_id = %id, error = %e, "Could not mark progress task failed");
            }
        }
        self.log.error(
            &self.source,
            &format!("Task failed: {} - {}", title, message),
            task_metadata(task_id),
        );
    }
}

fn task_metadata(task_id: Option<Uuid>) -> Option<Metadata> {
    task_id.map(|id| {
        let mut metadata = Metadata::new();
        metadata.insert("task_id".to_string(), json!(id.to_string()));
        metadata
    })
}
