use thiserror::Error;
use uuid::Uuid;

use crate::progress::ProgressStatus;

/// Errors raised by the coordination core itself.
///
/// Errors produced by a unit of work run through [`crate::TaskRunner`] are never
/// converted into this type; they are handed back to the caller untouched.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{component} is not initialized")]
    NotInitialized { component: String },

    #[error("{component} failed to initialize: {message}")]
    Initialization { component: String, message: String },

    #[error("{component} failed to shut down: {message}")]
    Shutdown { component: String, message: String },

    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Task {id} already finished with status {status}")]
    TaskFinished { id: Uuid, status: ProgressStatus },
}

impl CoreError {
    pub fn not_initialized(component: impl Into<String>) -> Self {
        Self::NotInitialized {
            component: component.into(),
        }
    }

    /// True for errors that mean "no such task is available", including tasks
    /// that exist but can no longer be updated.
    pub fn is_task_not_found(&self) -> bool {
        matches!(self, Self::TaskNotFound(_) | Self::TaskFinished { .. })
    }
}

/// Format an error with its full cause chain on one line.
pub fn format_error(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}
