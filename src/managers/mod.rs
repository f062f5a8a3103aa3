//! Domain managers.
//!
//! Every manager follows the same shape: a [`Lifecycle`](sysdeck_core::Lifecycle)
//! that gates all public operations, a [`TaskRunner`](sysdeck_core::TaskRunner)
//! that wraps each mutation in a logged, progress-tracked task, and a
//! [`Registry`] holding its records.

mod asset;
mod dashboard;
mod file;
mod finance;
mod iot;
mod network;
mod registry;
mod schedule;
mod system;

pub use asset::*;
pub use dashboard::*;
pub use file::*;
pub use finance::*;
pub use iot::*;
pub use network::*;
pub use registry::*;
pub use schedule::*;
pub use system::*;

use sysdeck_core::CoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Host info unavailable: {0}")]
    HostInfo(String),
}

impl ManagerError {
    pub fn not_found(kind: &'static str, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }
}

pub type Result<T, E = ManagerError> = std::result::Result<T, E>;

pub(crate) fn require_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ManagerError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub(crate) fn require_finite(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ManagerError::Invalid(format!("{} must be a finite number", field)));
    }
    Ok(())
}
