//! sysdeck: backend for a system-monitor style dashboard.
//!
//! Domain managers keep their records in memory and run every mutation through
//! the [`sysdeck_core`] task runner, so each change leaves a log trail and a
//! progress record. [`app::Services`] wires them together, [`api`] exposes them
//! over HTTP.

pub mod api;
pub mod app;
pub mod config;
pub mod managers;
pub mod models;
