//! Domain models for sysdeck.
//!
//! # Records
//!
//! Each manager owns one kind of record, held in memory for the life of the
//! process:
//!
//! - [`Asset`]: A tracked piece of equipment with a monetary value.
//! - [`FileRecord`]: Metadata for a tracked file.
//! - [`Transaction`]: An income or expense entry.
//! - [`IotDevice`]: A sensor or actuator with its latest reading.
//! - [`NetworkHost`]: A host whose reachability is reported by an external prober.
//! - [`ScheduleEvent`]: A calendar entry.
//! - [`SystemSnapshot`]: Cached host information from the system-info provider.
//!
//! [`Dashboard`] is derived, never stored.

mod asset;
mod dashboard;
mod file;
mod finance;
mod iot;
mod network;
mod schedule;
mod system;

pub use asset::*;
pub use dashboard::*;
pub use file::*;
pub use finance::*;
pub use iot::*;
pub use network::*;
pub use schedule::*;
pub use system::*;
