//! Coordination core shared by every sysdeck manager.
//!
//! # Building Blocks
//!
//! - [`Lifecycle`] / [`ManagedComponent`]: the init/shutdown contract. Every public
//!   operation on a manager calls [`Lifecycle::check_initialized`] first.
//! - [`LogSink`]: append-only application log. [`MemoryLogSink`] keeps a bounded,
//!   queryable window; [`NullLogSink`] discards everything.
//! - [`ProgressTracker`]: ledger of running/finished units of work with ETA
//!   estimation. [`MemoryProgressLedger`] is the real one, [`NullProgressLedger`]
//!   the no-op.
//! - [`TaskRunner`]: runs a unit of work so that it produces exactly one start
//!   entry, one finish (or failure) entry, and one progress record.
//!
//! All shared state is handed around as `Arc<dyn ...>` from a single composition
//! root; nothing in this crate is global.

mod clock;
mod error;
mod lifecycle;
mod log;
mod progress;
mod task;

pub use clock::*;
pub use error::*;
pub use lifecycle::*;
pub use log::*;
pub use progress::*;
pub use task::*;
