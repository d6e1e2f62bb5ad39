//! Offline-first cloud synchronization.

mod engine;
mod scheduler;
mod status;

#[cfg(test)]
pub(crate) mod support;

pub use engine::{SyncEngine, SyncOptions};
pub use scheduler::{ScheduleOptions, SyncScheduler};
pub use status::{Subscription, SyncFailure, SyncStatus};
