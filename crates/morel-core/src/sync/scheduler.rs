//! Timer and connectivity wiring for the sync engine.
//!
//! The scheduler owns the persisted sync-enabled preference and fires the
//! engine on a periodic interval, on offline-to-online transitions, and
//! once at startup when local records exist.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::connectivity::Connectivity;
use crate::store::{LocalStore, ObservationStore};
use crate::sync::SyncEngine;
use crate::Result;

/// Trigger timing configuration.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleOptions {
    /// Periodic sync interval
    pub interval: Duration,
    /// Settling delay before the one-shot startup trigger
    pub startup_delay: Duration,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            startup_delay: Duration::from_secs(2),
        }
    }
}

/// Drives a [`SyncEngine`] from timers and connectivity events.
///
/// Every trigger is a spawned task held by the scheduler; `shutdown` (also
/// run on drop) aborts them all, so no timer or listener outlives the
/// scheduler on any exit route.
pub struct SyncScheduler {
    engine: Arc<SyncEngine>,
    store: ObservationStore,
    tasks: Vec<JoinHandle<()>>,
}

impl SyncScheduler {
    /// Load the persisted preference and start all triggers.
    pub async fn start(
        engine: Arc<SyncEngine>,
        store: ObservationStore,
        connectivity: &dyn Connectivity,
        options: ScheduleOptions,
    ) -> Result<Self> {
        let settings = store.load_settings().await?;
        engine.set_enabled(settings.sync_enabled);

        let mut tasks = Vec::new();

        // Periodic trigger
        {
            let engine = Arc::clone(&engine);
            tasks.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(options.interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                // The first tick completes immediately; the startup trigger
                // owns that slot
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    engine.sync().await;
                }
            }));
        }

        // Connectivity trigger: fire on offline-to-online edges only
        {
            let engine = Arc::clone(&engine);
            let mut online_rx = connectivity.watch();
            tasks.push(tokio::spawn(async move {
                let mut was_online = *online_rx.borrow();
                while online_rx.changed().await.is_ok() {
                    let online = *online_rx.borrow();
                    if online && !was_online {
                        tracing::debug!("Connectivity restored; triggering sync");
                        engine.sync().await;
                    }
                    was_online = online;
                }
            }));
        }

        // One-shot startup trigger after a settling delay; pointless on an
        // empty store
        {
            let engine = Arc::clone(&engine);
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                tokio::time::sleep(options.startup_delay).await;
                if !engine.is_enabled() {
                    return;
                }
                match store.count().await {
                    Ok(0) => tracing::debug!("Local store empty; skipping startup sync"),
                    Ok(_) => engine.sync().await,
                    Err(error) => tracing::warn!("Startup sync skipped: {error}"),
                }
            }));
        }

        Ok(Self {
            engine,
            store,
            tasks,
        })
    }

    /// The engine this scheduler drives.
    pub const fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    /// Persist and apply the sync-enabled preference.
    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        let mut settings = self.store.load_settings().await?;
        settings.sync_enabled = enabled;
        self.store.save_settings(&settings).await?;
        self.engine.set_enabled(enabled);
        Ok(())
    }

    /// Abort all trigger tasks.
    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
