//! Sync status machine and observer bookkeeping.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Why a sync cycle ended in the error state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncFailure {
    /// The upload phase was blocked by the quota policy
    QuotaExceeded(String),
    /// An error escaped the per-record boundary
    Cycle(String),
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuotaExceeded(message) | Self::Cycle(message) => write!(f, "{message}"),
        }
    }
}

/// Observable sync state: `Idle -> Syncing -> {Success, Error} -> Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Syncing,
    Success,
    Error(SyncFailure),
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Syncing => write!(f, "syncing"),
            Self::Success => write!(f, "success"),
            Self::Error(failure) => write!(f, "error: {failure}"),
        }
    }
}

/// Handle returned by `subscribe`; pass back to `unsubscribe` to stop
/// receiving status transitions.
#[derive(Debug)]
pub struct Subscription {
    pub(crate) id: u64,
}

type Listener = Box<dyn Fn(&SyncStatus) + Send + Sync>;

/// Shared status cell owned by a sync engine instance.
///
/// Transitions are stamped with an epoch so a delayed settle-to-idle task
/// never clobbers the status of a newer cycle.
pub(crate) struct SyncState {
    status: Mutex<SyncStatus>,
    epoch: AtomicU64,
    last_sync_time: Mutex<Option<i64>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_subscription_id: AtomicU64,
}

impl SyncState {
    pub(crate) fn new() -> Self {
        Self {
            status: Mutex::new(SyncStatus::Idle),
            epoch: AtomicU64::new(0),
            last_sync_time: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            next_subscription_id: AtomicU64::new(0),
        }
    }

    pub(crate) fn status(&self) -> SyncStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Transition to `status`, returning the epoch of the transition.
    pub(crate) fn set_status(&self, status: SyncStatus) -> u64 {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut guard = self.status.lock().unwrap_or_else(PoisonError::into_inner);
            *guard = status.clone();
        }
        self.notify(&status);
        epoch
    }

    /// Transition to `status` only when no newer transition happened since
    /// `epoch` was observed.
    pub(crate) fn set_status_if_epoch(&self, status: SyncStatus, epoch: u64) {
        {
            let mut guard = self.status.lock().unwrap_or_else(PoisonError::into_inner);
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return;
            }
            *guard = status.clone();
        }
        self.notify(&status);
    }

    pub(crate) fn last_sync_time(&self) -> Option<i64> {
        *self
            .last_sync_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_last_sync_time(&self, timestamp_ms: i64) {
        *self
            .last_sync_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(timestamp_ms);
    }

    pub(crate) fn subscribe(&self, listener: Listener) -> Subscription {
        let id = self.next_subscription_id.fetch_add(1, Ordering::SeqCst);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        Subscription { id }
    }

    pub(crate) fn unsubscribe(&self, subscription: Subscription) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(id, _)| *id != subscription.id);
    }

    // Listeners are invoked under the listener lock; callbacks must not
    // subscribe or unsubscribe from inside the callback.
    fn notify(&self, status: &SyncStatus) {
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, listener) in listeners.iter() {
            listener(status);
        }
    }
}
