//! Connectivity seam consumed by the sync engine and scheduler.

use tokio::sync::watch;

/// Reports whether the device is online and notifies on transitions.
pub trait Connectivity: Send + Sync {
    /// Current online state, readable synchronously.
    fn is_online(&self) -> bool;

    /// Subscribe to online-state transitions.
    fn watch(&self) -> watch::Receiver<bool>;
}

/// Watch-channel backed connectivity state.
///
/// Platform integrations (or tests) flip the state with [`set_online`];
/// subscribers observe the transition through the watch channel.
///
/// [`set_online`]: SharedConnectivity::set_online
pub struct SharedConnectivity {
    tx: watch::Sender<bool>,
}

impl SharedConnectivity {
    /// Create with an initial online state.
    #[must_use]
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx }
    }

    /// Update the online state, notifying subscribers.
    pub fn set_online(&self, online: bool) {
        self.tx.send_replace(online);
    }
}

impl Default for SharedConnectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for SharedConnectivity {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn watch(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
