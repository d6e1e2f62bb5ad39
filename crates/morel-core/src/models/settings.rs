//! Local application settings

use serde::{Deserialize, Serialize};

/// Persisted local preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Whether cloud sync runs at all
    pub sync_enabled: bool,
    /// Periodic sync interval in seconds
    pub sync_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sync_enabled: true,
            sync_interval_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_sync_every_five_minutes() {
        let settings = Settings::default();
        assert!(settings.sync_enabled);
        assert_eq!(settings.sync_interval_secs, 300);
    }
}
