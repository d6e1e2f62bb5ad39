//! Settings repository implementation

use crate::error::Result;
use crate::models::Settings;
use libsql::Connection;

/// Trait for settings storage operations (async)
#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    /// Load settings from the database
    async fn load(&self) -> Result<Settings>;

    /// Save settings to the database
    async fn save(&self, settings: &Settings) -> Result<()>;

    /// Timestamp of the last completed sync cycle (Unix ms), if any
    async fn last_sync_time(&self) -> Result<Option<i64>>;

    /// Persist the timestamp of a completed sync cycle
    async fn set_last_sync_time(&self, timestamp_ms: i64) -> Result<()>;
}

/// libSQL implementation of `SettingsRepository`
pub struct LibSqlSettingsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlSettingsRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for LibSqlSettingsRepository<'_> {
    async fn load(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        // Load each setting individually
        if let Ok(Some(value)) = self.get_setting("sync_enabled").await {
            settings.sync_enabled = matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        if let Ok(Some(value)) = self.get_setting("sync_interval_secs").await {
            if let Ok(secs) = value.parse() {
                settings.sync_interval_secs = secs;
            }
        }

        Ok(settings)
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        self.set_setting(
            "sync_enabled",
            if settings.sync_enabled { "true" } else { "false" },
        )
        .await?;
        self.set_setting(
            "sync_interval_secs",
            &settings.sync_interval_secs.to_string(),
        )
        .await?;
        Ok(())
    }

    async fn last_sync_time(&self) -> Result<Option<i64>> {
        let Some(value) = self.get_setting("last_sync_time").await? else {
            return Ok(None);
        };
        Ok(value.parse().ok())
    }

    async fn set_last_sync_time(&self, timestamp_ms: i64) -> Result<()> {
        self.set_setting("last_sync_time", &timestamp_ms.to_string())
            .await
    }
}

impl LibSqlSettingsRepository<'_> {
    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query("SELECT value FROM settings WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            let value: String = row.get(0)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
                [key, value],
            )
            .await?;
        Ok(())
    }
}
