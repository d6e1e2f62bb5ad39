//! Shared local store service wrapper used across clients.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::db::{
    Database, LibSqlObservationRepository, LibSqlSettingsRepository, ObservationRepository,
    SettingsRepository,
};
use crate::models::{Observation, ObservationId, Settings};
use crate::Result;

/// Storage seam the sync engine reconciles against.
///
/// `insert` takes the observation's pre-generated id, so the engine never
/// needs a side channel into storage internals during the download phase.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// List all observations
    async fn list(&self) -> Result<Vec<Observation>>;

    /// Fetch one observation by id
    async fn get(&self, id: &ObservationId) -> Result<Option<Observation>>;

    /// Insert an observation with its explicit id
    async fn insert(&self, observation: &Observation) -> Result<()>;

    /// Overwrite an existing observation
    async fn update(&self, observation: &Observation) -> Result<()>;

    /// Count stored observations
    async fn count(&self) -> Result<usize>;

    /// Timestamp of the last completed sync cycle (Unix ms), if any
    async fn last_sync_time(&self) -> Result<Option<i64>>;

    /// Persist the timestamp of a completed sync cycle
    async fn record_sync_time(&self, timestamp_ms: i64) -> Result<()>;
}

/// Thread-safe service for local DB and repository operations.
#[derive(Clone)]
pub struct ObservationStore {
    db: Arc<Mutex<Database>>,
}

impl ObservationStore {
    /// Open a store at the given filesystem path.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&db_path).await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Open an in-memory store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Load settings.
    pub async fn load_settings(&self) -> Result<Settings> {
        let db = self.db.lock().await;
        let repo = LibSqlSettingsRepository::new(db.connection());
        repo.load().await
    }

    /// Save settings.
    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlSettingsRepository::new(db.connection());
        repo.save(settings).await
    }
}

#[async_trait]
impl LocalStore for ObservationStore {
    async fn list(&self) -> Result<Vec<Observation>> {
        let db = self.db.lock().await;
        let repo = LibSqlObservationRepository::new(db.connection());
        repo.list().await
    }

    async fn get(&self, id: &ObservationId) -> Result<Option<Observation>> {
        let db = self.db.lock().await;
        let repo = LibSqlObservationRepository::new(db.connection());
        repo.get(id).await
    }

    async fn insert(&self, observation: &Observation) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlObservationRepository::new(db.connection());
        repo.insert(observation).await
    }

    async fn update(&self, observation: &Observation) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlObservationRepository::new(db.connection());
        repo.update(observation).await
    }

    async fn count(&self) -> Result<usize> {
        let db = self.db.lock().await;
        let repo = LibSqlObservationRepository::new(db.connection());
        repo.count().await
    }

    async fn last_sync_time(&self) -> Result<Option<i64>> {
        let db = self.db.lock().await;
        let repo = LibSqlSettingsRepository::new(db.connection());
        repo.last_sync_time().await
    }

    async fn record_sync_time(&self, timestamp_ms: i64) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlSettingsRepository::new(db.connection());
        repo.set_last_sync_time(timestamp_ms).await
    }
}
