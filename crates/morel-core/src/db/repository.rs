//! Observation repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for indexes

use crate::error::{Error, Result};
use crate::models::{Observation, ObservationId};
use libsql::{params, Connection, Value};

/// Trait for observation storage operations (async)
#[allow(async_fn_in_trait)]
pub trait ObservationRepository {
    /// Insert an observation with its pre-generated id
    async fn insert(&self, observation: &Observation) -> Result<()>;

    /// Get an observation by ID
    async fn get(&self, id: &ObservationId) -> Result<Option<Observation>>;

    /// List all observations, newest first
    async fn list(&self) -> Result<Vec<Observation>>;

    /// Overwrite an existing observation's photos, view, and metadata
    async fn update(&self, observation: &Observation) -> Result<()>;

    /// Count stored observations
    async fn count(&self) -> Result<usize>;
}

/// libSQL implementation of `ObservationRepository`
pub struct LibSqlObservationRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlObservationRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    async fn load_extra_photos(&self, id: &ObservationId) -> Result<Vec<Vec<u8>>> {
        let mut rows = self
            .conn
            .query(
                "SELECT data FROM observation_photos WHERE observation_id = ? ORDER BY idx",
                params![id.as_str()],
            )
            .await?;

        let mut photos = Vec::new();
        while let Some(row) = rows.next().await? {
            photos.push(row.get::<Vec<u8>>(0)?);
        }
        Ok(photos)
    }

    /// Replace the ordered additional photos for an observation
    async fn store_extra_photos(&self, id: &ObservationId, photos: &[Vec<u8>]) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM observation_photos WHERE observation_id = ?",
                params![id.as_str()],
            )
            .await?;

        for (idx, data) in photos.iter().enumerate() {
            self.conn
                .execute(
                    "INSERT INTO observation_photos (observation_id, idx, data) VALUES (?, ?, ?)",
                    params![id.as_str(), idx as i64, data.clone()],
                )
                .await?;
        }

        Ok(())
    }

    async fn parse_observation(&self, row: &libsql::Row) -> Result<Observation> {
        let id: String = row.get(0)?;
        let id: ObservationId = id
            .parse()
            .map_err(|_| Error::Database(format!("Invalid observation id in database: {id}")))?;

        let view = match row.get_value(3)? {
            Value::Text(text) => Some(text),
            _ => None,
        };

        let meta_text: String = row.get(4)?;
        let meta = serde_json::from_str(&meta_text)?;

        Ok(Observation {
            id,
            created_at: row.get(1)?,
            photo: row.get::<Vec<u8>>(2)?,
            extra_photos: self.load_extra_photos(&id).await?,
            view,
            meta,
        })
    }
}

impl ObservationRepository for LibSqlObservationRepository<'_> {
    async fn insert(&self, observation: &Observation) -> Result<()> {
        let view_value = observation
            .view
            .clone()
            .map_or(Value::Null, Value::Text);
        let meta_text = serde_json::to_string(&observation.meta)?;

        self.conn
            .execute(
                "INSERT INTO observations (id, created_at, photo, view, meta) VALUES (?, ?, ?, ?, ?)",
                params![
                    observation.id.as_str(),
                    observation.created_at,
                    observation.photo.clone(),
                    view_value,
                    meta_text
                ],
            )
            .await?;

        self.store_extra_photos(&observation.id, &observation.extra_photos)
            .await
    }

    async fn get(&self, id: &ObservationId) -> Result<Option<Observation>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, created_at, photo, view, meta FROM observations WHERE id = ?",
                params![id.as_str()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(self.parse_observation(&row).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Observation>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, created_at, photo, view, meta
                 FROM observations
                 ORDER BY created_at DESC",
                (),
            )
            .await?;

        let mut observations = Vec::new();
        while let Some(row) = rows.next().await? {
            observations.push(self.parse_observation(&row).await?);
        }

        Ok(observations)
    }

    async fn update(&self, observation: &Observation) -> Result<()> {
        let view_value = observation
            .view
            .clone()
            .map_or(Value::Null, Value::Text);
        let meta_text = serde_json::to_string(&observation.meta)?;

        let rows = self
            .conn
            .execute(
                "UPDATE observations SET photo = ?, view = ?, meta = ? WHERE id = ?",
                params![
                    observation.photo.clone(),
                    view_value,
                    meta_text,
                    observation.id.as_str()
                ],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(observation.id.to_string()));
        }

        self.store_extra_photos(&observation.id, &observation.extra_photos)
            .await
    }

    async fn count(&self) -> Result<usize> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM observations", ())
            .await?;

        let count: i64 = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        };

        Ok(usize::try_from(count).unwrap_or(0))
    }
}
