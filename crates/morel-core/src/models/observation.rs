//! Observation model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A unique identifier for an observation, using UUID v7 (time-sortable)
///
/// Generated client-side at creation and never reassigned; it is the join
/// key for reconciliation between the local and remote stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservationId(Uuid);

impl ObservationId {
    /// Create a new unique observation ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ObservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObservationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A single field observation: photos plus structured metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Unique identifier
    pub id: ObservationId,
    /// Creation timestamp (Unix ms), immutable
    pub created_at: i64,
    /// Primary photo bytes, never empty
    pub photo: Vec<u8>,
    /// Additional photo bytes, ordered
    pub extra_photos: Vec<Vec<u8>>,
    /// Opaque display field mirrored to the remote store
    pub view: Option<String>,
    /// Open metadata map; opaque to sync except `detail.updatedAt`
    pub meta: serde_json::Value,
}

impl Observation {
    /// Create a new observation with the given primary photo
    #[must_use]
    pub fn new(photo: Vec<u8>) -> Self {
        Self {
            id: ObservationId::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
            photo,
            extra_photos: Vec::new(),
            view: None,
            meta: serde_json::Value::Null,
        }
    }

    /// Logical last-write timestamp used for conflict resolution.
    ///
    /// Reads `meta.detail.updatedAt` when present; falls back to
    /// `created_at` for observations whose details were never edited.
    #[must_use]
    pub fn watermark(&self) -> i64 {
        self.meta
            .pointer("/detail/updatedAt")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(self.created_at)
    }
}
