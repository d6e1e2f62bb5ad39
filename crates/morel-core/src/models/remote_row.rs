//! Remote row mirror of an observation

use serde::{Deserialize, Serialize};

/// A server-side row mirroring one local observation.
///
/// Rows are unique per `(user_id, local_id)`; `id` is server-assigned and
/// used only to target updates. `updated_at` is the remote watermark, set
/// from the uploading client's computed watermark at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRow {
    /// Server-assigned row identifier
    pub id: i64,
    /// Owning user; rows are visible/writable only to their owner
    pub user_id: String,
    /// The observation's local identifier
    pub local_id: String,
    /// Mirrored creation timestamp (Unix ms)
    pub created_at: i64,
    /// Remote watermark (Unix ms)
    pub updated_at: i64,
    /// Base64 text form of the compressed primary photo
    pub photo_base64: String,
    /// Base64 text forms of the compressed additional photos
    #[serde(default)]
    pub extra_photos_base64: Vec<String>,
    /// Mirrored opaque display field
    #[serde(default)]
    pub view: Option<String>,
    /// Mirrored opaque metadata map
    #[serde(default)]
    pub meta: serde_json::Value,
}

/// Client-built body for remote inserts and updates.
///
/// Identical to [`RemoteRow`] minus the server-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteRowPayload {
    pub user_id: String,
    pub local_id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub photo_base64: String,
    pub extra_photos_base64: Vec<String>,
    pub view: Option<String>,
    pub meta: serde_json::Value,
}
