use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] morel_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Observation not found: {0}")]
    ObservationNotFound(String),
    #[error("Photo file is empty: {0}")]
    EmptyPhoto(String),
    #[error("Observation metadata must be a JSON object: {0}")]
    InvalidMeta(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Not signed in. Run `morel config set --user-id <ID> --tier <TIER>` or set MOREL_USER_ID."
    )]
    NotSignedIn,
    #[error(
        "Sync is not configured. Run `morel config set --remote-url <URL> --remote-key <KEY>` or set MOREL_REMOTE_URL and MOREL_REMOTE_KEY."
    )]
    SyncNotConfigured,
    #[error("Sync failed: {0}")]
    SyncFailed(String),
}
