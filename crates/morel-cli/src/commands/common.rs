//! Shared helpers for CLI commands.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use morel_core::auth::{Account, StaticIdentity};
use morel_core::config::RemoteConfig;
use morel_core::connectivity::{Connectivity, SharedConnectivity};
use morel_core::quota::Tier;
use morel_core::remote::{HttpRemoteStore, RemoteStore};
use morel_core::store::ObservationStore;
use morel_core::sync::{SyncEngine, SyncOptions};

use crate::error::CliError;
use crate::profile::Profile;

pub const DB_PATH_ENV: &str = "MOREL_DB_PATH";
pub const USER_ID_ENV: &str = "MOREL_USER_ID";
pub const TIER_ENV: &str = "MOREL_TIER";

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os(DB_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("morel")
        .join("morel.db")
}

pub async fn open_store(db_path: &Path) -> Result<ObservationStore, CliError> {
    tracing::debug!("Opening local store at {}", db_path.display());
    Ok(ObservationStore::open_path(db_path).await?)
}

/// Remote configuration from the environment, falling back to the profile.
pub fn resolve_remote_config(profile: &Profile) -> Result<Option<RemoteConfig>, CliError> {
    if let Some(config) = RemoteConfig::from_env()? {
        return Ok(Some(config));
    }

    match (&profile.remote_url, &profile.remote_key) {
        (Some(url), Some(key)) => Ok(Some(RemoteConfig::new(url.clone(), key.clone())?)),
        _ => Ok(None),
    }
}

/// Signed-in account from the environment, falling back to the profile.
pub fn resolve_account(profile: &Profile) -> Result<Option<Account>, CliError> {
    let user_id = env::var(USER_ID_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| profile.user_id.clone());
    let Some(user_id) = user_id else {
        return Ok(None);
    };

    let tier = match env::var(TIER_ENV) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .parse::<Tier>()
            .map_err(|error| CliError::Config(error.to_string()))?,
        _ => profile.tier.unwrap_or(Tier::Free),
    };

    Ok(Some(Account { user_id, tier }))
}

/// An engine wired from the profile plus the connectivity handle behind it.
pub struct EngineSetup {
    pub engine: Arc<SyncEngine>,
    pub connectivity: Arc<SharedConnectivity>,
}

/// Build a sync engine over the given store from profile/env configuration.
///
/// The enabled flag is loaded from the persisted settings, so a disabled
/// preference survives into one-shot invocations.
pub async fn build_engine(
    store: &ObservationStore,
    profile: &Profile,
) -> Result<EngineSetup, CliError> {
    let remote = match resolve_remote_config(profile)? {
        Some(config) => Some(Arc::new(HttpRemoteStore::new(&config)?) as Arc<dyn RemoteStore>),
        None => None,
    };

    let identity = match resolve_account(profile)? {
        Some(account) => StaticIdentity::signed_in(account.user_id, account.tier),
        None => StaticIdentity::signed_out(),
    };

    let connectivity = Arc::new(SharedConnectivity::default());

    let engine = Arc::new(SyncEngine::new(
        Arc::new(store.clone()),
        remote,
        Arc::new(identity),
        Arc::clone(&connectivity) as Arc<dyn Connectivity>,
        SyncOptions::default(),
    ));

    let settings = store.load_settings().await?;
    engine.set_enabled(settings.sync_enabled);

    Ok(EngineSetup {
        engine,
        connectivity,
    })
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
