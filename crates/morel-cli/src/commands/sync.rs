use std::path::Path;

use morel_core::sync::SyncStatus;

use crate::commands::common::{
    build_engine, format_relative_time, open_store, resolve_account, resolve_remote_config,
};
use crate::error::CliError;
use crate::profile::Profile;

pub async fn run_sync(db_path: &Path) -> Result<(), CliError> {
    let profile = Profile::load(&Profile::default_path())?;
    if resolve_remote_config(&profile)?.is_none() {
        return Err(CliError::SyncNotConfigured);
    }
    if resolve_account(&profile)?.is_none() {
        return Err(CliError::NotSignedIn);
    }

    let store = open_store(db_path).await?;
    let setup = build_engine(&store, &profile).await?;

    setup.engine.sync().await;

    match setup.engine.status() {
        SyncStatus::Success => {
            if let Some(timestamp) = setup.engine.last_sync_time() {
                println!(
                    "Sync completed ({})",
                    format_relative_time(timestamp, morel_core::util::unix_timestamp_ms())
                );
            } else {
                println!("Sync completed");
            }
            Ok(())
        }
        SyncStatus::Error(failure) => Err(CliError::SyncFailed(failure.to_string())),
        other => {
            println!("Sync skipped ({other})");
            Ok(())
        }
    }
}
