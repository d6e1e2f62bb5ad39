use std::path::Path;

use morel_core::connectivity::Connectivity as _;
use morel_core::store::LocalStore;
use morel_core::util::unix_timestamp_ms;
use serde::Serialize;

use crate::commands::common::{
    build_engine, format_relative_time, open_store, resolve_account, resolve_remote_config,
};
use crate::error::CliError;
use crate::profile::Profile;

#[derive(Debug, Serialize)]
struct StatusReport {
    backend_configured: bool,
    signed_in: bool,
    online: bool,
    sync_enabled: bool,
    status: String,
    observations: usize,
    last_sync_time: Option<i64>,
    last_sync_relative: Option<String>,
}

pub async fn run_status(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let profile = Profile::load(&Profile::default_path())?;
    let store = open_store(db_path).await?;
    let settings = store.load_settings().await?;
    let last_sync_time = store.last_sync_time().await?;
    let setup = build_engine(&store, &profile).await?;

    let report = StatusReport {
        backend_configured: resolve_remote_config(&profile)?.is_some(),
        signed_in: resolve_account(&profile)?.is_some(),
        online: setup.connectivity.is_online(),
        sync_enabled: settings.sync_enabled,
        status: setup.engine.status().to_string(),
        observations: store.count().await?,
        last_sync_time,
        last_sync_relative: last_sync_time
            .map(|timestamp| format_relative_time(timestamp, unix_timestamp_ms())),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("backend configured: {}", report.backend_configured);
        println!("signed in:          {}", report.signed_in);
        println!("online:             {}", report.online);
        println!("sync enabled:       {}", report.sync_enabled);
        println!("status:             {}", report.status);
        println!("observations:       {}", report.observations);
        println!(
            "last sync:          {}",
            report.last_sync_relative.as_deref().unwrap_or("never")
        );
    }

    Ok(())
}
