use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use morel_core::sync::{ScheduleOptions, SyncScheduler};

use crate::commands::common::{build_engine, open_store};
use crate::error::CliError;
use crate::profile::Profile;

pub async fn run_watch(db_path: &Path) -> Result<(), CliError> {
    let profile = Profile::load(&Profile::default_path())?;
    let store = open_store(db_path).await?;
    let setup = build_engine(&store, &profile).await?;

    let subscription = setup
        .engine
        .subscribe(|status| println!("sync status: {status}"));

    let settings = store.load_settings().await?;
    let options = ScheduleOptions {
        interval: Duration::from_secs(settings.sync_interval_secs.max(1)),
        ..ScheduleOptions::default()
    };

    let mut scheduler = SyncScheduler::start(
        Arc::clone(&setup.engine),
        store,
        setup.connectivity.as_ref(),
        options,
    )
    .await?;

    println!("Watching for sync triggers; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    scheduler.shutdown();
    setup.engine.unsubscribe(subscription);
    println!("Stopped");
    Ok(())
}
