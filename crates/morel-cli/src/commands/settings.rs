use std::path::Path;

use crate::commands::common::open_store;
use crate::error::CliError;

pub async fn run_set_sync_enabled(enabled: bool, db_path: &Path) -> Result<(), CliError> {
    let store = open_store(db_path).await?;

    let mut settings = store.load_settings().await?;
    settings.sync_enabled = enabled;
    store.save_settings(&settings).await?;

    println!(
        "Cloud sync {}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}
