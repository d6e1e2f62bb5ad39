use std::path::Path;

use morel_core::store::LocalStore;
use morel_core::util::unix_timestamp_ms;
use morel_core::ObservationId;

use crate::commands::common::{format_relative_time, open_store};
use crate::error::CliError;

pub async fn run_show(id: &str, db_path: &Path) -> Result<(), CliError> {
    let observation_id: ObservationId = id
        .trim()
        .parse()
        .map_err(|_| CliError::ObservationNotFound(id.to_string()))?;

    let store = open_store(db_path).await?;
    let Some(observation) = store.get(&observation_id).await? else {
        return Err(CliError::ObservationNotFound(id.to_string()));
    };

    println!("id:          {}", observation.id);
    println!("created_at:  {}", observation.created_at);
    println!(
        "updated:     {}",
        format_relative_time(observation.watermark(), unix_timestamp_ms())
    );
    println!(
        "view:        {}",
        observation.view.as_deref().unwrap_or("-")
    );
    println!("photo:       {} bytes", observation.photo.len());
    println!("extra:       {} photo(s)", observation.extra_photos.len());
    println!("meta:        {}", serde_json::to_string_pretty(&observation.meta)?);

    Ok(())
}
