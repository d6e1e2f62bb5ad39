use std::path::Path;

use morel_core::store::LocalStore;
use morel_core::Observation;

use crate::commands::common::open_store;
use crate::error::CliError;

pub async fn run_add(
    photo_path: &Path,
    extra_paths: &[std::path::PathBuf],
    view: Option<String>,
    meta_json: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let photo = std::fs::read(photo_path)?;
    if photo.is_empty() {
        return Err(CliError::EmptyPhoto(photo_path.display().to_string()));
    }

    let mut observation = Observation::new(photo);
    observation.view = view;

    for path in extra_paths {
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(CliError::EmptyPhoto(path.display().to_string()));
        }
        observation.extra_photos.push(bytes);
    }

    if let Some(raw) = meta_json {
        let meta: serde_json::Value =
            serde_json::from_str(raw).map_err(|error| CliError::InvalidMeta(error.to_string()))?;
        if !meta.is_object() {
            return Err(CliError::InvalidMeta("expected a JSON object".to_string()));
        }
        observation.meta = meta;
    }

    let store = open_store(db_path).await?;
    store.insert(&observation).await?;

    println!("{}", observation.id);
    Ok(())
}
