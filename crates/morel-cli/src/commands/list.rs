use std::path::Path;

use morel_core::store::LocalStore;
use morel_core::util::unix_timestamp_ms;
use morel_core::Observation;
use serde::Serialize;

use crate::commands::common::{format_relative_time, open_store};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ObservationListItem {
    id: String,
    created_at: i64,
    updated_at: i64,
    relative_time: String,
    view: Option<String>,
    photo_bytes: usize,
    extra_photos: usize,
}

pub async fn run_list(limit: usize, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let store = open_store(db_path).await?;
    let observations = store.list().await?;
    let observations = &observations[..observations.len().min(limit)];

    if as_json {
        let items = observations
            .iter()
            .map(to_list_item)
            .collect::<Vec<ObservationListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_observation_lines(observations) {
            println!("{line}");
        }
    }

    Ok(())
}

fn to_list_item(observation: &Observation) -> ObservationListItem {
    ObservationListItem {
        id: observation.id.to_string(),
        created_at: observation.created_at,
        updated_at: observation.watermark(),
        relative_time: format_relative_time(observation.watermark(), unix_timestamp_ms()),
        view: observation.view.clone(),
        photo_bytes: observation.photo.len(),
        extra_photos: observation.extra_photos.len(),
    }
}

fn format_observation_lines(observations: &[Observation]) -> Vec<String> {
    let now_ms = unix_timestamp_ms();
    observations
        .iter()
        .map(|observation| {
            let id = observation.id.to_string();
            let short_id = id.chars().take(13).collect::<String>();
            let date = format_date(observation.created_at);
            let relative_time = format_relative_time(observation.watermark(), now_ms);
            let photos = 1 + observation.extra_photos.len();
            let view = observation.view.as_deref().unwrap_or("-");

            format!("{short_id:<13}  {date:<10}  {photos:>2} photo(s)  {relative_time:<10}  {view}")
        })
        .collect()
}

fn format_date(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map_or_else(|| "unknown".to_string(), |dt| dt.format("%Y-%m-%d").to_string())
}
