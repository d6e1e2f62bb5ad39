use std::path::Path;

use morel_core::quota::Tier;
use morel_core::util::is_http_url;

use crate::error::CliError;
use crate::profile::Profile;

pub fn run_config_set(
    path: &Path,
    remote_url: Option<String>,
    remote_key: Option<String>,
    user_id: Option<String>,
    tier: Option<String>,
) -> Result<(), CliError> {
    let mut profile = Profile::load(path)?;

    if let Some(url) = remote_url {
        let url = url.trim().trim_end_matches('/').to_string();
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "remote URL must include http:// or https://".to_string(),
            ));
        }
        profile.remote_url = Some(url);
    }
    if let Some(key) = remote_key {
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(CliError::Config("remote key must not be empty".to_string()));
        }
        profile.remote_key = Some(key);
    }
    if let Some(user_id) = user_id {
        profile.user_id = Some(user_id.trim().to_string());
    }
    if let Some(raw) = tier {
        profile.tier = Some(
            raw.parse::<Tier>()
                .map_err(|error| CliError::Config(error.to_string()))?,
        );
    }

    profile.save(path)?;
    println!("{}", path.display());
    Ok(())
}

pub fn run_config_show(path: &Path) -> Result<(), CliError> {
    let profile = Profile::load(path)?;

    println!("profile:    {}", path.display());
    println!(
        "remote_url: {}",
        profile.remote_url.as_deref().unwrap_or("-")
    );
    println!(
        "remote_key: {}",
        if profile.remote_key.is_some() {
            "[set]"
        } else {
            "-"
        }
    );
    println!("user_id:    {}", profile.user_id.as_deref().unwrap_or("-"));
    println!(
        "tier:       {}",
        profile
            .tier
            .map_or_else(|| "-".to_string(), |tier| tier.to_string())
    );

    Ok(())
}
