//! Morel CLI - offline-first field journal with cloud sync
//!
//! Capture observations from the terminal, browse the local catalog, and
//! drive the cloud sync engine manually or in the foreground.

mod cli;
mod commands;
mod error;
mod profile;

use clap::Parser;

use cli::{Cli, Commands, ConfigCommand};
use commands::common::resolve_db_path;
use error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("morel=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path);

    match cli.command {
        Commands::Add {
            photo,
            extra,
            view,
            meta,
        } => commands::add::run_add(&photo, &extra, view, meta.as_deref(), &db_path).await,
        Commands::List { limit, json } => commands::list::run_list(limit, json, &db_path).await,
        Commands::Show { id } => commands::show::run_show(&id, &db_path).await,
        Commands::Sync => commands::sync::run_sync(&db_path).await,
        Commands::Status { json } => commands::status::run_status(json, &db_path).await,
        Commands::Enable => commands::settings::run_set_sync_enabled(true, &db_path).await,
        Commands::Disable => commands::settings::run_set_sync_enabled(false, &db_path).await,
        Commands::Watch => commands::watch::run_watch(&db_path).await,
        Commands::Config(ConfigCommand::Set {
            remote_url,
            remote_key,
            user_id,
            tier,
        }) => commands::config::run_config_set(
            &profile::Profile::default_path(),
            remote_url,
            remote_key,
            user_id,
            tier,
        ),
        Commands::Config(ConfigCommand::Show) => {
            commands::config::run_config_show(&profile::Profile::default_path())
        }
        Commands::Completions { shell, output } => {
            commands::completions::run_completions(shell, output.as_deref())
        }
    }
}
