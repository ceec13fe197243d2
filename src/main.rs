// src/main.rs — Decora entry point

use clap::Parser;

use decora::cli::{Cli, Commands, GalleryAction, SessionsAction};
use decora::infra::config::Config;
use decora::infra::{logger, paths};

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    paths::ensure_dirs().await?;

    match cli.command {
        Some(Commands::Sessions { action }) => match action {
            SessionsAction::List => decora::cli::sessions::run_list(),
            SessionsAction::Delete { id } => decora::cli::sessions::run_delete(&id),
            SessionsAction::Clear => decora::cli::sessions::run_clear(),
        },
        Some(Commands::Gallery { action }) => match action {
            GalleryAction::List { session } => decora::cli::gallery::run_list(&session),
            GalleryAction::Export { id, output } => {
                decora::cli::gallery::run_export(id, output.as_deref())
            }
        },
        Some(Commands::Login { token }) => decora::cli::login::run_login(token),
        Some(Commands::Status) => decora::cli::status::show_status(&config),
        Some(Commands::Chat) | None => decora::cli::chat::run_chat(&config, cli.quiet).await,
    }
}
