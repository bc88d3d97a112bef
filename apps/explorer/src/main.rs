use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{config, HttpGateway, Tab, UserController};
use shared::domain::PageNumber;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(about = "Browse a user's repositories and activity feed")]
struct Cli {
    /// Backend base url, overrides the settings file and environment.
    #[arg(long)]
    api_url: Option<String>,
    /// Settings file. Defaults to ./explorer.toml when it exists.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a user's summary and one panel of detail.
    User {
        username: String,
        #[arg(long, value_enum, default_value_t = TabArg::Repos)]
        tab: TabArg,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show backend statistics.
    Stats,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TabArg {
    #[value(name = "none")]
    Hidden,
    Repos,
    Events,
}

impl From<TabArg> for Tab {
    fn from(value: TabArg) -> Self {
        match value {
            TabArg::Hidden => Tab::Hidden,
            TabArg::Repos => Tab::RepoList,
            TabArg::Events => Tab::EventList,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => config::load_settings_from(Some(path.as_path()), |key| {
            std::env::var(key).ok()
        })?,
        None => config::load_settings()?,
    };
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    let gateway =
        Arc::new(HttpGateway::new(&settings).context("failed to set up backend gateway")?);
    info!(api = %gateway.base_url(), "using backend");

    match cli.command {
        Command::Stats => {
            let stats = gateway
                .fetch_stats()
                .await
                .context("failed to fetch backend statistics")?;
            println!("{}", render::stats(&stats));
        }
        Command::User {
            username,
            tab,
            page,
        } => {
            let page = PageNumber::try_from(page)?;
            let controller = UserController::new(gateway);

            controller.submit_user(&username).await;
            if let Some(err) = controller.snapshot().await.last_error {
                bail!(err);
            }

            if tab == TabArg::Events && page != PageNumber::FIRST {
                controller.go_to_event_page(page).await;
            }
            controller.select_tab(tab.into()).await;

            let session = controller.snapshot().await;
            println!("{}", render::session(&session, Utc::now()));
            if let Some(err) = session.last_error {
                bail!(err);
            }
        }
    }

    Ok(())
}
