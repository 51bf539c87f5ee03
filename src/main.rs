//! Storefront Dashboard - serves an interactive view of e-commerce orders.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use storefront_dashboard::cli::CliArgs;
use storefront_dashboard::config::Config;
use storefront_dashboard::data::DataLoader;
use storefront_dashboard::logger::setup_logging;
use storefront_dashboard::web::{self, AppState};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    args.apply(&mut config);

    let loader = DataLoader::from_config(&config.dataset)?;
    let table = loader
        .load_all(&config.dataset.paths)
        .context("Failed to load dataset")?;

    let state = Arc::new(AppState::new(Arc::new(table), config.dashboard.clone()));
    let addr = config.server.addr();

    info!("Starting {} on {addr}", config.dashboard.title);
    if config.server.open_browser {
        let url = format!("http://{addr}/");
        if let Err(err) = open::that(&url) {
            warn!("Could not open browser at {url}: {err}");
        }
    }

    web::serve(state, &addr)
        .await
        .with_context(|| format!("Server on {addr} stopped"))
}
