use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Serve an interactive dashboard over one or more order CSV files.
#[derive(Parser, Debug, PartialEq)]
#[command(version, about)]
pub struct CliArgs {
    /// CSV files to load; defaults to the configured dataset paths
    pub data: Vec<PathBuf>,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub host: Option<String>,
    #[arg(short, long)]
    pub port: Option<u16>,
    /// Do not open a browser tab on startup
    #[arg(long)]
    pub no_open: bool,
}

impl CliArgs {
    /// Command-line values take precedence over the config file.
    pub fn apply(&self, config: &mut Config) {
        if !self.data.is_empty() {
            config.dataset.paths = self.data.clone();
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.no_open {
            config.server.open_browser = false;
        }
    }
}
