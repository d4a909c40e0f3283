//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use ideabrowser_core::ServerConfig;
use std::path::PathBuf;

use crate::output;

/// Default log file used by `serve --log`.
pub const DEFAULT_LOG_FILE: &str = "ideabrowser-serve.log";

#[derive(Args)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(long, env = "IDEABROWSER_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "IDEABROWSER_PORT")]
    pub port: Option<u16>,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (implies --log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl ServeArgs {
    /// Log destination, if file logging was requested.
    pub fn log_path(&self) -> Option<PathBuf> {
        match (&self.log_file, self.log) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(PathBuf::from(DEFAULT_LOG_FILE)),
            (None, false) => None,
        }
    }
}

pub async fn execute(args: ServeArgs, mut config: ServerConfig) -> Result<()> {
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config.validate()?;

    println!();
    println!("  {} {}", "IdeaBrowser".cyan().bold(), "Core API".bold());
    println!();
    println!(
        "  {}      http://{}/",
        "Status".green(),
        config.bind_addr()
    );
    println!(
        "  {}     http://{}/api/analyze",
        "Analyze".green(),
        config.bind_addr()
    );
    println!();
    output::print_bridge_paths(&config.bridge);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    ideabrowser_web::run_server(config).await?;

    Ok(())
}
