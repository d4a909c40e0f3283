//! IdeaBrowser CLI
//!
//! Serves the analysis gateway or runs a single analysis from the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{Cli, Commands};

/// Initialize tracing with optional file logging.
///
/// Commands other than `serve` print results on stdout, so their logs go to
/// stderr instead.
fn init_tracing(log_file: Option<&Path>, to_stderr: bool, verbose: bool) -> Result<Option<WorkerGuard>> {
    let default_filter = if verbose {
        "ideabrowser=debug,ideabrowser_core=debug,ideabrowser_web=debug,tower_http=debug"
    } else {
        "ideabrowser=info,ideabrowser_core=info,ideabrowser_web=info,tower_http=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if let Some(path) = log_file {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .context("Log file path has no file name")?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(name.to_string_lossy().into_owned())
            .build(dir)
            .context("Failed to open log file")?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        // Log to both stdout and file when --log is used
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
        Ok(Some(guard))
    } else if to_stderr {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
        Ok(None)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
        Ok(None)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Serve(args) => args.log_path(),
        _ => None,
    };
    let to_stderr = !matches!(&cli.command, Commands::Serve(_));
    let _guard = init_tracing(log_file.as_deref(), to_stderr, cli.verbose)?;

    cli.execute().await
}
