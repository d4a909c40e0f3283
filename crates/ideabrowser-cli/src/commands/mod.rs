//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ideabrowser_core::ServerConfig;
use std::path::PathBuf;

pub mod analyze;
pub mod config;
pub mod serve;

/// IdeaBrowser Core - business idea analysis gateway
#[derive(Parser)]
#[command(name = "ideabrowser")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub config_args: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),

    /// Run a single analysis and print the result
    Analyze(analyze::AnalyzeArgs),

    /// Show the effective configuration
    Config,
}

/// Configuration overrides shared by every command.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// TOML config file (defaults to ./ideabrowser.toml when present)
    #[arg(short, long, global = true, env = "IDEABROWSER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interpreter or binary that runs the analysis script
    #[arg(long, global = true, env = "IDEABROWSER_EXECUTABLE")]
    pub executable: Option<PathBuf>,

    /// Analysis script passed as the first argument
    #[arg(long, global = true, env = "IDEABROWSER_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Kill the analysis after this many seconds
    #[arg(long, global = true, env = "IDEABROWSER_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Maximum number of analyses running at once
    #[arg(long, global = true, env = "IDEABROWSER_MAX_CONCURRENT")]
    pub max_concurrent: Option<usize>,
}

impl ConfigArgs {
    /// Load the config file and apply overrides on top.
    pub fn load(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::load(self.config.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut ServerConfig) {
        if let Some(executable) = &self.executable {
            config.bridge.executable_path = executable.clone();
        }
        if let Some(script) = &self.script {
            config.bridge.script_path = script.clone();
        }
        if self.timeout_secs.is_some() {
            config.bridge.timeout_secs = self.timeout_secs;
        }
        if self.max_concurrent.is_some() {
            config.bridge.max_concurrent = self.max_concurrent;
        }
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let settings = self.config_args.load()?;

        match self.command {
            Commands::Serve(args) => serve::execute(args, settings).await,
            Commands::Analyze(args) => analyze::execute(args, settings).await,
            Commands::Config => config::execute(&settings),
        }
    }
}
