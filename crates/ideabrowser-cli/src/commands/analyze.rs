//! One-shot analysis command.

use anyhow::{bail, Result};
use clap::Args;
use ideabrowser_core::{IdeaError, ProcessBridge, ServerConfig};
use tracing::debug;

use crate::output;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Business idea or pitch
    pub idea: String,

    /// Industry the idea belongs to
    pub industry: String,

    /// City the business would operate in
    pub city: String,

    /// Print single-line JSON
    #[arg(long)]
    pub compact: bool,
}

pub async fn execute(args: AnalyzeArgs, config: ServerConfig) -> Result<()> {
    config.bridge.validate()?;
    debug!(
        executable = %config.bridge.executable_path.display(),
        script = %config.bridge.script_path.display(),
        "Running one-shot analysis"
    );
    let bridge = ProcessBridge::new(config.bridge);

    match bridge.invoke(&args.idea, &args.industry, &args.city).await {
        Ok(result) => output::print_result(&result, args.compact),
        Err(IdeaError::Parse { raw, source }) => {
            output::print_parse_failure(&raw, &source);
            bail!("Analysis failed")
        }
        Err(e) => Err(e.into()),
    }
}
