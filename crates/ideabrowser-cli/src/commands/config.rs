//! Configuration inspection command.

use anyhow::Result;
use ideabrowser_core::ServerConfig;

use crate::output;

pub fn execute(config: &ServerConfig) -> Result<()> {
    println!("{}", config.to_toml()?);
    output::print_bridge_paths(&config.bridge);
    config.validate()?;
    Ok(())
}
