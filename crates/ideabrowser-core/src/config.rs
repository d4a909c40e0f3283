//! Startup configuration.
//!
//! Values come from built-in defaults, then an optional TOML file. The CLI
//! layers environment variables and flags on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IdeaError, IdeaResult};

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "ideabrowser.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
// Resolved against the process working directory unless set in a config file.
const DEFAULT_EXECUTABLE: &str = "ml-engine/.venv/bin/python";
const DEFAULT_SCRIPT: &str = "ml-engine/src/predict.py";

/// Full server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub bridge: BridgeConfig,
}

/// How to launch the analysis collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Interpreter or binary to execute.
    pub executable_path: PathBuf,
    /// Analysis entry point, passed as the first argument.
    pub script_path: PathBuf,
    /// Kill the collaborator after this many seconds. Unset means wait forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Ceiling on concurrently running collaborators. Unset means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            bridge: BridgeConfig::default(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            executable_path: PathBuf::from(DEFAULT_EXECUTABLE),
            script_path: PathBuf::from(DEFAULT_SCRIPT),
            timeout_secs: None,
            max_concurrent: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `ideabrowser.toml` in the
    /// working directory is used when present, else the defaults.
    pub fn load(path: Option<&Path>) -> IdeaResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::from_file(local)
                } else {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a TOML file. Relative bridge paths resolve against its directory.
    pub fn from_file(path: &Path) -> IdeaResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            IdeaError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml(&content)
            .map_err(|e| IdeaError::config(format!("{}: {}", path.display(), e)))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.bridge.resolve_paths(base);
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Parse TOML content without touching the filesystem.
    pub fn from_toml(content: &str) -> IdeaResult<Self> {
        toml::from_str(content).map_err(|e| IdeaError::config(e.to_string()))
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> IdeaResult<String> {
        toml::to_string_pretty(self).map_err(|e| IdeaError::config(e.to_string()))
    }

    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> IdeaResult<()> {
        if self.port == 0 {
            return Err(IdeaError::config("port must be non-zero"));
        }
        self.bridge.validate()
    }
}

impl BridgeConfig {
    /// Anchor relative paths at `base`. Bare program names such as `python3`
    /// are left alone so they are still looked up on `PATH`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if is_relative_path(&self.executable_path) {
            self.executable_path = base.join(&self.executable_path);
        }
        if self.script_path.is_relative() {
            self.script_path = base.join(&self.script_path);
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> IdeaResult<()> {
        if self.executable_path.as_os_str().is_empty() {
            return Err(IdeaError::config("executable_path must not be empty"));
        }
        if self.script_path.as_os_str().is_empty() {
            return Err(IdeaError::config("script_path must not be empty"));
        }
        if self.timeout_secs == Some(0) {
            return Err(IdeaError::config("timeout_secs must be non-zero"));
        }
        if self.max_concurrent == Some(0) {
            return Err(IdeaError::config("max_concurrent must be non-zero"));
        }
        Ok(())
    }
}

fn is_relative_path(path: &Path) -> bool {
    path.is_relative() && path.components().count() > 1
}
