//! Lifecycle of a single collaborator run.
//!
//! ```text
//! Idle -> Spawned -> Collecting -> Terminated -> Parsed
//!                                            \-> ParseFailed
//! ```
//!
//! Each call to [`Invocation::advance`] performs exactly one transition.
//! The child is spawned with kill-on-drop, so dropping an invocation in any
//! non-terminal state kills the process and lets the runtime reap it.

use std::fmt;
use std::process::{ExitStatus, Stdio};

use serde_json::Value;
use tokio::io;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::capture::{collect_stdout, log_stderr};
use crate::analysis::model::{AnalysisRequest, AnalysisResult};
use crate::config::BridgeConfig;
use crate::error::{IdeaError, IdeaResult};

/// Discriminant of [`Invocation`], used for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Spawned,
    Collecting,
    Terminated,
    Parsed,
    ParseFailed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Spawned => "spawned",
            Phase::Collecting => "collecting",
            Phase::Terminated => "terminated",
            Phase::Parsed => "parsed",
            Phase::ParseFailed => "parse_failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum Invocation {
    Idle(AnalysisRequest),
    Spawned(Child),
    Collecting {
        child: Child,
        stdout: JoinHandle<io::Result<Vec<u8>>>,
        stderr: JoinHandle<io::Result<usize>>,
    },
    Terminated {
        status: ExitStatus,
        stdout: Vec<u8>,
    },
    Parsed(AnalysisResult),
    ParseFailed {
        raw: String,
        source: serde_json::Error,
    },
}

impl Invocation {
    pub fn new(request: AnalysisRequest) -> Self {
        Self::Idle(request)
    }

    pub fn phase(&self) -> Phase {
        match self {
            Self::Idle(_) => Phase::Idle,
            Self::Spawned(_) => Phase::Spawned,
            Self::Collecting { .. } => Phase::Collecting,
            Self::Terminated { .. } => Phase::Terminated,
            Self::Parsed(_) => Phase::Parsed,
            Self::ParseFailed { .. } => Phase::ParseFailed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase(), Phase::Parsed | Phase::ParseFailed)
    }

    /// Outcome of a terminal invocation, or the invocation itself if it
    /// still has work to do.
    pub fn finish(self) -> Result<IdeaResult<AnalysisResult>, Self> {
        match self {
            Self::Parsed(result) => Ok(Ok(result)),
            Self::ParseFailed { raw, source } => Ok(Err(IdeaError::Parse { raw, source })),
            pending => Err(pending),
        }
    }

    /// Perform one transition. Terminal states are returned unchanged.
    pub async fn advance(self, config: &BridgeConfig) -> IdeaResult<Self> {
        let from = self.phase();
        let next = match self {
            Self::Idle(request) => Self::Spawned(spawn(config, &request)?),
            Self::Spawned(mut child) => {
                let stdout = child
                    .stdout
                    .take()
                    .ok_or_else(|| io::Error::other("collaborator stdout was not piped"))?;
                let stderr = child
                    .stderr
                    .take()
                    .ok_or_else(|| io::Error::other("collaborator stderr was not piped"))?;
                Self::Collecting {
                    child,
                    stdout: tokio::spawn(collect_stdout(stdout)),
                    stderr: tokio::spawn(log_stderr(stderr)),
                }
            }
            Self::Collecting {
                mut child,
                stdout,
                stderr,
            } => {
                let status = child.wait().await?;
                let stdout = stdout.await.map_err(io::Error::other)??;
                match stderr.await {
                    Ok(Ok(lines)) => debug!(lines, "Collaborator stderr closed"),
                    Ok(Err(e)) => warn!(error = %e, "Failed reading collaborator stderr"),
                    Err(e) => warn!(error = %e, "Collaborator stderr reader aborted"),
                }
                if !status.success() {
                    warn!(%status, "Collaborator exited unsuccessfully");
                }
                Self::Terminated { status, stdout }
            }
            Self::Terminated { status, stdout } => {
                debug!(%status, bytes = stdout.len(), "Parsing collaborator output");
                // Invalid UTF-8 is replaced before parsing, not rejected.
                let raw = String::from_utf8_lossy(&stdout).into_owned();
                match serde_json::from_str::<Value>(&raw) {
                    Ok(value) => Self::Parsed(AnalysisResult::new(value)),
                    Err(source) => Self::ParseFailed { raw, source },
                }
            }
            terminal => terminal,
        };
        debug!(%from, to = %next.phase(), "Invocation transition");
        Ok(next)
    }
}

fn spawn(config: &BridgeConfig, request: &AnalysisRequest) -> IdeaResult<Child> {
    let child = Command::new(&config.executable_path)
        .arg(&config.script_path)
        .args(request.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| IdeaError::Spawn {
            program: config.executable_path.display().to_string(),
            source,
        })?;
    debug!(pid = ?child.id(), "Collaborator spawned");
    Ok(child)
}
