//! Process bridge: runs the analysis collaborator and relays its JSON.
//!
//! The collaborator is launched as
//! `<executable> <script> <idea> <industry> <city>` with no shell in between.
//! Everything it writes to stdout must form one JSON document. Stderr is
//! logged and never returned. The exit code is logged only.

mod capture;
pub mod invocation;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::model::{AnalysisRequest, AnalysisResult};
use crate::config::BridgeConfig;
use crate::error::{IdeaError, IdeaResult};
use invocation::Invocation;

/// Something that can turn a validated request into an analysis result.
#[async_trait]
pub trait AnalysisRunner: Send + Sync {
    async fn analyze(&self, request: AnalysisRequest) -> IdeaResult<AnalysisResult>;
}

/// Runs the configured collaborator once per request.
#[derive(Debug, Clone)]
pub struct ProcessBridge {
    config: Arc<BridgeConfig>,
    limiter: Option<Arc<Semaphore>>,
}

impl ProcessBridge {
    pub fn new(config: BridgeConfig) -> Self {
        let limiter = config
            .max_concurrent
            .map(|permits| Arc::new(Semaphore::new(permits)));
        Self {
            config: Arc::new(config),
            limiter,
        }
    }

    /// Validate the three fields and run the collaborator with them.
    pub async fn invoke(
        &self,
        idea: &str,
        industry: &str,
        city: &str,
    ) -> IdeaResult<AnalysisResult> {
        let request = AnalysisRequest::new(idea, industry, city)?;
        self.run(request).await
    }

    /// Run the collaborator for an already validated request.
    pub async fn run(&self, request: AnalysisRequest) -> IdeaResult<AnalysisResult> {
        let span = info_span!("invocation", id = %Uuid::new_v4());
        self.run_limited(request).instrument(span).await
    }

    async fn run_limited(&self, request: AnalysisRequest) -> IdeaResult<AnalysisResult> {
        let _permit = match &self.limiter {
            Some(limiter) => Some(
                Arc::clone(limiter)
                    .acquire_owned()
                    .await
                    .map_err(std::io::Error::other)?,
            ),
            None => None,
        };

        let started = Instant::now();
        let outcome = match self.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, drive(request, &self.config))
                .await
                .unwrap_or_else(|_| Err(IdeaError::Timeout(limit))),
            None => drive(request, &self.config).await,
        };
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = outcome.is_ok(),
            "Invocation finished"
        );
        outcome
    }
}

#[async_trait]
impl AnalysisRunner for ProcessBridge {
    async fn analyze(&self, request: AnalysisRequest) -> IdeaResult<AnalysisResult> {
        self.run(request).await
    }
}

async fn drive(request: AnalysisRequest, config: &BridgeConfig) -> IdeaResult<AnalysisResult> {
    let mut invocation = Invocation::new(request);
    loop {
        invocation = match invocation.finish() {
            Ok(outcome) => return outcome,
            Err(pending) => pending.advance(config).await?,
        };
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use std::time::Duration;

    fn bridge_for(dir: &tempfile::TempDir, body: &str) -> ProcessBridge {
        ProcessBridge::new(config_for(dir, body))
    }

    fn config_for(dir: &tempfile::TempDir, body: &str) -> BridgeConfig {
        let script = dir.path().join("collab.sh");
        std::fs::write(&script, body).unwrap();
        BridgeConfig {
            executable_path: PathBuf::from("/bin/sh"),
            script_path: script,
            ..BridgeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_passes_json_through() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge_for(&dir, "printf '{\"score\": 7}\\n'\n");

        let result = bridge.invoke("idea", "industry", "city").await.unwrap();
        assert_eq!(result.into_inner(), json!({"score": 7}));
    }

    #[tokio::test]
    async fn test_arguments_are_literal_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge_for(
            &dir,
            "printf '{\"count\":%d,\"idea\":\"%s\",\"industry\":\"%s\",\"city\":\"%s\"}' \"$#\" \"$1\" \"$2\" \"$3\"\n",
        );

        let result = bridge
            .invoke("a; rm -rf /", "$HOME", "São Paulo `id`")
            .await
            .unwrap();
        assert_eq!(
            result.into_inner(),
            json!({
                "count": 3,
                "idea": "a; rm -rf /",
                "industry": "$HOME",
                "city": "São Paulo `id`"
            })
        );
    }

    #[tokio::test]
    async fn test_non_json_output_is_parse_error_with_raw() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge_for(
            &dir,
            "echo 'Traceback (most recent call last):'\necho '  ValueError: boom'\n",
        );

        match bridge.invoke("idea", "industry", "city").await {
            Err(IdeaError::Parse { raw, .. }) => {
                assert_eq!(raw, "Traceback (most recent call last):\n  ValueError: boom\n");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_utf8_inside_json_string_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge_for(&dir, "printf '{\"a\":\"\\377\"}'\n");

        let result = bridge.invoke("idea", "industry", "city").await.unwrap();
        assert_eq!(result.into_inner(), json!({"a": "\u{FFFD}"}));
    }

    #[tokio::test]
    async fn test_invalid_utf8_outside_json_keeps_lossy_raw() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge_for(&dir, "printf 'bad \\377 bytes'\n");

        match bridge.invoke("idea", "industry", "city").await {
            Err(IdeaError::Parse { raw, .. }) => assert_eq!(raw, "bad \u{FFFD} bytes"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_crash_without_output_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge_for(&dir, "echo 'fatal' >&2\nexit 3\n");

        match bridge.invoke("idea", "industry", "city").await {
            Err(IdeaError::Parse { raw, .. }) => assert_eq!(raw, ""),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stderr_and_exit_code_do_not_affect_success() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge_for(
            &dir,
            "echo 'deprecation warning' >&2\nprintf '{\"ok\":true}'\nexit 2\n",
        );

        let result = bridge.invoke("idea", "industry", "city").await.unwrap();
        assert_eq!(result.into_inner(), json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_missing_executable_is_spawn_error() {
        let config = BridgeConfig {
            executable_path: PathBuf::from("/nonexistent/bin/python"),
            ..BridgeConfig::default()
        };
        let bridge = ProcessBridge::new(config);

        match bridge.invoke("idea", "industry", "city").await {
            Err(IdeaError::Spawn { program, .. }) => {
                assert_eq!(program, "/nonexistent/bin/python")
            }
            other => panic!("expected spawn error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invoke_validates_fields() {
        let bridge = ProcessBridge::new(BridgeConfig::default());
        let err = bridge.invoke("idea", "industry", "").await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_timeout_kills_hung_collaborator() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(&dir, "exec sleep 30\n");
        config.timeout_secs = Some(1);
        let bridge = ProcessBridge::new(config);

        let started = Instant::now();
        let err = bridge.invoke("idea", "industry", "city").await.unwrap_err();
        assert!(matches!(err, IdeaError::Timeout(d) if d == Duration::from_secs(1)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_concurrent_invocations_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge_for(
            &dir,
            "sleep 0.1\nprintf '{\"idea\":\"%s\",\"city\":\"%s\"}' \"$1\" \"$3\"\n",
        );

        let (a, b, c) = tokio::join!(
            bridge.invoke("alpha", "x", "Oslo"),
            bridge.invoke("beta", "x", "Lima"),
            bridge.invoke("gamma", "x", "Pune"),
        );
        assert_eq!(a.unwrap().into_inner(), json!({"idea": "alpha", "city": "Oslo"}));
        assert_eq!(b.unwrap().into_inner(), json!({"idea": "beta", "city": "Lima"}));
        assert_eq!(c.unwrap().into_inner(), json!({"idea": "gamma", "city": "Pune"}));
    }

    #[tokio::test]
    async fn test_concurrency_ceiling_serializes_runs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(
            &dir,
            concat!(
                "lock=\"$(dirname \"$0\")/running\"\n",
                "if [ -e \"$lock\" ]; then echo overlap; exit 0; fi\n",
                "touch \"$lock\"\n",
                "sleep 0.2\n",
                "rm -f \"$lock\"\n",
                "printf '{\"idea\":\"%s\"}' \"$1\"\n",
            ),
        );
        config.max_concurrent = Some(1);
        let bridge = ProcessBridge::new(config);

        let (a, b) = tokio::join!(
            bridge.invoke("first", "x", "y"),
            bridge.invoke("second", "x", "y"),
        );
        assert!(a.is_ok(), "{:?}", a);
        assert!(b.is_ok(), "{:?}", b);
    }

    #[tokio::test]
    async fn test_repeated_invocations_do_not_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge_for(&dir, "printf '{\"n\":\"%s\"}' \"$1\"\n");

        for i in 0..40 {
            let idea = i.to_string();
            let result = bridge.invoke(&idea, "x", "y").await.unwrap();
            assert_eq!(result.into_inner(), json!({"n": idea}));
        }
        for _ in 0..20 {
            assert!(bridge.invoke("x", "y", "z").await.is_ok());
        }
    }

    /// Lowest descriptor count seen over a short settle window, so pipes
    /// still closing in other tests do not inflate the reading.
    #[cfg(target_os = "linux")]
    async fn settled_fd_count() -> usize {
        let mut lowest = usize::MAX;
        for _ in 0..5 {
            let open = std::fs::read_dir("/proc/self/fd").unwrap().count();
            lowest = lowest.min(open);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        lowest
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_file_descriptors_are_released() {
        let dir = tempfile::tempdir().unwrap();
        let ok = bridge_for(&dir, "printf '{\"ok\":true}'\n");
        let broken_dir = tempfile::tempdir().unwrap();
        let broken = bridge_for(&broken_dir, "echo 'not json'\necho 'oops' >&2\n");
        let hung_dir = tempfile::tempdir().unwrap();
        let mut hung = config_for(&hung_dir, "exec sleep 30\n");
        hung.timeout_secs = Some(1);
        let hung = ProcessBridge::new(hung);

        // Warm up the runtime's blocking pool and signal driver first.
        ok.invoke("a", "b", "c").await.unwrap();
        let before = settled_fd_count().await;

        for _ in 0..40 {
            assert!(ok.invoke("a", "b", "c").await.is_ok());
            assert!(matches!(
                broken.invoke("a", "b", "c").await,
                Err(IdeaError::Parse { .. })
            ));
        }
        assert!(matches!(
            hung.invoke("a", "b", "c").await,
            Err(IdeaError::Timeout(_))
        ));

        let after = settled_fd_count().await;
        assert!(
            after <= before + 16,
            "descriptors grew from {before} to {after} over 81 runs"
        );
    }

    #[tokio::test]
    async fn test_runner_trait_object() {
        let dir = tempfile::tempdir().unwrap();
        let runner: Arc<dyn AnalysisRunner> = Arc::new(bridge_for(&dir, "printf 'null'"));
        let request = AnalysisRequest::new("a", "b", "c").unwrap();
        let result = runner.analyze(request).await.unwrap();
        assert!(result.as_value().is_null());
    }
}
