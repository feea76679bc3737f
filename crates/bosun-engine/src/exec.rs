//! Subprocess-backed engine implementation

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use crate::engine::ConfigEngine;
use crate::error::EngineError;

/// Configuration for the subprocess engine
#[derive(Debug, Clone)]
pub struct ExecEngineConfig {
    /// Path to the control binary.
    pub binary: PathBuf,
    /// Configuration file the binary operates on.
    pub config_file: PathBuf,
    /// Optional wall-clock limit per invocation.
    pub timeout_secs: Option<u64>,
}

/// Engine implementation that shells out to the control binary
///
/// Invocations take the form
/// `<binary> --config <file> [--tid <transaction>] <action> [args...]`.
/// Failures are classified from the binary's stderr convention: lines
/// starting with `not found:` and `version mismatch:` map to the matching
/// error variants, everything else surfaces as a command failure.
pub struct ExecEngine {
    config: ExecEngineConfig,
}

impl ExecEngine {
    /// Create a new subprocess engine
    pub fn new(config: ExecEngineConfig) -> Self {
        info!(
            "Using engine binary {:?} on {:?}",
            config.binary, config.config_file
        );
        Self { config }
    }

    fn classify(status: i32, stderr: String) -> EngineError {
        if let Some(detail) = stderr.strip_prefix("not found:") {
            EngineError::NotFound(detail.trim().to_string())
        } else if let Some(detail) = stderr.strip_prefix("version mismatch:") {
            EngineError::Conflict(detail.trim().to_string())
        } else {
            EngineError::Command { status, stderr }
        }
    }

    async fn invoke(
        &self,
        action: &str,
        transaction_id: Option<&str>,
        args: &[&str],
    ) -> Result<String, EngineError> {
        let mut command = Command::new(&self.config.binary);
        command.arg("--config").arg(&self.config.config_file);
        if let Some(tid) = transaction_id {
            command.arg("--tid").arg(tid);
        }
        command.arg(action);
        command.args(args);

        debug!("Running engine action {} with {} args", action, args.len());

        let output = match self.config.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), command.output())
                .await
                .map_err(|_| EngineError::TimedOut(secs))??,
            None => command.output().await?,
        };

        if !output.status.success() {
            let status = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Self::classify(status, stderr));
        }

        String::from_utf8(output.stdout).map_err(|_| EngineError::Unreadable)
    }
}

#[async_trait]
impl ConfigEngine for ExecEngine {
    async fn run(
        &self,
        action: &str,
        transaction_id: Option<&str>,
        args: &[&str],
    ) -> Result<String, EngineError> {
        self.invoke(action, transaction_id, args).await
    }

    async fn current_version(&self, transaction_id: Option<&str>) -> Result<i64, EngineError> {
        let raw = self.invoke("version", transaction_id, &[]).await?;
        raw.trim()
            .parse()
            .map_err(|_| EngineError::BadVersion(raw.trim().to_string()))
    }
}
