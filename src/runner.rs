//! Runs the codexbar CLI and collects one refresh snapshot
//!
//! Every failure is folded into a [`CommandResult`] with `ok == false` so the
//! tray can always render something.

use std::process::Stdio;
use std::time::Duration;

use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::process::Command;

use crate::core::{parse_payloads, ProviderPayload, SourceMode};

/// Panel text shown when the panel command fails
pub const PANEL_ERROR_TEXT: &str = "CodexBar ERR";

/// Panel text before the first refresh completes
pub const PANEL_PLACEHOLDER_TEXT: &str = "CodexBar";

/// Message shown when the usage output could not be parsed
pub const USAGE_PARSE_MESSAGE: &str = "Unable to parse usage JSON.";

/// Errors raised while launching a command
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0} not found in PATH")]
    NotFound(String),

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {secs}s")]
    Timeout { program: String, secs: f64 },
}

/// Outcome of one command invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub ok: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    fn failed(err: &RunError) -> Self {
        Self {
            ok: false,
            stdout: String::new(),
            stderr: err.to_string(),
        }
    }
}

/// Run `program` with `args`, killing it after `timeout`
pub async fn run_command(program: &str, args: &[String], timeout: Duration) -> CommandResult {
    match try_run(program, args, timeout).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("Command failed: {}", e);
            CommandResult::failed(&e)
        }
    }
}

async fn try_run(program: &str, args: &[String], timeout: Duration) -> Result<CommandResult, RunError> {
    let resolved = which::which(program).map_err(|_| RunError::NotFound(program.to_string()))?;

    tracing::debug!("Running {} {}", resolved.display(), args.join(" "));

    let child = Command::new(&resolved)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| RunError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| RunError::Spawn {
            program: program.to_string(),
            source,
        })?,
        Err(_) => {
            return Err(RunError::Timeout {
                program: program.to_string(),
                secs: timeout.as_secs_f64(),
            })
        }
    };

    Ok(CommandResult {
        ok: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// How to invoke the codexbar CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodexBarCommand {
    pub binary: String,
    pub provider: Option<String>,
    pub source: SourceMode,
    pub timeout: Duration,
}

impl CodexBarCommand {
    /// Arguments for `codexbar panel`
    pub fn panel_args(&self) -> Vec<String> {
        let mut args = vec!["panel".to_string(), "--source".to_string(), self.source.to_string()];
        self.push_provider(&mut args);
        args
    }

    /// Arguments for `codexbar usage --format json`
    pub fn usage_args(&self) -> Vec<String> {
        let mut args = vec![
            "usage".to_string(),
            "--format".to_string(),
            "json".to_string(),
            "--source".to_string(),
            self.source.to_string(),
        ];
        self.push_provider(&mut args);
        args
    }

    fn push_provider(&self, args: &mut Vec<String>) {
        if let Some(provider) = self.provider.as_deref().filter(|p| !p.is_empty()) {
            args.push("--provider".to_string());
            args.push(provider.to_string());
        }
    }

    pub async fn panel(&self) -> CommandResult {
        run_command(&self.binary, &self.panel_args(), self.timeout).await
    }

    pub async fn usage(&self) -> CommandResult {
        run_command(&self.binary, &self.usage_args(), self.timeout).await
    }

    /// Run both commands and build a snapshot
    pub async fn fetch_snapshot(&self) -> RefreshSnapshot {
        let panel = self.panel().await;
        let usage = self.usage().await;
        RefreshSnapshot::from_results(&panel, &usage, Local::now())
    }
}

/// Everything one refresh cycle produced
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSnapshot {
    /// Text for the tray label and tooltip
    pub panel_text: String,
    /// Whether the panel command succeeded with output
    pub panel_ok: bool,
    /// stderr of a failed panel command
    pub panel_error: Option<String>,
    /// Parsed provider records, empty when nothing parsed
    pub payloads: Vec<ProviderPayload>,
    /// Explanation shown instead of providers when `payloads` is empty
    pub usage_message: Option<String>,
    pub updated_at: DateTime<Local>,
}

impl RefreshSnapshot {
    /// Snapshot shown before the first refresh completes
    pub fn placeholder() -> Self {
        Self {
            panel_text: PANEL_PLACEHOLDER_TEXT.to_string(),
            panel_ok: true,
            panel_error: None,
            payloads: Vec::new(),
            usage_message: Some("Loading...".to_string()),
            updated_at: Local::now(),
        }
    }

    pub fn from_results(panel: &CommandResult, usage: &CommandResult, now: DateTime<Local>) -> Self {
        let panel_ok = panel.ok && !panel.stdout.is_empty();
        let panel_text = if panel_ok {
            panel.stdout.clone()
        } else {
            PANEL_ERROR_TEXT.to_string()
        };
        let panel_error = (!panel.ok && !panel.stderr.is_empty()).then(|| panel.stderr.clone());

        let payloads = if !usage.ok && usage.stdout.is_empty() {
            None
        } else {
            parse_payloads(&usage.stdout)
        }
        .unwrap_or_default();

        let usage_message = payloads.is_empty().then(|| {
            if usage.stderr.is_empty() {
                USAGE_PARSE_MESSAGE.to_string()
            } else {
                usage.stderr.clone()
            }
        });

        Self {
            panel_text,
            panel_ok,
            panel_error,
            payloads,
            usage_message,
            updated_at: now,
        }
    }

    /// "HH:MM:SS" of the refresh
    pub fn updated_label(&self) -> String {
        self.updated_at.format("%H:%M:%S").to_string()
    }
}
