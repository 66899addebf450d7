//! Systemd-backed server controller.

use serenity::async_trait;
use std::time::Duration;

use crate::{
    config::Config,
    error::{command::CommandError, control::ControlError},
    monitor::{process, ServerControl},
};

/// Restarts the server through systemd and tails its journal.
pub struct SystemdController {
    unit: String,
    timeout: Duration,
}

impl SystemdController {
    pub fn new(config: &Config) -> Self {
        Self {
            unit: config.service_unit.clone(),
            timeout: config.probe_timeout,
        }
    }
}

#[async_trait]
impl ServerControl for SystemdController {
    async fn restart(&self) -> Result<(), ControlError> {
        // --no-block returns once the job is queued instead of waiting for the restart.
        process::run_checked(
            "systemctl",
            &["restart", "--no-block", &self.unit],
            self.timeout,
        )
        .await?;

        Ok(())
    }

    async fn tail_logs(&self, lines: usize) -> Result<Vec<String>, ControlError> {
        if lines == 0 {
            return Ok(Vec::new());
        }

        let count = lines.to_string();
        let output = process::run_checked(
            "journalctl",
            &[
                "-u",
                &self.unit,
                "-n",
                &count,
                "--no-pager",
                "-o",
                "short-iso",
            ],
            self.timeout,
        )
        .await
        .map_err(|e| match e {
            CommandError::Failed { stderr, .. } => ControlError::LogsUnavailable(stderr),
            other => ControlError::Command(other),
        })?;

        Ok(last_log_lines(&output.stdout, lines))
    }
}

/// Keeps the last `limit` log lines, dropping journalctl's `-- ... --` banners.
pub fn last_log_lines(stdout: &str, limit: usize) -> Vec<String> {
    let lines: Vec<&str> = stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !(line.starts_with("-- ") && line.ends_with(" --")))
        .collect();

    let skip = lines.len().saturating_sub(limit);
    lines.into_iter().skip(skip).map(str::to_string).collect()
}
