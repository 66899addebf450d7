//! Systemd-backed server state probe.

use chrono::Utc;
use serenity::async_trait;
use std::ffi::OsStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::{
    config::Config,
    error::probe::ProbeUnavailable,
    model::server_state::{Group, ProcessUsage, ResourceUsage, ServerState, Uptime},
    monitor::{journal, process, ServerStateSource},
};

/// Unit properties read from `systemctl show`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitStatus {
    pub active: bool,
    /// `None` while the unit has no running main process.
    pub main_pid: Option<u32>,
    /// Unix time at which the unit last entered the active state.
    pub active_since: Option<i64>,
}

/// Parses the output of
/// `systemctl show -p ActiveState -p MainPID -p ActiveEnterTimestamp --timestamp=unix`.
///
/// Unknown units are reported by systemd as inactive, so only a missing
/// `ActiveState` line is treated as unreadable output.
pub fn parse_unit_status(output: &str) -> Result<UnitStatus, ProbeUnavailable> {
    let mut active = None;
    let mut status = UnitStatus::default();

    for line in output.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };

        match key {
            "ActiveState" => active = Some(value == "active"),
            "MainPID" => status.main_pid = value.parse().ok().filter(|pid| *pid > 0),
            "ActiveEnterTimestamp" => {
                status.active_since = value.strip_prefix('@').and_then(|ts| ts.parse().ok())
            }
            _ => {}
        }
    }

    status.active = active.ok_or_else(|| {
        ProbeUnavailable::Parse("systemctl show returned no ActiveState".to_string())
    })?;
    Ok(status)
}

/// Arguments for replaying the unit's journal.
///
/// Lines are limited to the current activation of the unit when its start time is
/// known, so members of a crashed process are not replayed into the new one.
pub fn journal_args(unit: &str, since: Option<i64>, window: usize) -> Vec<String> {
    let mut args = vec!["-u".to_string(), unit.to_string()];
    if let Some(since) = since {
        args.push("--since".to_string());
        args.push(format!("@{}", since));
    }
    args.push("-n".to_string());
    args.push(window.to_string());
    args.extend(["--no-pager", "-o", "short-iso"].map(str::to_string));
    args
}

/// Metrics gathered from sysinfo in one blocking pass.
struct Metrics {
    resource_usage: Option<ResourceUsage>,
    process: Option<ProcessUsage>,
    uptime: Uptime,
}

/// Reads the monitored server's state from systemd, its journal and sysinfo.
///
/// - `systemctl show` gives the active state, main PID and activation time
/// - the journal since that activation, at most `journal_window` lines, is
///   replayed into groups
/// - `ss` counts established connections on the relay port
/// - sysinfo provides system and process usage
///
/// A missing metric leaves the corresponding field `None` rather than failing the
/// whole fetch; only an unreadable service state or journal is a `ProbeUnavailable`.
pub struct SystemdProbe {
    unit: String,
    process_name: String,
    port: u16,
    journal_window: usize,
    timeout: Duration,
    /// Kept across polls so CPU usage is measured between consecutive fetches.
    system: Arc<Mutex<System>>,
}

impl SystemdProbe {
    pub fn new(config: &Config) -> Self {
        Self {
            unit: config.service_unit.clone(),
            process_name: config.service_process_name.clone(),
            port: config.service_port,
            journal_window: config.journal_window,
            timeout: config.probe_timeout,
            system: Arc::new(Mutex::new(System::new())),
        }
    }

    async fn unit_status(&self) -> Result<UnitStatus, ProbeUnavailable> {
        let output = process::run_checked(
            "systemctl",
            &[
                "show",
                &self.unit,
                "-p",
                "ActiveState",
                "-p",
                "MainPID",
                "-p",
                "ActiveEnterTimestamp",
                "--timestamp=unix",
            ],
            self.timeout,
        )
        .await?;

        parse_unit_status(&output.stdout)
    }

    async fn read_groups(&self, since: Option<i64>) -> Result<Vec<Group>, ProbeUnavailable> {
        let args = journal_args(&self.unit, since, self.journal_window);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = process::run_checked("journalctl", &args, self.timeout).await?;

        Ok(journal::replay_groups(output.stdout.lines(), Utc::now()))
    }

    async fn count_connections(&self) -> Option<usize> {
        let filter = format!("( sport = :{} )", self.port);
        match process::run_checked(
            "ss",
            &["-Htn", "state", "established", &filter],
            self.timeout,
        )
        .await
        {
            Ok(output) => Some(
                output
                    .stdout
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .count(),
            ),
            Err(e) => {
                tracing::debug!("Failed to count connections on port {}: {}", self.port, e);
                None
            }
        }
    }

    async fn collect_metrics(&self, unit: &UnitStatus) -> Result<Metrics, ProbeUnavailable> {
        let system = self.system.clone();
        let process_name = self.process_name.clone();
        let main_pid = unit.main_pid;
        let active_since = unit.active_since.filter(|_| unit.active);

        tokio::task::spawn_blocking(move || {
            let mut system = system.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            system.refresh_cpu_usage();
            system.refresh_memory();
            system.refresh_processes(ProcessesToUpdate::All, true);

            let total_memory = system.total_memory();
            let resource_usage = (total_memory > 0).then(|| ResourceUsage {
                cpu_pct: system.global_cpu_usage(),
                mem_pct: (system.used_memory() as f64 / total_memory as f64 * 100.0) as f32,
            });

            let now = Utc::now().timestamp().max(0) as u64;
            let server_process = main_pid
                .and_then(|pid| system.process(Pid::from_u32(pid)))
                .or_else(|| system.processes_by_name(OsStr::new(&process_name)).next());

            let process = server_process.map(|p| ProcessUsage {
                pid: p.pid().as_u32(),
                cpu_pct: p.cpu_usage(),
                mem_mb: p.memory() as f64 / 1024.0 / 1024.0,
            });
            let service = active_since
                .and_then(|start| u64::try_from(start).ok())
                .or_else(|| server_process.map(|p| p.start_time()))
                .filter(|start| *start > 0 && *start <= now)
                .map(|start| Duration::from_secs(now - start));

            Metrics {
                resource_usage,
                process,
                uptime: Uptime {
                    system: Duration::from_secs(System::uptime()),
                    service,
                },
            }
        })
        .await
        .map_err(|e| ProbeUnavailable::Metrics(e.to_string()))
    }

    async fn fetch_state(&self) -> Result<ServerState, ProbeUnavailable> {
        let timestamp = Utc::now();
        let unit = self.unit_status().await?;
        let online = unit.active;
        let metrics = self.collect_metrics(&unit).await?;

        if !online {
            return Ok(ServerState {
                resource_usage: metrics.resource_usage,
                uptime: Some(metrics.uptime),
                ..ServerState::offline(timestamp)
            });
        }

        let groups = self.read_groups(unit.active_since).await?;
        let connections = self.count_connections().await;

        Ok(ServerState {
            online,
            groups,
            resource_usage: metrics.resource_usage,
            process: metrics.process,
            connections,
            uptime: Some(metrics.uptime),
            timestamp,
        })
    }
}

#[async_trait]
impl ServerStateSource for SystemdProbe {
    async fn fetch(&self) -> Result<ServerState, ProbeUnavailable> {
        tokio::time::timeout(self.timeout, self.fetch_state())
            .await
            .map_err(|_| ProbeUnavailable::TimedOut(self.timeout))?
    }
}
