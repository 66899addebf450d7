//! Snapshot of the monitored server.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Snapshot of the monitored server at one poll.
///
/// Built once by the probe and never mutated; the next poll produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerState {
    /// Whether the service manager reports the server as running.
    pub online: bool,
    /// Groups (rooms) as replayed from the server log, in first-seen order.
    pub groups: Vec<Group>,
    /// System-wide usage, `None` when metrics could not be collected.
    pub resource_usage: Option<ResourceUsage>,
    /// Usage of the server process itself, `None` when the process was not found.
    pub process: Option<ProcessUsage>,
    /// Established connections on the relay port, `None` when they could not be counted.
    pub connections: Option<usize>,
    pub uptime: Option<Uptime>,
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
}

impl ServerState {
    /// Snapshot of a server that is not running.
    pub fn offline(timestamp: DateTime<Utc>) -> Self {
        Self {
            online: false,
            groups: Vec::new(),
            resource_usage: None,
            process: None,
            connections: None,
            uptime: None,
            timestamp,
        }
    }

    /// Groups with at least one member.
    ///
    /// Empty groups are stale and never displayed.
    pub fn active_groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|group| !group.is_empty())
    }

    /// Total number of users across all active groups.
    pub fn total_users(&self) -> usize {
        self.active_groups().map(|group| group.members.len()).sum()
    }
}

/// A group (room) on the monitored server.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    /// Members in join order, unique by display name.
    pub members: Vec<UserRef>,
}

impl Group {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            members: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Adds a member unless one with the same display name is already present.
    pub fn join(&mut self, user: UserRef) {
        if !self.contains(&user.display_name) {
            self.members.push(user);
        }
    }

    /// Removes the member with the given display name, if present.
    pub fn leave(&mut self, display_name: &str) {
        self.members.retain(|member| member.display_name != display_name);
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.members
            .iter()
            .any(|member| member.display_name == display_name)
    }
}

/// A user connected to a group.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRef {
    pub display_name: String,
    /// Start of the user's session in this group.
    pub joined_at: DateTime<Utc>,
}

impl UserRef {
    pub fn new(display_name: impl Into<String>, joined_at: DateTime<Utc>) -> Self {
        Self {
            display_name: display_name.into(),
            joined_at,
        }
    }
}

/// System-wide CPU and memory usage in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceUsage {
    pub cpu_pct: f32,
    pub mem_pct: f32,
}

impl ResourceUsage {
    /// Highest of the tracked percentages, used for the color bands.
    pub fn peak(&self) -> f32 {
        self.cpu_pct.max(self.mem_pct)
    }
}

/// Resource usage of the server process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessUsage {
    pub pid: u32,
    pub cpu_pct: f32,
    pub mem_mb: f64,
}

/// Host and service uptime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uptime {
    pub system: Duration,
    /// `None` when the server process start time is unknown.
    pub service: Option<Duration>,
}
