//! Rendering of server state into embeds, presence and channel names.
//!
//! Every function here is pure: the same `ServerState` always produces the same
//! output, which is what lets the live status updater detect "nothing changed" by
//! comparing rendered values.

use std::time::Duration;

use crate::model::{
    server_state::{Group, ServerState},
    status::{
        ActivityKind, Availability, Panel, Presence, RenderedStatus, StatusColor, StatusField,
    },
};

/// Discord allows 25 fields per embed; the last one is kept for the overflow line.
const MAX_GROUP_FIELDS: usize = 24;
const MAX_MEMBERS_PER_GROUP: usize = 8;
const GROUPS_PER_PANEL: usize = 24;
const MEMBERS_PER_GROUP_SUMMARY: usize = 5;
/// Log replies stay below Discord's 2048 character embed description limit.
const MAX_LOG_CHARS: usize = 1900;

const WARN_USAGE_PCT: f32 = 70.0;
const CRITICAL_USAGE_PCT: f32 = 90.0;

/// Renders `ServerState` snapshots for display.
#[derive(Debug, Clone)]
pub struct StatusRenderer {
    server_name: String,
    refresh_interval: Duration,
}

impl StatusRenderer {
    /// Creates a renderer.
    ///
    /// # Arguments
    /// - `server_name` - Name of the monitored server, used in titles
    /// - `refresh_interval` - Live status refresh interval, mentioned in the description
    pub fn new(server_name: impl Into<String>, refresh_interval: Duration) -> Self {
        Self {
            server_name: server_name.into(),
            refresh_interval,
        }
    }

    /// Title of the live status embed, also used to find an existing status message.
    pub fn live_title(&self) -> String {
        format!("{} Live Sessions", self.server_name)
    }

    /// Renders the live status surface.
    ///
    /// Groups are sorted by id, empty groups are left out, and percentages use one
    /// decimal so that equal states always render identically.
    pub fn render(&self, state: &ServerState) -> RenderedStatus {
        let mut fields = Vec::new();
        let groups = sorted_active_groups(state);

        if !state.online {
            fields.push(StatusField::new(
                "⚠️ Server Offline",
                "The server is currently not running",
                false,
            ));
        } else if groups.is_empty() {
            fields.push(StatusField::new(
                "📡 Server Online",
                "No active sessions\nWaiting for users to connect...",
                false,
            ));
        } else {
            for group in groups.iter().take(MAX_GROUP_FIELDS) {
                fields.push(StatusField::new(
                    format!("👥 {} ({})", group.id, group.members.len()),
                    member_list(group),
                    true,
                ));
            }
            if groups.len() > MAX_GROUP_FIELDS {
                fields.push(StatusField::new(
                    "…",
                    format!("+{} more rooms", groups.len() - MAX_GROUP_FIELDS),
                    true,
                ));
            }
        }

        let connections = state
            .connections
            .map(|c| plural(c, "connection"))
            .unwrap_or_else(|| "? connections".to_string());

        RenderedStatus {
            title: self.live_title(),
            description: format!(
                "*Auto-updates every {}*\n{}",
                describe_interval(self.refresh_interval),
                match state.resource_usage {
                    Some(usage) => format!(
                        "CPU {} • RAM {}",
                        percent(usage.cpu_pct),
                        percent(usage.mem_pct)
                    ),
                    None => "Metrics unavailable".to_string(),
                }
            ),
            fields,
            color: status_color(state),
            footer: format!(
                "📊 {} • {} • {}",
                plural(groups.len(), "room"),
                plural(state.total_users(), "user"),
                connections
            ),
            presence_text: self.presence(state).text,
        }
    }

    /// Presence for the bot user.
    pub fn presence(&self, state: &ServerState) -> Presence {
        let users = state.total_users();

        if !state.online {
            Presence {
                activity: ActivityKind::Playing,
                text: "⚠️ Server Offline".to_string(),
                status: Availability::DoNotDisturb,
            }
        } else if users > 0 {
            Presence {
                activity: ActivityKind::Listening,
                text: format!(
                    "{} in {}",
                    plural(users, "user"),
                    plural(state.active_groups().count(), "room")
                ),
                status: Availability::Online,
            }
        } else {
            Presence {
                activity: ActivityKind::Watching,
                text: "for new connections...".to_string(),
                status: Availability::Idle,
            }
        }
    }

    /// Name of the counter channel.
    pub fn counter_name(&self, state: &ServerState) -> String {
        format!("👥 Users Online: {}", state.total_users())
    }

    /// Detailed status reply for the `status` command.
    pub fn status_panel(&self, state: &ServerState) -> Panel {
        let status = match (state.online, state.process) {
            (true, Some(process)) => format!("✅ Online (PID: {})", process.pid),
            (true, None) => "✅ Online".to_string(),
            (false, _) => "❌ Offline".to_string(),
        };

        let mut panel = Panel::new(
            format!("{} Server Status", self.server_name),
            if state.online {
                StatusColor::Green
            } else {
                StatusColor::Red
            },
        )
        .field("Status", status, true)
        .field(
            "Connections",
            state
                .connections
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            true,
        )
        .field(
            "Rooms Active",
            state.active_groups().count().to_string(),
            true,
        );

        if let Some(uptime) = state.uptime {
            panel = panel.field(
                "Uptime",
                format!(
                    "System: {}\nService: {}",
                    format_duration(uptime.system),
                    uptime
                        .service
                        .map(format_duration)
                        .unwrap_or_else(|| "Unknown".to_string())
                ),
                true,
            );
        }

        if let Some(process) = state.process {
            panel = panel.field(
                "Server Usage",
                format!(
                    "CPU: {}\nRAM: {:.1} MB",
                    percent(process.cpu_pct),
                    process.mem_mb
                ),
                true,
            );
        }

        panel.field(
            "System Resources",
            match state.resource_usage {
                Some(usage) => format!(
                    "CPU: {}\nRAM: {}",
                    percent(usage.cpu_pct),
                    percent(usage.mem_pct)
                ),
                None => "unavailable".to_string(),
            },
            true,
        )
    }

    /// Group listing for the `groups` command, split across embeds as needed.
    pub fn groups_panels(&self, state: &ServerState) -> Vec<Panel> {
        let groups = sorted_active_groups(state);

        if groups.is_empty() {
            return vec![Panel::new("📡 Active Rooms", StatusColor::Blue)
                .description("No active rooms at the moment")];
        }

        let chunks: Vec<&[&Group]> = groups.chunks(GROUPS_PER_PANEL).collect();
        let last = chunks.len() - 1;

        chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                let title = if index == 0 {
                    "📡 Active Rooms"
                } else {
                    "📡 Active Rooms (continued)"
                };
                let mut panel = Panel::new(title, StatusColor::Blue);

                for group in chunk {
                    let count = group.members.len();
                    let mut list = group
                        .members
                        .iter()
                        .take(MEMBERS_PER_GROUP_SUMMARY)
                        .map(|m| m.display_name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    if count > MEMBERS_PER_GROUP_SUMMARY {
                        list.push_str(&format!(" (+{} more)", count - MEMBERS_PER_GROUP_SUMMARY));
                    }

                    panel = panel.field(
                        format!("🎸 {}", group.id),
                        format!("**{}**\n{}", plural(count, "user"), list),
                        true,
                    );
                }

                if index == last {
                    panel.footer(format!(
                        "Total: {}, {}",
                        plural(groups.len(), "room"),
                        plural(state.total_users(), "user")
                    ))
                } else {
                    panel.footer(format!("Showing {} rooms...", chunk.len()))
                }
            })
            .collect()
    }

    /// Log reply for the `logs` command.
    pub fn logs_panel(&self, lines: &[String]) -> Panel {
        let panel = Panel::new("📜 Recent Server Logs", StatusColor::Orange);

        if lines.is_empty() {
            return panel.description("No log output yet");
        }

        let text = lines.join("\n");
        panel.description(format!("```\n{}\n```", tail_chars(&text, MAX_LOG_CHARS)))
    }

    /// Command list for the `help` command.
    pub fn help_panel(&self, prefix: &str) -> Panel {
        use crate::model::command::Command;

        let description = Command::ALL
            .iter()
            .map(|command| {
                format!(
                    "`{}{}` - {}",
                    prefix,
                    command.usage(),
                    command.description()
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        Panel::new("Commands", StatusColor::Blue).description(description)
    }
}

fn sorted_active_groups(state: &ServerState) -> Vec<&Group> {
    let mut groups: Vec<&Group> = state.active_groups().collect();
    groups.sort_by(|a, b| a.id.cmp(&b.id));
    groups
}

fn member_list(group: &Group) -> String {
    let mut list = group
        .members
        .iter()
        .take(MAX_MEMBERS_PER_GROUP)
        .map(|m| format!("• {}", m.display_name))
        .collect::<Vec<_>>()
        .join("\n");

    if group.members.len() > MAX_MEMBERS_PER_GROUP {
        list.push_str(&format!(
            "\n*... +{} more*",
            group.members.len() - MAX_MEMBERS_PER_GROUP
        ));
    }

    list
}

/// Red when offline or any usage is critical, yellow when elevated, green otherwise.
///
/// Without metrics the color depends on `online` alone.
fn status_color(state: &ServerState) -> StatusColor {
    if !state.online {
        return StatusColor::Red;
    }

    match state.resource_usage.map(|usage| usage.peak()) {
        Some(peak) if peak >= CRITICAL_USAGE_PCT => StatusColor::Red,
        Some(peak) if peak >= WARN_USAGE_PCT => StatusColor::Yellow,
        _ => StatusColor::Green,
    }
}

fn percent(value: f32) -> String {
    format!("{:.1}%", value)
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn describe_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    match secs {
        60 => "minute".to_string(),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    }
}

/// Formats a duration as `"2d 3h 4m"`, or `"< 1m"` when shorter than a minute.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;

    let parts: Vec<String> = [(days, "d"), (hours, "h"), (minutes, "m")]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();

    if parts.is_empty() {
        "< 1m".to_string()
    } else {
        parts.join(" ")
    }
}

/// Returns the last `max` characters of `text`, respecting char boundaries.
fn tail_chars(text: &str, max: usize) -> &str {
    let count = text.chars().count();
    if count <= max {
        return text;
    }

    let start = text
        .char_indices()
        .nth(count - max)
        .map(|(index, _)| index)
        .unwrap_or(0);
    &text[start..]
}
