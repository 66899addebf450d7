//! Text commands and their replies.

use crate::model::status::Panel;

/// Commands understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Status,
    Groups,
    Logs,
    Restart,
    Help,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Status,
        Command::Groups,
        Command::Logs,
        Command::Restart,
        Command::Help,
    ];

    /// Looks up a command by name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Status => "status",
            Command::Groups => "groups",
            Command::Logs => "logs",
            Command::Restart => "restart",
            Command::Help => "help",
        }
    }

    pub fn usage(self) -> &'static str {
        match self {
            Command::Logs => "logs [lines]",
            other => other.name(),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::Status => "Show detailed server status",
            Command::Groups => "Show all active rooms and users",
            Command::Logs => "Show recent server logs (admin only)",
            Command::Restart => "Restart the server (admin only)",
            Command::Help => "Show this list",
        }
    }

    /// Whether only admins may run the command.
    pub fn requires_admin(self) -> bool {
        matches!(self, Command::Logs | Command::Restart)
    }
}

/// A recognised command parsed from message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: Command,
    pub args: Vec<String>,
}

/// One incoming command, created per message and discarded after dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub command: Command,
    pub args: Vec<String>,
    /// Display name of the invoking user, used for logging.
    pub invoking_user: String,
    pub is_admin: bool,
}

/// What the dispatcher wants posted back to the invoking channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    /// One or more embeds, posted in order.
    Panels(Vec<Panel>),
    /// Plain text.
    Text(String),
    /// The invoking user may not run this command.
    NotAuthorized,
}
