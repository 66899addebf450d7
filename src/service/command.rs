//! Text command parsing and dispatch.

use std::sync::Arc;

use crate::{
    model::command::{Command, CommandInvocation, CommandReply, ParsedCommand},
    monitor::{ServerControl, ServerStateSource},
    service::renderer::StatusRenderer,
};

pub const DEFAULT_LOG_LINES: usize = 20;
pub const MAX_LOG_LINES: usize = 50;

/// Parses a message into a command.
///
/// Returns `None` for messages without the prefix and for unknown command names,
/// which are ignored silently.
pub fn parse_command(prefix: &str, content: &str) -> Option<ParsedCommand> {
    let rest = content.trim().strip_prefix(prefix)?;
    if rest.starts_with(char::is_whitespace) {
        return None;
    }

    let mut tokens = rest.split_whitespace();
    let command = Command::from_name(tokens.next()?)?;

    Some(ParsedCommand {
        command,
        args: tokens.map(str::to_string).collect(),
    })
}

/// Executes commands against the probe and the controller.
pub struct CommandDispatcher {
    source: Arc<dyn ServerStateSource>,
    control: Arc<dyn ServerControl>,
    renderer: Arc<StatusRenderer>,
    prefix: String,
}

impl CommandDispatcher {
    pub fn new(
        source: Arc<dyn ServerStateSource>,
        control: Arc<dyn ServerControl>,
        renderer: Arc<StatusRenderer>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            source,
            control,
            renderer,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Runs one command and returns the reply to post.
    ///
    /// Admin-only commands from non-admins are rejected before anything runs. Every
    /// failure is turned into a reply; nothing here is fatal.
    pub async fn dispatch(&self, invocation: &CommandInvocation) -> CommandReply {
        let command = invocation.command;

        if command.requires_admin() && !invocation.is_admin {
            tracing::info!(
                "Denied {}{} for {}",
                self.prefix,
                command.name(),
                invocation.invoking_user
            );
            return CommandReply::NotAuthorized;
        }

        tracing::debug!(
            "Running {}{} for {}",
            self.prefix,
            command.name(),
            invocation.invoking_user
        );

        match command {
            Command::Status => match self.source.fetch().await {
                Ok(state) => CommandReply::Panels(vec![self.renderer.status_panel(&state)]),
                Err(e) => CommandReply::Text(format!("❌ Unable to read server status: {}", e)),
            },
            Command::Groups => match self.source.fetch().await {
                Ok(state) => CommandReply::Panels(self.renderer.groups_panels(&state)),
                Err(e) => CommandReply::Text(format!("❌ Unable to read server status: {}", e)),
            },
            Command::Logs => self.logs(&invocation.args).await,
            Command::Restart => match self.control.restart().await {
                Ok(()) => {
                    tracing::info!("Server restart requested by {}", invocation.invoking_user);
                    CommandReply::Text("🔄 Restart signal sent to the server.".to_string())
                }
                Err(e) => {
                    tracing::error!("Failed to restart the server: {}", e);
                    CommandReply::Text(format!("❌ Failed to restart the server: {}", e))
                }
            },
            Command::Help => CommandReply::Panels(vec![self.renderer.help_panel(&self.prefix)]),
        }
    }

    async fn logs(&self, args: &[String]) -> CommandReply {
        let lines = match args.first() {
            None => DEFAULT_LOG_LINES,
            Some(arg) => match arg.parse::<usize>() {
                Ok(n) => n.clamp(1, MAX_LOG_LINES),
                Err(_) => {
                    return CommandReply::Text(format!(
                        "Usage: `{}{}`",
                        self.prefix,
                        Command::Logs.usage()
                    ))
                }
            },
        };

        match self.control.tail_logs(lines).await {
            Ok(lines) => CommandReply::Panels(vec![self.renderer.logs_panel(&lines)]),
            Err(e) => CommandReply::Text(format!("❌ Error fetching logs: {}", e)),
        }
    }
}
