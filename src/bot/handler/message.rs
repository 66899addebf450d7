use serenity::all::Message;
use tokio::sync::mpsc::error::TrySendError;

use crate::{
    bot::{command::CommandRequest, handler::Handler},
    model::command::CommandInvocation,
    service::command::parse_command,
};

/// Handle message creation in a channel
///
/// Recognised commands from the configured guild are queued for the command task,
/// which resolves admin status in arrival order.
pub async fn handle_message(handler: &Handler, message: Message) {
    if message.author.bot || message.guild_id != Some(handler.guild_id) {
        return;
    }

    let Some(parsed) = parse_command(&handler.prefix, &message.content) else {
        return;
    };

    let request = CommandRequest {
        channel_id: message.channel_id,
        user_id: message.author.id,
        invocation: CommandInvocation {
            command: parsed.command,
            args: parsed.args,
            invoking_user: message.author.name.clone(),
            is_admin: false,
        },
    };

    match handler.commands.try_send(request) {
        Ok(()) => {}
        Err(TrySendError::Full(request)) => {
            tracing::warn!(
                "Command queue full, dropping {} from {}",
                request.invocation.command.name(),
                request.invocation.invoking_user
            );
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!("Command queue closed, ignoring message");
        }
    }
}
