//! Execution of queued text commands and posting of their replies.

use chrono::Utc;
use serenity::all::{ChannelId, CreateMessage, UserId};
use serenity::async_trait;
use serenity::http::Http;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{
    bot::{admin::AdminCheck, embed::panel_embed},
    error::display::PlatformError,
    model::command::{CommandInvocation, CommandReply},
    service::command::CommandDispatcher,
};

pub const NOT_AUTHORIZED: &str = "❌ You don't have permission to use this command.";

/// A command waiting to be executed, with the channel to reply in.
///
/// `invocation.is_admin` is filled in by the command task.
#[derive(Debug)]
pub struct CommandRequest {
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub invocation: CommandInvocation,
}

/// Where command replies are posted.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn reply(&self, channel_id: ChannelId, reply: CommandReply) -> Result<(), PlatformError>;
}

/// Posts replies as Discord messages.
pub struct DiscordReplies {
    http: Arc<Http>,
}

impl DiscordReplies {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ReplySink for DiscordReplies {
    async fn reply(&self, channel_id: ChannelId, reply: CommandReply) -> Result<(), PlatformError> {
        post_reply(&self.http, channel_id, reply).await?;
        Ok(())
    }
}

/// Executes queued commands one at a time until the queue closes.
///
/// Admin status is resolved here rather than in the gateway handler, so a slow
/// role lookup never lets a later command overtake an earlier one.
///
/// # Arguments
/// - `dispatcher` - Command dispatcher
/// - `admins` - Resolves admin status for admin-only commands
/// - `replies` - Where replies are posted
/// - `requests` - Queue filled by the message handler
pub async fn run_command_worker(
    dispatcher: CommandDispatcher,
    admins: Arc<dyn AdminCheck>,
    replies: Arc<dyn ReplySink>,
    mut requests: mpsc::Receiver<CommandRequest>,
) {
    while let Some(mut request) = requests.recv().await {
        if request.invocation.command.requires_admin() {
            request.invocation.is_admin = admins.is_admin(request.user_id).await;
        }

        let reply = dispatcher.dispatch(&request.invocation).await;

        if let Err(e) = replies.reply(request.channel_id, reply).await {
            tracing::error!(
                "Failed to reply to {}{} in channel {}: {}",
                dispatcher.prefix(),
                request.invocation.command.name(),
                request.channel_id,
                e
            );
        }
    }

    tracing::debug!("Command queue closed");
}

/// Posts a command reply, one message per panel.
pub async fn post_reply(
    http: &Arc<Http>,
    channel_id: ChannelId,
    reply: CommandReply,
) -> Result<(), serenity::Error> {
    match reply {
        CommandReply::Panels(panels) => {
            let now = Utc::now();
            for panel in &panels {
                let message = CreateMessage::new().embed(panel_embed(panel, now));
                channel_id.send_message(http, message).await?;
            }
        }
        CommandReply::Text(text) => {
            channel_id.say(http, text).await?;
        }
        CommandReply::NotAuthorized => {
            channel_id.say(http, NOT_AUTHORIZED).await?;
        }
    }

    Ok(())
}
