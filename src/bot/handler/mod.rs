use serenity::all::{
    Context, EventHandler, GuildId, Message, Ready, ShardMessenger, VoiceState,
};
use serenity::async_trait;
use tokio::sync::{mpsc, watch};

use crate::{bot::command::CommandRequest, config::Config, model::membership::MembershipEvent};

pub mod message;
pub mod ready;
pub mod voice;

/// Discord bot event handler
///
/// Converts gateway events into work for the service tasks. Nothing here talks to
/// the monitored server directly.
pub struct Handler {
    pub guild_id: GuildId,
    pub prefix: String,
    pub commands: mpsc::Sender<CommandRequest>,
    /// `None` when no notification channel is configured.
    pub membership: Option<mpsc::Sender<MembershipEvent>>,
    pub shard: watch::Sender<Option<ShardMessenger>>,
}

impl Handler {
    pub fn new(
        config: &Config,
        commands: mpsc::Sender<CommandRequest>,
        membership: Option<mpsc::Sender<MembershipEvent>>,
        shard: watch::Sender<Option<ShardMessenger>>,
    ) -> Self {
        Self {
            guild_id: GuildId::new(config.guild_id),
            prefix: config.command_prefix.clone(),
            commands,
            membership,
            shard,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(&self.shard, ctx, ready).await;
    }

    /// Called when a message is sent in a channel
    async fn message(&self, _ctx: Context, message: Message) {
        message::handle_message(self, message).await;
    }

    /// Called when a member joins, leaves or moves between voice channels
    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        if let Some(membership) = &self.membership {
            voice::handle_voice_state_update(self.guild_id, membership, ctx, old, new).await;
        }
    }
}
