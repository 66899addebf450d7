//! Bot presence and counter channel on Discord.

use serenity::all::{ActivityData, ChannelId, EditChannel, OnlineStatus, ShardMessenger};
use serenity::async_trait;
use serenity::http::Http;
use std::sync::Arc;
use tokio::sync::watch;

use crate::{
    error::display::PlatformError,
    model::status::{ActivityKind, Availability, Presence},
    service::presence::{CounterSink, PresenceSink},
};

/// Sets the presence through the current gateway shard.
///
/// The shard is published by the ready handler; until the first ready event there
/// is nothing to send through and `set_presence` reports `NotConnected`.
pub struct DiscordPresence {
    shard: watch::Receiver<Option<ShardMessenger>>,
}

impl DiscordPresence {
    pub fn new(shard: watch::Receiver<Option<ShardMessenger>>) -> Self {
        Self { shard }
    }
}

#[async_trait]
impl PresenceSink for DiscordPresence {
    async fn set_presence(&self, presence: &Presence) -> Result<(), PlatformError> {
        let Some(shard) = self.shard.borrow().clone() else {
            return Err(PlatformError::NotConnected);
        };

        let activity = match presence.activity {
            ActivityKind::Playing => ActivityData::playing(&presence.text),
            ActivityKind::Listening => ActivityData::listening(&presence.text),
            ActivityKind::Watching => ActivityData::watching(&presence.text),
        };
        let status = match presence.status {
            Availability::Online => OnlineStatus::Online,
            Availability::Idle => OnlineStatus::Idle,
            Availability::DoNotDisturb => OnlineStatus::DoNotDisturb,
        };

        shard.set_presence(Some(activity), status);
        Ok(())
    }
}

/// Renames a channel to show the user count.
pub struct DiscordCounterChannel {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl DiscordCounterChannel {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl CounterSink for DiscordCounterChannel {
    async fn rename(&self, name: &str) -> Result<(), PlatformError> {
        self.channel_id
            .edit(&self.http, EditChannel::new().name(name))
            .await?;
        Ok(())
    }
}
