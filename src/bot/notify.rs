use serenity::all::{ChannelId, CreateMessage};
use serenity::async_trait;
use serenity::http::Http;
use std::sync::Arc;

use crate::{
    bot::embed::notification_embed, error::display::PlatformError,
    model::membership::Notification, service::membership::NotificationSink,
};

/// Posts join and leave notifications to one channel.
pub struct DiscordNotifier {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl NotificationSink for DiscordNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), PlatformError> {
        let message = CreateMessage::new().embed(notification_embed(notification));
        self.channel_id.send_message(&self.http, message).await?;
        Ok(())
    }
}
