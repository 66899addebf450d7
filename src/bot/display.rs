//! Live status message in a Discord channel.

use chrono::Utc;
use serenity::all::{ChannelId, CreateMessage, EditMessage, MessageId};
use serenity::async_trait;
use serenity::http::{Http, HttpError};
use std::sync::Arc;

use crate::{
    bot::embed::panel_embed,
    error::display::DisplayError,
    model::status::RenderedStatus,
    service::live_status::{DisplaySink, SurfaceId},
};

/// Discord error code for "Unknown Message".
const UNKNOWN_MESSAGE: isize = 10008;

/// Renders the live status into a pinned message of one channel.
pub struct DiscordDisplay {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl DiscordDisplay {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl DisplaySink for DiscordDisplay {
    /// Finds a pinned message posted by this bot with the live status title.
    async fn find_existing(&self, title: &str) -> Result<Option<SurfaceId>, DisplayError> {
        let me = self.http.get_current_user().await?.id;
        let pins = self.channel_id.pins(&self.http).await?;

        let existing = pins.into_iter().find(|message| {
            message.author.id == me
                && message
                    .embeds
                    .first()
                    .and_then(|embed| embed.title.as_deref())
                    == Some(title)
        });

        Ok(existing.map(|message| SurfaceId(message.id.get())))
    }

    /// Posts and pins a new status message.
    ///
    /// A failed pin is logged; the message is still used.
    async fn create(&self, status: &RenderedStatus) -> Result<SurfaceId, DisplayError> {
        let message = CreateMessage::new().embed(panel_embed(&status.to_panel(), Utc::now()));
        let message = self.channel_id.send_message(&self.http, message).await?;

        if let Err(e) = message.pin(&self.http).await {
            tracing::warn!(
                "Failed to pin live status message in channel {}: {}",
                self.channel_id,
                e
            );
        }

        Ok(SurfaceId(message.id.get()))
    }

    async fn edit(&self, surface: SurfaceId, status: &RenderedStatus) -> Result<(), DisplayError> {
        let edit = EditMessage::new().embed(panel_embed(&status.to_panel(), Utc::now()));

        match self
            .http
            .edit_message(self.channel_id, MessageId::new(surface.0), &edit, vec![])
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_unknown_message(&e) => Err(DisplayError::SurfaceInvalid),
            Err(e) => Err(e.into()),
        }
    }
}

/// Whether Discord answered that the message does not exist.
fn is_unknown_message(err: &serenity::Error) -> bool {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            response.status_code.as_u16() == 404 || response.error.code == UNKNOWN_MESSAGE
        }
        _ => false,
    }
}
