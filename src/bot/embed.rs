//! Conversion of display payloads into Serenity embed builders.

use chrono::{DateTime, Utc};
use serenity::all::{CreateEmbed, CreateEmbedFooter, Timestamp};

use crate::model::{
    membership::{MembershipAction, Notification},
    status::{Panel, StatusColor},
};

/// Builds an embed from a panel, stamped with `timestamp`.
pub fn panel_embed(panel: &Panel, timestamp: DateTime<Utc>) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&panel.title)
        .color(panel.color.rgb())
        .timestamp(Timestamp::from(timestamp));

    if let Some(description) = &panel.description {
        embed = embed.description(description);
    }

    for field in &panel.fields {
        embed = embed.field(&field.name, &field.value, field.inline);
    }

    if let Some(footer) = &panel.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }

    embed
}

/// Builds the embed for a join or leave notification.
pub fn notification_embed(notification: &Notification) -> CreateEmbed {
    let (title, verb, color) = match notification.action {
        MembershipAction::Join => ("👥 User Joined", "joined", StatusColor::Green),
        MembershipAction::Leave => ("👋 User Left", "left", StatusColor::Red),
    };

    CreateEmbed::new()
        .title(title)
        .description(format!(
            "**{}** {} **{}**",
            notification.user, verb, notification.channel
        ))
        .color(color.rgb())
        .timestamp(Timestamp::from(notification.timestamp))
}
