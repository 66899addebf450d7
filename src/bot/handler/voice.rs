use chrono::{DateTime, Utc};
use serenity::all::{Context, GuildId, VoiceState};
use tokio::sync::mpsc;

use crate::model::membership::MembershipEvent;

/// Handle a voice state change
///
/// Joins, leaves and moves between voice channels of the configured guild are
/// forwarded to the membership task. Mute and deafen changes are ignored.
pub async fn handle_voice_state_update(
    guild_id: GuildId,
    membership: &mpsc::Sender<MembershipEvent>,
    _ctx: Context,
    old: Option<VoiceState>,
    new: VoiceState,
) {
    if new.guild_id != Some(guild_id) {
        return;
    }

    let member = new.member.as_ref();
    if member.is_some_and(|m| m.user.bot) {
        return;
    }

    let user = member
        .map(|m| m.display_name().to_string())
        .unwrap_or_else(|| format!("<@{}>", new.user_id));

    for event in voice_transition(old.as_ref(), &new, &user, Utc::now()) {
        if let Err(e) = membership.send(event).await {
            tracing::debug!("Membership queue closed, dropping {:?}", e.0.action);
            return;
        }
    }
}

/// Membership events for a voice state change.
///
/// A move between channels is a leave followed by a join. Without the previous
/// state (not cached) only the join is known.
pub fn voice_transition(
    old: Option<&VoiceState>,
    new: &VoiceState,
    user: &str,
    now: DateTime<Utc>,
) -> Vec<MembershipEvent> {
    let before = old.and_then(|state| state.channel_id);
    let after = new.channel_id;

    if before == after {
        return Vec::new();
    }

    let mut events = Vec::new();
    if let Some(channel) = before {
        events.push(MembershipEvent::leave(user, format!("<#{}>", channel), now));
    }
    if let Some(channel) = after {
        events.push(MembershipEvent::join(user, format!("<#{}>", channel), now));
    }
    events
}
