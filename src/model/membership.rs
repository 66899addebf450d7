//! Join and leave events.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipAction {
    Join,
    Leave,
}

/// A user joined or left a voice channel or relay group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipEvent {
    /// Display name of the user.
    pub user: String,
    /// Where the user joined or left, already formatted for display.
    pub channel: String,
    pub action: MembershipAction,
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    /// Start of the session the event belongs to, when the source knows it.
    ///
    /// Relay-side events always carry it. Discord voice events do not; the notifier
    /// resolves it from the sessions it has seen open.
    pub session_start: Option<DateTime<Utc>>,
}

impl MembershipEvent {
    pub fn join(
        user: impl Into<String>,
        channel: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user: user.into(),
            channel: channel.into(),
            action: MembershipAction::Join,
            timestamp,
            session_start: None,
        }
    }

    pub fn leave(
        user: impl Into<String>,
        channel: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user: user.into(),
            channel: channel.into(),
            action: MembershipAction::Leave,
            timestamp,
            session_start: None,
        }
    }

    pub fn with_session_start(mut self, session_start: DateTime<Utc>) -> Self {
        self.session_start = Some(session_start);
        self
    }
}

/// Notification posted for one logical membership event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub action: MembershipAction,
    pub user: String,
    pub channel: String,
    pub timestamp: DateTime<Utc>,
}
