//! Join and leave notifications.

use chrono::{DateTime, Utc};
use serenity::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::{
    error::display::PlatformError,
    model::membership::{MembershipAction, MembershipEvent, Notification},
};

/// Number of posted events remembered for deduplication.
const DEDUP_WINDOW: usize = 4096;

/// Posts notifications to the notification channel.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), PlatformError>;
}

/// What happened to one incoming event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Posted,
    /// The same logical event was already posted.
    Duplicate,
    /// A leave for a session that was never seen open.
    UnknownSession,
    /// Posting failed; the event was not recorded and may be retried.
    Failed,
}

/// Identity of one logical membership event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey {
    action: MembershipAction,
    user: String,
    channel: String,
    session_start: DateTime<Utc>,
}

/// Turns membership events into notifications, posting each logical event once.
///
/// Two events are the same logical event when they share action, user, channel and
/// session start. Events without a session start (Discord voice) are resolved
/// against the sessions this notifier has seen open: a repeated join reuses the
/// open session's start and is therefore a duplicate, and a leave closes it.
pub struct MembershipNotifier {
    sink: Arc<dyn NotificationSink>,
    seen: HashSet<DedupKey>,
    order: VecDeque<DedupKey>,
    open_sessions: HashMap<(String, String), DateTime<Utc>>,
}

impl MembershipNotifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            seen: HashSet::new(),
            order: VecDeque::new(),
            open_sessions: HashMap::new(),
        }
    }

    /// Handles one event, posting a notification unless it is a duplicate.
    pub async fn handle(&mut self, event: MembershipEvent) -> NotifyOutcome {
        let slot = (event.user.clone(), event.channel.clone());

        let Some(session_start) = self.resolve_session(&slot, &event) else {
            tracing::debug!(
                "Ignoring leave of {} from {} without a known session",
                event.user,
                event.channel
            );
            return NotifyOutcome::UnknownSession;
        };

        let key = DedupKey {
            action: event.action,
            user: event.user.clone(),
            channel: event.channel.clone(),
            session_start,
        };

        if self.seen.contains(&key) {
            tracing::debug!(
                "Skipping duplicate {:?} of {} in {}",
                event.action,
                event.user,
                event.channel
            );
            return NotifyOutcome::Duplicate;
        }

        let notification = Notification {
            action: event.action,
            user: event.user,
            channel: event.channel,
            timestamp: event.timestamp,
        };

        if let Err(e) = self.sink.notify(&notification).await {
            tracing::error!(
                "Failed to post {:?} notification for {}: {}",
                notification.action,
                notification.user,
                e
            );
            return NotifyOutcome::Failed;
        }

        match notification.action {
            MembershipAction::Join => {
                self.open_sessions.insert(slot, session_start);
            }
            MembershipAction::Leave => {
                self.open_sessions.remove(&slot);
            }
        }
        self.remember(key);

        NotifyOutcome::Posted
    }

    fn resolve_session(
        &self,
        slot: &(String, String),
        event: &MembershipEvent,
    ) -> Option<DateTime<Utc>> {
        if let Some(start) = event.session_start {
            return Some(start);
        }

        let open = self.open_sessions.get(slot).copied();
        match event.action {
            MembershipAction::Join => Some(open.unwrap_or(event.timestamp)),
            MembershipAction::Leave => open,
        }
    }

    fn remember(&mut self, key: DedupKey) {
        if self.seen.insert(key.clone()) {
            self.order.push_back(key);
        }

        while self.order.len() > DEDUP_WINDOW {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
    }
}
