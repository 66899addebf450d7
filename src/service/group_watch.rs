//! Derives relay-side membership events by diffing consecutive probe results.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::{
    model::{membership::MembershipEvent, server_state::Group},
    monitor::ServerStateSource,
    service::health::ComponentHealth,
};

/// Polls the probe and reports who joined or left a group since the last poll.
///
/// The first successful poll only records a baseline; users already connected at
/// startup are not announced.
pub struct GroupWatcher {
    source: Arc<dyn ServerStateSource>,
    health: ComponentHealth,
    previous: Option<Vec<Group>>,
}

impl GroupWatcher {
    pub fn new(source: Arc<dyn ServerStateSource>) -> Self {
        Self {
            source,
            health: ComponentHealth::new("Group watcher"),
            previous: None,
        }
    }

    /// Polls once and returns the events since the previous poll.
    ///
    /// A failed poll returns no events and keeps the previous baseline, so the
    /// changes are reported by the next successful poll instead.
    pub async fn poll(&mut self) -> Vec<MembershipEvent> {
        let state = match self.source.fetch().await {
            Ok(state) => state,
            Err(e) => {
                self.health.failed(&e);
                return Vec::new();
            }
        };
        self.health.succeeded();

        let current: Vec<Group> = state.active_groups().cloned().collect();
        let events = match &self.previous {
            Some(previous) => diff_groups(previous, &current, state.timestamp),
            None => Vec::new(),
        };

        self.previous = Some(current);
        events
    }
}

/// Compares two group snapshots.
///
/// A member whose `joined_at` changed between snapshots left and rejoined, and is
/// reported as a leave followed by a join. Leaves are listed before joins.
///
/// # Arguments
/// - `previous` - Groups at the last poll
/// - `current` - Groups now
/// - `now` - Timestamp for leave events
pub fn diff_groups(
    previous: &[Group],
    current: &[Group],
    now: DateTime<Utc>,
) -> Vec<MembershipEvent> {
    let mut events = Vec::new();

    for group in previous {
        for member in &group.members {
            if joined_at(current, &group.id, &member.display_name) != Some(member.joined_at) {
                events.push(
                    MembershipEvent::leave(&member.display_name, &group.id, now)
                        .with_session_start(member.joined_at),
                );
            }
        }
    }

    for group in current {
        for member in &group.members {
            if joined_at(previous, &group.id, &member.display_name) != Some(member.joined_at) {
                events.push(
                    MembershipEvent::join(&member.display_name, &group.id, member.joined_at)
                        .with_session_start(member.joined_at),
                );
            }
        }
    }

    events
}

fn joined_at(groups: &[Group], id: &str, name: &str) -> Option<DateTime<Utc>> {
    groups
        .iter()
        .find(|g| g.id == id)
        .and_then(|g| g.members.iter().find(|m| m.display_name == name))
        .map(|m| m.joined_at)
}
