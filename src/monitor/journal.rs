//! Replays the relay server's log into its current groups.
//!
//! The relay logs one line per event, with the event type and its parameters
//! separated by commas:
//!
//! ```text
//! 2025-01-04T20:15:02+0000 host aooserver[812]: 12,3,4,GroupJoin,band,alice
//! 2025-01-04T20:31:40+0000 host aooserver[812]: 12,3,4,GroupLeave,band,alice
//! 2025-01-04T20:31:41+0000 host aooserver[812]: 12,3,4,UserLeave,bob
//! ```
//!
//! The leading timestamp comes from `journalctl -o short-iso`. `UserJoin` lines are
//! ignored since every user also emits a `GroupJoin`.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::model::server_state::{Group, UserRef};

static GROUP_JOIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",GroupJoin,([^,]+),([^,\s]+)").expect("valid regex"));
static GROUP_LEAVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",GroupLeave,([^,]+),([^,\s]+)").expect("valid regex"));
static USER_LEAVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",UserLeave,([^,\s]+)").expect("valid regex"));

/// A single group event parsed from a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEvent {
    GroupJoin { group: String, user: String },
    GroupLeave { group: String, user: String },
    UserLeave { user: String },
}

/// Parses the group event carried by a log line, if any.
pub fn parse_event(line: &str) -> Option<JournalEvent> {
    if let Some(caps) = GROUP_JOIN.captures(line) {
        return Some(JournalEvent::GroupJoin {
            group: caps[1].to_string(),
            user: caps[2].to_string(),
        });
    }
    if let Some(caps) = GROUP_LEAVE.captures(line) {
        return Some(JournalEvent::GroupLeave {
            group: caps[1].to_string(),
            user: caps[2].to_string(),
        });
    }
    USER_LEAVE.captures(line).map(|caps| JournalEvent::UserLeave {
        user: caps[1].to_string(),
    })
}

/// Parses the `short-iso` timestamp at the start of a journal line.
pub fn line_timestamp(line: &str) -> Option<DateTime<Utc>> {
    let token = line.split_whitespace().next()?;

    DateTime::parse_from_rfc3339(token)
        .or_else(|_| DateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Replays log lines, oldest first, into the groups that are still populated.
///
/// Groups keep the order in which they were first seen; a group that becomes empty
/// is dropped and starts over if someone joins it again.
///
/// # Arguments
/// - `lines` - Log lines in chronological order
/// - `fallback` - `joined_at` for join lines without a parseable timestamp
pub fn replay_groups<'a, I>(lines: I, fallback: DateTime<Utc>) -> Vec<Group>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: Vec<Group> = Vec::new();

    for line in lines {
        let Some(event) = parse_event(line) else {
            continue;
        };

        match event {
            JournalEvent::GroupJoin { group, user } => {
                let joined_at = line_timestamp(line).unwrap_or(fallback);
                let index = match groups.iter().position(|g| g.id == group) {
                    Some(index) => index,
                    None => {
                        groups.push(Group::new(group));
                        groups.len() - 1
                    }
                };
                groups[index].join(UserRef::new(user, joined_at));
            }
            JournalEvent::GroupLeave { group, user } => {
                if let Some(existing) = groups.iter_mut().find(|g| g.id == group) {
                    existing.leave(&user);
                }
                groups.retain(|g| !g.is_empty());
            }
            JournalEvent::UserLeave { user } => {
                for existing in groups.iter_mut() {
                    existing.leave(&user);
                }
                groups.retain(|g| !g.is_empty());
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fallback() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn names(group: &Group) -> Vec<&str> {
        group
            .members
            .iter()
            .map(|m| m.display_name.as_str())
            .collect()
    }

    /// Tests replaying joins into groups in first-seen order.
    #[test]
    fn replays_joins_in_order() {
        let lines = [
            "2025-01-04T20:15:02+0000 host aooserver[812]: 1,2,3,GroupJoin,band,alice",
            "2025-01-04T20:16:00+0000 host aooserver[812]: 1,2,3,UserJoin,bob",
            "2025-01-04T20:16:01+0000 host aooserver[812]: 1,2,3,GroupJoin,choir,bob",
            "2025-01-04T20:17:00+0000 host aooserver[812]: 1,2,3,GroupJoin,band,carol",
        ];

        let groups = replay_groups(lines, fallback());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, "band");
        assert_eq!(names(&groups[0]), vec!["alice", "carol"]);
        assert_eq!(groups[1].id, "choir");
        assert_eq!(
            groups[0].members[0].joined_at,
            Utc.with_ymd_and_hms(2025, 1, 4, 20, 15, 2).unwrap()
        );
    }

    /// Tests that a duplicate join keeps the original session start.
    #[test]
    fn duplicate_join_keeps_first_session() {
        let lines = [
            "2025-01-04T20:15:02+0000 h a: 1,GroupJoin,band,alice",
            "2025-01-04T20:45:00+0000 h a: 1,GroupJoin,band,alice",
        ];

        let groups = replay_groups(lines, fallback());

        assert_eq!(groups[0].members.len(), 1);
        assert_eq!(
            groups[0].members[0].joined_at,
            Utc.with_ymd_and_hms(2025, 1, 4, 20, 15, 2).unwrap()
        );
    }

    /// Tests that group and user leaves remove members and drop empty groups.
    ///
    /// Expected: only the group with a remaining member survives
    #[test]
    fn leaves_remove_members_and_empty_groups() {
        let lines = [
            "2025-01-04T20:00:00+0000 h a: 1,GroupJoin,band,alice",
            "2025-01-04T20:00:01+0000 h a: 1,GroupJoin,band,bob",
            "2025-01-04T20:00:02+0000 h a: 1,GroupJoin,choir,carol",
            "2025-01-04T20:10:00+0000 h a: 1,GroupLeave,band,alice",
            "2025-01-04T20:11:00+0000 h a: 1,UserLeave,carol",
        ];

        let groups = replay_groups(lines, fallback());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, "band");
        assert_eq!(names(&groups[0]), vec!["bob"]);
    }

    /// Tests that lines without a timestamp fall back to the provided time.
    #[test]
    fn missing_timestamp_uses_fallback() {
        let groups = replay_groups(["1,2,3,GroupJoin,band,alice"], fallback());

        assert_eq!(groups[0].members[0].joined_at, fallback());
    }

    /// Tests timestamp parsing with and without a colon in the offset.
    #[test]
    fn parses_short_iso_timestamps() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 4, 19, 15, 2).unwrap();

        assert_eq!(
            line_timestamp("2025-01-04T20:15:02+0100 host x"),
            Some(expected)
        );
        assert_eq!(
            line_timestamp("2025-01-04T20:15:02+01:00 host x"),
            Some(expected)
        );
        assert_eq!(line_timestamp("Jan 04 20:15:02 host x"), None);
    }

    /// Tests that unrelated lines are ignored.
    #[test]
    fn ignores_unrelated_lines() {
        assert_eq!(parse_event("server started on port 10998"), None);
        assert_eq!(
            parse_event("x,UserLeave,dave"),
            Some(JournalEvent::UserLeave {
                user: "dave".to_string()
            })
        );
    }
}
