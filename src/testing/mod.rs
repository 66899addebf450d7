//! Test support: fixtures, in-memory fakes and Serenity factories.
//!
//! Fixtures build domain values with fixed timestamps so rendered output is stable.
//! Fakes implement the probe, controller and sink traits and record every call so
//! tests can assert on what would have been sent to Discord.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::testing::{group, online_state, FakeProbe, FakeDisplay};
//!
//! let probe = Arc::new(FakeProbe::with_state(online_state(vec![group("band", &["alice"])], 12.0)));
//! let display = Arc::new(FakeDisplay::default());
//! ```

pub mod fake;
pub mod serenity;

use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

use crate::model::server_state::{
    Group, ProcessUsage, ResourceUsage, ServerState, Uptime, UserRef,
};

pub use fake::{
    FakeController, FakeCounter, FakeDisplay, FakeNotifier, FakePresence, FakeProbe,
};

/// Fixed point in time used by all fixtures.
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 4, 20, 0, 0)
        .single()
        .expect("valid fixture time")
}

/// Creates a group whose members all joined at `fixed_time()`.
pub fn group(id: &str, members: &[&str]) -> Group {
    let mut group = Group::new(id);
    for name in members {
        group.join(UserRef::new(*name, fixed_time()));
    }
    group
}

/// Creates an online state with complete metrics.
///
/// # Arguments
/// - `groups` - Groups as they would be replayed from the log
/// - `usage_pct` - Used for both CPU and memory usage
pub fn online_state(groups: Vec<Group>, usage_pct: f32) -> ServerState {
    ServerState {
        online: true,
        groups,
        resource_usage: Some(ResourceUsage {
            cpu_pct: usage_pct,
            mem_pct: usage_pct,
        }),
        process: Some(ProcessUsage {
            pid: 812,
            cpu_pct: 2.5,
            mem_mb: 48.0,
        }),
        connections: Some(3),
        uptime: Some(Uptime {
            system: Duration::from_secs(86_400),
            service: Some(Duration::from_secs(3_600)),
        }),
        timestamp: fixed_time(),
    }
}
