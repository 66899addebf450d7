//! Platform-independent bot behaviour.
//!
//! Services depend on the probe and controller traits from `monitor` and on the
//! sink traits declared here. The Discord implementations of the sinks live in
//! `bot`, which keeps every service testable with in-memory fakes.

pub mod command;
pub mod group_watch;
pub mod health;
pub mod live_status;
pub mod membership;
pub mod presence;
pub mod renderer;
