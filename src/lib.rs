//! Discord bot for a voice-relay server.
//!
//! Monitors an AOO relay server running as a systemd unit and reflects its state
//! in a Discord guild:
//!
//! - a pinned live status message listing the active rooms and their users
//! - the bot's presence and an optional user counter channel
//! - join and leave notifications for relay rooms and Discord voice channels
//! - text commands to inspect the server, read its logs and restart it
//!
//! # Layout
//!
//! - `monitor` - reads the server state from systemd, its journal and sysinfo
//! - `service` - platform-independent behaviour (rendering, updaters, commands)
//! - `bot` - Discord implementations of the service sinks and the event handler
//! - `scheduler` - periodic ticks and the tasks driving the services
//! - `startup` - wiring and shutdown

pub mod bot;
pub mod config;
pub mod error;
pub mod model;
pub mod monitor;
pub mod scheduler;
pub mod service;
pub mod startup;

#[cfg(test)]
pub(crate) mod testing;
