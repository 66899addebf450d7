//! Discord integration.
//!
//! This module implements the sink traits of the services on top of Serenity and
//! converts gateway events into work for the service tasks:
//!
//! - `display` - the pinned live status message
//! - `presence` - bot presence and the counter channel
//! - `notify` - join and leave notifications
//! - `admin` - admin resolution for privileged commands
//! - `command` - execution of queued commands and their replies
//! - `handler` - gateway events (ready, messages, voice state changes)
//!
//! # Gateway Intents
//!
//! The bot requires the following gateway intents:
//! - `GUILDS` - Guild and channel data
//! - `GUILD_MESSAGES` - Messages in guild channels, for commands
//! - `MESSAGE_CONTENT` - Message text (privileged intent)
//! - `GUILD_VOICE_STATES` - Voice channel joins and leaves
//!
//! Note: `MESSAGE_CONTENT` is a privileged intent and must be explicitly enabled
//! in the Discord Developer Portal for the bot application.

pub mod admin;
pub mod command;
pub mod display;
pub mod embed;
pub mod handler;
pub mod notify;
pub mod presence;
pub mod start;
