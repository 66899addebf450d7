//! Ready event handler.
//!
//! The ready event fires after every (re)connection to the gateway. Discord does
//! not keep a bot's presence across reconnects, so the handler publishes the new
//! shard and the presence task resends the presence through it.

use serenity::all::{Context, Ready, ShardMessenger};
use tokio::sync::watch;

/// Handles the ready event when the bot connects to Discord.
///
/// # Arguments
/// - `shard` - Publishes the connected shard to the presence task
/// - `ctx` - Discord context holding the shard messenger
/// - `ready` - Ready event data containing bot user information
pub async fn handle_ready(
    shard: &watch::Sender<Option<ShardMessenger>>,
    ctx: Context,
    ready: Ready,
) {
    tracing::info!("{} is connected to Discord", ready.user.name);

    shard.send_replace(Some(ctx.shard.clone()));
}
