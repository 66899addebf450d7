//! Long-running tasks driving the services.
//!
//! Each task owns its service, so ticks and events of one component never run
//! concurrently. A task ends when its input channel closes.

use tokio::sync::{mpsc, watch};

use crate::{
    model::membership::MembershipEvent,
    scheduler::Ticks,
    service::{
        group_watch::GroupWatcher,
        live_status::LiveStatusUpdater,
        membership::MembershipNotifier,
        presence::{CounterChannelUpdater, PresenceUpdater},
    },
};

pub async fn run_live_status(mut updater: LiveStatusUpdater, mut ticks: Ticks) {
    while ticks.recv().await.is_some() {
        updater.tick().await;
    }
}

/// Runs the presence updater on ticks and on every gateway (re)connection.
///
/// # Arguments
/// - `updater` - Presence updater
/// - `ticks` - Periodic ticks
/// - `connections` - Changes whenever the gateway connects again
pub async fn run_presence<T>(
    mut updater: PresenceUpdater,
    mut ticks: Ticks,
    mut connections: watch::Receiver<T>,
) {
    loop {
        tokio::select! {
            tick = ticks.recv() => {
                if tick.is_none() {
                    break;
                }
            }
            changed = connections.changed() => {
                if changed.is_err() {
                    break;
                }
                tracing::debug!("Gateway connected, resending presence");
                updater.invalidate();
            }
        }

        updater.tick().await;
    }
}

pub async fn run_counter(mut updater: CounterChannelUpdater, mut ticks: Ticks) {
    while ticks.recv().await.is_some() {
        updater.tick().await;
    }
}

/// Polls the relay's groups on ticks and forwards changes to the notifier.
pub async fn run_group_watch(
    mut watcher: GroupWatcher,
    mut ticks: Ticks,
    events: mpsc::Sender<MembershipEvent>,
) {
    while ticks.recv().await.is_some() {
        for event in watcher.poll().await {
            if events.send(event).await.is_err() {
                return;
            }
        }
    }
}

/// Handles membership events in arrival order.
pub async fn run_membership(
    mut notifier: MembershipNotifier,
    mut events: mpsc::Receiver<MembershipEvent>,
) {
    while let Some(event) = events.recv().await {
        notifier.handle(event).await;
    }
}
